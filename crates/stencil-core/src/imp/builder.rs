use crate::{
    directive_kind::DirectiveKind,
    imp::{Gen, Output, constructor},
    naming,
    registry::Directive,
    view::{AllArgsProvider, ClassView},
};
use stencil_schema::{
    error::DirectiveError,
    expr::Literal,
    member::{
        GeneratedMember, Instruction, MemberKind, Operand, Param, Priority, Section, Signature,
    },
    node::{ClassSpec, FieldSpec},
    types::{Access, TypeRef, Visibility},
};

///
/// Naming
///
/// Builder names after directive parameters and config fallbacks.
///

struct Naming {
    class: String,
    method: String,
    build: String,
    prefix: String,
}

impl Naming {
    fn new(view: &ClassView, d: &Directive) -> Self {
        let cfg = &view.config().builder;
        let pick = |param: &str, fallback: &str| {
            d.params
                .ident(param)
                .map_or_else(|| fallback.to_string(), ToString::to_string)
        };

        Self {
            class: d.params.ident("class_name").map_or_else(
                || naming::builder_class(&view.class().name, &cfg.class_suffix),
                ToString::to_string,
            ),
            method: pick("method_name", &cfg.method_name),
            build: pick("build_method", &cfg.build_method),
            prefix: pick("setter_prefix", &cfg.setter_prefix),
        }
    }
}

// field_of
fn field_of<'a>(class: &'a ClassSpec, d: &Directive) -> Result<&'a FieldSpec, DirectiveError> {
    let name = d
        .target
        .field_name()
        .ok_or_else(|| DirectiveError::schema(format!("'{}' must sit on a field", d.name)))?;

    class
        .get_field(name)
        .ok_or_else(|| DirectiveError::schema(format!("unknown field '{name}'")))
}

/// A defaulted builder field needs something to default to.
pub fn check_default(class: &ClassSpec, d: &Directive) -> Result<(), DirectiveError> {
    let field = field_of(class, d)?;

    if field.has_default() {
        Ok(())
    } else {
        Err(DirectiveError::coverage(format!(
            "builder default on '{}' needs an initializer",
            field.name
        )))
    }
}

pub fn check_singular(class: &ClassSpec, d: &Directive) -> Result<(), DirectiveError> {
    let field = field_of(class, d)?;

    if !field.ty.is_collection() {
        return Err(DirectiveError::schema(format!(
            "singular needs a collection field, '{}' is {}",
            field.name, field.ty
        )));
    }
    singular_name(field, d).map(|_| ())
}

fn singular_name(field: &FieldSpec, d: &Directive) -> Result<String, DirectiveError> {
    if let Some(name) = d.params.ident("name") {
        return Ok(name.to_string());
    }

    naming::singularize(&field.name).ok_or_else(|| {
        DirectiveError::schema(format!(
            "cannot derive a singular name from '{}', set one explicitly",
            field.name
        ))
    })
}

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let Some(vis) = d.params.access("access").and_then(Access::visibility) else {
        return Ok(Output::default());
    };

    let g = Gen::new(view, d);
    let names = Naming::new(view, d);
    let class = view.class();
    let builder_ty = TypeRef::generic(
        names.class.clone(),
        class.type_params.iter().map(TypeRef::new).collect(),
    );
    let fields = view.constructor_fields(false);

    let mut nested = Vec::new();
    let mut storage = Vec::new();
    let mut mutators = Vec::new();
    let mut args = Vec::new();

    for field in &fields {
        let anchor = view.field_index(&field.name);
        let singular = view.field_marker(&field.name, DirectiveKind::Singular);
        let defaulted = view.field_marker(&field.name, DirectiveKind::BuilderDefault).is_some();

        if let Some(marker) = singular {
            let element = field.ty.element().unwrap_or_else(TypeRef::object);
            let one = singular_name(field, marker)?;
            let ty = TypeRef::generic("java.util.ArrayList", vec![element.clone()]);

            storage.push(nested_field(&g, &field.name, ty, anchor));
            mutators.extend(singular_mutators(&g, &names, field, &one, element, &builder_ty));
            args.push(Operand::Snapshot {
                field: field.name.clone(),
                unique: field.ty.is_set(),
            });
            continue;
        }

        storage.push(nested_field(&g, &field.name, field.ty.clone(), anchor));
        if defaulted {
            storage.push(nested_field(&g, &naming::set_flag(&field.name), TypeRef::boolean(), anchor));
        }
        mutators.push(mutator(&g, &names, field, defaulted, &builder_ty));

        args.push(match (&field.default, defaulted) {
            (Some(expr), true) => Operand::Defaulted {
                field: field.name.clone(),
                flag: naming::set_flag(&field.name),
                expr: expr.clone(),
            },
            _ => Operand::Field(field.name.clone()),
        });
    }

    // package constructor, storage, mutators, then build()
    nested.push(g.member(
        MemberKind::Constructor,
        Signature::new(names.class.clone(), Visibility::Package),
        Vec::new(),
        Priority::explicit(Section::Constructor, 0),
    ));
    nested.extend(storage);
    nested.extend(mutators);
    nested.push(g.member(
        MemberKind::Method,
        Signature::new(names.build.clone(), Visibility::Public).returns(class.self_type()),
        vec![Instruction::ReturnNew {
            class: class.name.clone(),
            args,
            init: Vec::new(),
        }],
        Priority::explicit(Section::Builder, u32::MAX),
    ));

    let mut out = Output::default();
    out.push(
        g.member(
            MemberKind::NestedType,
            Signature::new(names.class.clone(), vis)
                .static_()
                .type_params(&class.type_params),
            Vec::new(),
            Priority::explicit(Section::Type, 0),
        )
        .with_nested(nested),
    );
    out.push(g.member(
        MemberKind::Method,
        Signature::new(names.method.clone(), vis)
            .static_()
            .type_params(&class.type_params)
            .returns(builder_ty.clone()),
        vec![new_builder(&names, Vec::new())],
        Priority::explicit(Section::Builder, 0),
    ));

    if d.params.bool("to_builder") {
        out.push(to_builder(&g, &names, &fields, builder_ty));
    }

    // build() needs an all-fields constructor; supply one when nobody else does
    if view.all_args_provider() == AllArgsProvider::Builder {
        out.push(constructor::implied_all_args(
            &Gen::implied(view, d),
            Visibility::Package,
        ));
    }

    Ok(out)
}

fn new_builder(names: &Naming, init: Vec<(String, Operand)>) -> Instruction {
    Instruction::ReturnNew {
        class: names.class.clone(),
        args: Vec::new(),
        init,
    }
}

fn nested_field(g: &Gen, name: &str, ty: TypeRef, anchor: u32) -> GeneratedMember {
    g.member(
        MemberKind::Field,
        Signature::field(name, ty, Visibility::Private),
        Vec::new(),
        Priority::explicit(Section::Field, anchor),
    )
}

fn guard(g: &Gen, field: &FieldSpec) -> Option<Instruction> {
    g.view
        .is_non_null(&field.name)
        .then(|| Instruction::RequireNonNull {
            name: field.name.clone(),
        })
}

fn mutator(
    g: &Gen,
    names: &Naming,
    field: &FieldSpec,
    defaulted: bool,
    builder_ty: &TypeRef,
) -> GeneratedMember {
    let non_null = g.view.is_non_null(&field.name);
    let sig = Signature::new(naming::prefixed(&names.prefix, &field.name), Visibility::Public)
        .param(Param {
            non_null,
            ..Param::new(field.name.clone(), field.ty.clone())
        })
        .returns(builder_ty.clone());

    let mut body: Vec<_> = guard(g, field).into_iter().collect();
    body.push(Instruction::Assign {
        field: field.name.clone(),
        value: Operand::Param(field.name.clone()),
    });
    if defaulted {
        body.push(Instruction::Assign {
            field: naming::set_flag(&field.name),
            value: Operand::Literal(Literal::Bool(true)),
        });
    }
    body.push(Instruction::ReturnThis);

    g.member(
        MemberKind::Method,
        sig,
        body,
        Priority::explicit(Section::Builder, g.view.field_index(&field.name)),
    )
}

// singular_mutators
// add one, add all, clear
fn singular_mutators(
    g: &Gen,
    names: &Naming,
    field: &FieldSpec,
    one: &str,
    element: TypeRef,
    builder_ty: &TypeRef,
) -> [GeneratedMember; 3] {
    let anchor = g.view.field_index(&field.name);
    let priority = Priority::explicit(Section::Builder, anchor);
    let all_ty = TypeRef::generic("java.util.Collection", vec![element.clone()]);

    [
        g.member(
            MemberKind::Method,
            Signature::new(naming::prefixed(&names.prefix, one), Visibility::Public)
                .param(Param::new(one, element))
                .returns(builder_ty.clone()),
            vec![
                Instruction::Append {
                    field: field.name.clone(),
                    value: Operand::Param(one.to_string()),
                },
                Instruction::ReturnThis,
            ],
            priority,
        ),
        g.member(
            MemberKind::Method,
            Signature::new(naming::prefixed(&names.prefix, &field.name), Visibility::Public)
                .param(Param {
                    non_null: true,
                    ..Param::new(field.name.clone(), all_ty)
                })
                .returns(builder_ty.clone()),
            vec![
                Instruction::RequireNonNull {
                    name: field.name.clone(),
                },
                Instruction::AppendAll {
                    field: field.name.clone(),
                    value: Operand::Param(field.name.clone()),
                },
                Instruction::ReturnThis,
            ],
            priority,
        ),
        g.member(
            MemberKind::Method,
            Signature::new(naming::prefixed("clear", &field.name), Visibility::Public)
                .returns(builder_ty.clone()),
            vec![
                Instruction::Clear {
                    field: field.name.clone(),
                },
                Instruction::ReturnThis,
            ],
            priority,
        ),
    ]
}

fn to_builder(
    g: &Gen,
    names: &Naming,
    fields: &[&FieldSpec],
    builder_ty: TypeRef,
) -> GeneratedMember {
    let mut init = Vec::new();
    for field in fields {
        init.push((field.name.clone(), Operand::Field(field.name.clone())));

        if g.view
            .field_marker(&field.name, DirectiveKind::BuilderDefault)
            .is_some()
        {
            init.push((
                naming::set_flag(&field.name),
                Operand::Literal(Literal::Bool(true)),
            ));
        }
    }

    g.member(
        MemberKind::Method,
        Signature::new("toBuilder", Visibility::Public).returns(builder_ty),
        vec![new_builder(names, init)],
        Priority::explicit(Section::Builder, 1),
    )
}
