use crate::{
    directive_kind::DirectiveKind,
    imp::{Edit, Gen, Output, accessor, constructor, equality},
    naming,
    registry::Directive,
    view::{AllArgsProvider, ClassView},
};
use std::collections::BTreeSet;
use stencil_schema::{
    error::DirectiveError,
    member::{Instruction, MemberKind, Operand, Param, Priority, Section, Signature},
    node::FieldSpec,
    target::Target,
    types::{Access, Visibility},
};

///
/// Value
///
/// Immutable value class: private final fields, a final class, getters, an
/// all-fields constructor and equality.
///

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let g = Gen::implied(view, d);
    let mut out = Output::default();

    out.edit(Edit::ClassFinal);
    for field in view.class().instance_fields() {
        if view.field_marker(&field.name, DirectiveKind::NonFinal).is_none() {
            out.edit(Edit::FieldFinal(field.name.clone()));
        }
        if field.visibility == Visibility::Package {
            out.edit(Edit::FieldPrivate(field.name.clone()));
        }
    }

    out.extend(accessor::emit(&g));

    if view.all_args_provider() == AllArgsProvider::Implied {
        out.push(constructor::implied_all_args(&g, Visibility::Public));
    }
    if !view.has(DirectiveKind::EqualsAndHashCode) {
        for member in equality::members(&g, &equality::participants(view, &BTreeSet::new())) {
            out.push(member);
        }
    }

    Ok(out)
}

///
/// With
///
/// `withX(v)`: the receiver when `v` is identical, else a copy through the
/// all-fields constructor with one field replaced.
///

pub fn generate_with(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let class = view.class();

    let targets: Vec<&FieldSpec> = match &d.target {
        Target::Field { field } => {
            let f = class
                .get_field(field)
                .ok_or_else(|| DirectiveError::schema(format!("unknown field '{field}'")))?;
            if f.is_static() {
                return Err(DirectiveError::schema(format!(
                    "with is not allowed on static field '{field}'"
                )));
            }
            if view.is_lazy(f) {
                return Err(DirectiveError::consistency(format!(
                    "lazy field '{field}' cannot be copied with a new value"
                )));
            }
            vec![f]
        }
        _ => view.constructor_fields(false),
    };

    let Some(vis) = d.params.access("access").and_then(Access::visibility) else {
        return Ok(Output::default());
    };
    if view.all_args_provider() == AllArgsProvider::None {
        return Err(DirectiveError::coverage(
            "with needs a constructor taking every field",
        ));
    }

    let g = Gen::new(view, d);
    let all = view.constructor_fields(false);
    let mut out = Output::default();

    for field in targets {
        let non_null = view.is_non_null(&field.name);
        let sig = Signature::new(naming::wither(&field.name, &field.ty), vis)
            .param(Param {
                non_null,
                ..Param::new(field.name.clone(), field.ty.clone())
            })
            .returns(class.self_type());

        let mut body = Vec::new();
        if non_null {
            body.push(Instruction::RequireNonNull {
                name: field.name.clone(),
            });
        }
        body.push(Instruction::ReturnThisIfUnchanged {
            field: field.name.clone(),
            param: field.name.clone(),
        });
        body.push(Instruction::ReturnNew {
            class: class.name.clone(),
            args: all
                .iter()
                .map(|f| {
                    if f.name == field.name {
                        Operand::Param(f.name.clone())
                    } else {
                        Operand::Field(f.name.clone())
                    }
                })
                .collect(),
            init: Vec::new(),
        });

        out.push(g.member(
            MemberKind::Method,
            sig,
            body,
            Priority::explicit(Section::Copy, view.field_index(&field.name)),
        ));
    }

    Ok(out)
}
