use crate::{
    imp::{Edit, Gen, Output},
    naming,
    registry::{Arg, Directive},
    view::{ClassView, Layer, Slot},
};
use stencil_schema::{
    error::DirectiveError,
    expr::Expr,
    member::{
        GeneratedMember, Instruction, MemberKind, Operand, Param, Priority, Section, Signature,
    },
    node::FieldSpec,
    target::Target,
    types::{Access, Visibility},
};

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    validate(view, d)?;

    Ok(emit(&Gen::new(view, d)))
}

// requests_write
fn requests_write(d: &Directive) -> bool {
    matches!(d.params.layer("write"), Some(Arg::Access(a)) if *a != Access::None)
}

fn validate(view: &ClassView, d: &Directive) -> Result<(), DirectiveError> {
    match &d.target {
        Target::Field { field } => {
            let f = view
                .class()
                .get_field(field)
                .ok_or_else(|| DirectiveError::schema(format!("unknown field '{field}'")))?;

            if requests_write(d) && view.effectively_final(f) {
                return Err(DirectiveError::consistency(format!(
                    "cannot generate a setter for final field '{field}'"
                )));
            }
            if d.params.bool("lazy") {
                validate_lazy(view, f)?;
            }
        }
        Target::Class => {
            if d.params.bool("lazy") {
                return Err(DirectiveError::consistency(
                    "lazy applies to single fields only",
                ));
            }

            // class-wide setters would contradict immutability
            if view.is_value() && requests_write(d) {
                let finals: Vec<_> = view
                    .class()
                    .instance_fields()
                    .filter(|f| view.accessor(&f.name).write.is_some_and(|s| s.source == d.id))
                    .filter(|f| view.effectively_final(f))
                    .map(|f| f.name.as_str())
                    .collect();

                if !finals.is_empty() {
                    return Err(DirectiveError::consistency(format!(
                        "value class fields are final, no setter for: {}",
                        finals.join(", ")
                    )));
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn validate_lazy(view: &ClassView, f: &FieldSpec) -> Result<(), DirectiveError> {
    let plan = view.accessor(&f.name);

    if f.is_static() {
        return Err(DirectiveError::consistency(
            "lazy getters need an instance field",
        ));
    }
    if !view.effectively_final(f) {
        return Err(DirectiveError::consistency(format!(
            "lazy field '{}' must be final",
            f.name
        )));
    }
    if !f.has_default() {
        return Err(DirectiveError::consistency(format!(
            "lazy field '{}' needs an initializer",
            f.name
        )));
    }
    if plan
        .write
        .is_some_and(|s| s.value != Access::None && s.layer == Layer::Field)
    {
        return Err(DirectiveError::consistency(format!(
            "lazy field '{}' cannot also have a setter",
            f.name
        )));
    }

    Ok(())
}

/// Emit every accessor whose winning layer is this directive.
pub(crate) fn emit(g: &Gen) -> Output {
    let view = g.view;
    let mut out = Output::default();

    for field in &view.class().fields {
        let plan = view.accessor(&field.name);
        let ours = |slot: Option<Slot<Access>>| {
            slot.filter(|s| s.source == g.directive.id)
                .and_then(|s| s.value.visibility())
        };

        if let Some(vis) = ours(plan.read) {
            let member = if view.is_lazy(field) {
                out.edit(Edit::LazySlot(field.name.clone()));
                lazy_getter(g, field, vis)
            } else {
                getter(g, field, vis)
            };
            out.push(member);
        }

        // inherited writes on final fields are skipped, explicit ones were
        // rejected during validation
        if let Some(vis) = ours(plan.write)
            && !view.effectively_final(field)
        {
            out.push(setter(g, field, vis));
        }
    }

    out
}

fn priority(g: &Gen, field: &FieldSpec) -> Priority {
    Priority::new(
        g.precedence(),
        Section::Accessor,
        g.view.field_index(&field.name),
    )
}

fn read_signature(g: &Gen, field: &FieldSpec, vis: Visibility) -> Signature {
    let name = naming::getter(&field.name, &field.ty, &g.view.config().accessors);
    let mut sig = Signature::new(name, vis).returns(field.ty.clone());
    sig.is_static = field.is_static();

    sig
}

fn getter(
    g: &Gen,
    field: &FieldSpec,
    vis: Visibility,
) -> GeneratedMember {
    g.member(
        MemberKind::Method,
        read_signature(g, field, vis),
        vec![Instruction::Return(Operand::Field(field.name.clone()))],
        priority(g, field),
    )
}

fn lazy_getter(
    g: &Gen,
    field: &FieldSpec,
    vis: Visibility,
) -> GeneratedMember {
    let init = field
        .default
        .clone()
        .unwrap_or_else(Expr::null);

    g.member(
        MemberKind::Method,
        read_signature(g, field, vis),
        vec![Instruction::LazyGet {
            field: field.name.clone(),
            init,
        }],
        priority(g, field),
    )
}

fn setter(
    g: &Gen,
    field: &FieldSpec,
    vis: Visibility,
) -> GeneratedMember {
    let cfg = &g.view.config().accessors;
    let non_null = g.view.is_non_null(&field.name);
    let chains = cfg.chains() && !field.is_static();

    let mut sig = Signature::new(naming::setter(&field.name, &field.ty, cfg), vis).param(Param {
        non_null,
        ..Param::new(field.name.clone(), field.ty.clone())
    });
    sig.is_static = field.is_static();
    if chains {
        sig = sig.returns(g.view.class().self_type());
    }

    let mut body = Vec::new();
    if non_null {
        body.push(Instruction::RequireNonNull {
            name: field.name.clone(),
        });
    }
    body.push(Instruction::Assign {
        field: field.name.clone(),
        value: Operand::Param(field.name.clone()),
    });
    if chains {
        body.push(Instruction::ReturnThis);
    }

    g.member(MemberKind::Method, sig, body, priority(g, field))
}
