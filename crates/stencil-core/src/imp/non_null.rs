use crate::{
    imp::{Gen, Output, target_method, wrapper},
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    member::{Instruction, Priority},
    node::ClassSpec,
    target::Target,
};

/// A guard on a primitive can never fire; drop it with a warning.
pub fn check(class: &ClassSpec, d: &Directive) -> Result<(), DirectiveError> {
    let (name, ty) = match &d.target {
        Target::Field { field } => {
            let f = class
                .get_field(field)
                .ok_or_else(|| DirectiveError::schema(format!("unknown field '{field}'")))?;
            (field, &f.ty)
        }
        Target::Parameter { method, param, .. } => {
            let p = class
                .methods
                .get(*method)
                .and_then(|m| m.params.iter().find(|p| p.name == *param))
                .ok_or_else(|| DirectiveError::schema(format!("unknown parameter '{param}'")))?;
            (param, &p.ty)
        }
        _ => return Err(DirectiveError::schema("non_null needs a field or parameter")),
    };

    if ty.is_primitive() {
        return Err(DirectiveError::ignored(format!(
            "'{name}' has primitive type {ty} and can never be null"
        )));
    }

    Ok(())
}

/// Field guards are emitted by the generators that assign the field;
/// parameter guards wrap the method body.
pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let mut out = Output::default();
    let Target::Parameter { param, .. } = &d.target else {
        return Ok(out);
    };

    let (index, method) = target_method(view, d)?;
    let position = method
        .params
        .iter()
        .position(|p| p.name == *param)
        .ok_or_else(|| DirectiveError::schema(format!("unknown parameter '{param}'")))?;

    // earlier parameters are checked first, so they sit further out
    let offset = u16::try_from(position).unwrap_or(99).min(99);
    out.push(wrapper(
        &Gen::new(view, d),
        index,
        method,
        Priority::NULL_GUARD + (99 - offset),
        vec![
            Instruction::RequireNonNull {
                name: param.clone(),
            },
            Instruction::Inner,
        ],
    ));

    Ok(out)
}
