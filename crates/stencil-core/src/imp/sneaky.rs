use crate::{
    imp::{Gen, Output, target_method, wrapper},
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    member::{Instruction, Priority},
    types::TypeRef,
};

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let (index, method) = target_method(view, d)?;
    let kinds = d.params.idents("kinds").iter().map(TypeRef::new).collect();

    let mut out = Output::default();
    out.push(wrapper(
        &Gen::new(view, d),
        index,
        method,
        Priority::RETHROW,
        vec![Instruction::Rethrow {
            kinds,
            body: vec![Instruction::Inner],
        }],
    ));

    Ok(out)
}
