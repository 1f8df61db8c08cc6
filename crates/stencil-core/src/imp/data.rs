use crate::{
    directive_kind::DirectiveKind,
    imp::{Gen, Output, accessor, constructor, equality},
    registry::Directive,
    view::ClassView,
};
use std::collections::BTreeSet;
use stencil_schema::error::DirectiveError;

// Data
// getters, setters for non-final fields, a required-args constructor and
// equality; all of it yields to explicit directives
pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let g = Gen::implied(view, d);
    let mut out = accessor::emit(&g);

    if !view.has_constructor_directive() && !view.has_user_constructor() {
        out.push(constructor::implied_required(&g));
    }
    if !view.has(DirectiveKind::EqualsAndHashCode) {
        for member in equality::members(&g, &equality::participants(view, &BTreeSet::new())) {
            out.push(member);
        }
    }

    Ok(out)
}
