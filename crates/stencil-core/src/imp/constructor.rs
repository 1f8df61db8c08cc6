use crate::{
    imp::{Gen, Output},
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    member::{GeneratedMember, Instruction, MemberKind, Operand, Param, Priority, Section, Signature},
    node::FieldSpec,
    types::{Access, Visibility},
};

// placement of the two forms inside the constructor section
const REQUIRED_ANCHOR: u32 = 0;
const ALL_ANCHOR: u32 = 1;

pub fn generate(
    view: &ClassView,
    d: &Directive,
    required_only: bool,
) -> Result<Output, DirectiveError> {
    let mut out = Output::default();

    // access = none generates nothing
    let Some(vis) = d.params.access("access").and_then(Access::visibility) else {
        return Ok(out);
    };

    let fields = view.constructor_fields(required_only);
    let anchor = if required_only {
        REQUIRED_ANCHOR
    } else {
        ALL_ANCHOR
    };
    out.push(constructor(&Gen::new(view, d), &fields, vis, anchor));

    Ok(out)
}

/// Implied all-fields constructor used by `value` and `builder`.
pub(crate) fn implied_all_args(g: &Gen, vis: Visibility) -> GeneratedMember {
    let fields = g.view.constructor_fields(false);

    constructor(g, &fields, vis, ALL_ANCHOR)
}

/// Implied required-fields constructor used by `data`.
pub(crate) fn implied_required(g: &Gen) -> GeneratedMember {
    let fields = g.view.constructor_fields(true);

    constructor(g, &fields, Visibility::Public, REQUIRED_ANCHOR)
}

// constructor
// defaults for fields outside the parameter list, then every guard, then
// the assignments
fn constructor(g: &Gen, fields: &[&FieldSpec], vis: Visibility, anchor: u32) -> GeneratedMember {
    let view = g.view;
    let class = view.class();

    let params: Vec<Param> = fields
        .iter()
        .map(|f| Param {
            non_null: view.is_non_null(&f.name),
            ..Param::new(f.name.clone(), f.ty.clone())
        })
        .collect();

    let mut body = Vec::new();
    for f in class.instance_fields() {
        if fields.iter().any(|p| p.name == f.name) || view.is_lazy(f) {
            continue;
        }
        if let Some(expr) = &f.default {
            body.push(Instruction::InitDefault {
                field: f.name.clone(),
                expr: expr.clone(),
            });
        }
    }
    body.extend(
        params
            .iter()
            .filter(|p| p.non_null)
            .map(|p| Instruction::RequireNonNull {
                name: p.name.clone(),
            }),
    );
    body.extend(params.iter().map(|p| Instruction::Assign {
        field: p.name.clone(),
        value: Operand::Param(p.name.clone()),
    }));

    let mut sig = Signature::new(class.name.clone(), vis);
    sig.params = params;

    g.member(
        MemberKind::Constructor,
        sig,
        body,
        Priority::new(g.precedence(), Section::Constructor, anchor),
    )
}

///
/// TESTS
///
