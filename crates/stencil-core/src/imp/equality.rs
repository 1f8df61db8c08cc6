use crate::{
    directive_kind::DirectiveKind,
    imp::{Gen, Output},
    registry::Directive,
    view::ClassView,
};
use std::collections::BTreeSet;
use stencil_schema::{
    error::DirectiveError,
    expr::Literal,
    member::{
        Compare, GeneratedMember, HASH_SEED, Instruction, MemberKind, Operand, Param, Priority,
        Section, Signature,
    },
    node::FieldSpec,
    types::{TypeRef, Visibility},
};

const OTHER: &str = "o";

pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let class = view.class();

    // every named field must exist
    for list in ["exclude", "hash_exclude", "hash_include"] {
        if let Some(unknown) = d
            .params
            .idents(list)
            .iter()
            .find(|name| class.get_field(name).is_none())
        {
            return Err(DirectiveError::schema(format!(
                "{list} names unknown field '{unknown}'"
            )));
        }
    }

    let excluded: BTreeSet<&str> = d.params.idents("exclude").iter().map(String::as_str).collect();
    let equals = participants(view, &excluded);

    let mut hashed: Vec<&str> = equals
        .iter()
        .map(|f| f.name.as_str())
        .filter(|name| !d.params.idents("hash_exclude").iter().any(|e| e == name))
        .collect();
    for name in d.params.idents("hash_include") {
        if !hashed.contains(&name.as_str()) {
            hashed.push(name);
        }
    }

    let compared: BTreeSet<&str> = equals.iter().map(|f| f.name.as_str()).collect();
    let hashed: BTreeSet<&str> = hashed.into_iter().collect();
    if compared != hashed {
        let diff: Vec<_> = compared.symmetric_difference(&hashed).copied().collect();

        return Err(DirectiveError::consistency(format!(
            "equals and hashCode must use the same fields, they differ on: {}",
            diff.join(", ")
        )));
    }

    let mut out = Output::default();
    for member in members(&Gen::new(view, d), &equals) {
        out.push(member);
    }

    Ok(out)
}

/// Fields taking part in equality, in declaration order.
pub(crate) fn participants<'a>(
    view: &ClassView<'a>,
    excluded: &BTreeSet<&str>,
) -> Vec<&'a FieldSpec> {
    view.class()
        .instance_fields()
        .filter(|f| !f.modifiers.is_transient)
        .filter(|f| !view.is_lazy(f))
        .filter(|f| !excluded.contains(f.name.as_str()))
        .filter(|f| {
            view.field_marker(&f.name, DirectiveKind::EqualityExclude)
                .is_none()
        })
        .collect()
}

const fn mode(field: &FieldSpec) -> Compare {
    if field.ty.is_array() {
        Compare::Deep
    } else {
        Compare::Value
    }
}

/// The `equals`/`hashCode` pair over `fields`.
pub(crate) fn members(g: &Gen, fields: &[&FieldSpec]) -> [GeneratedMember; 2] {
    let mut equals = vec![Instruction::EnsureSameType {
        param: OTHER.to_string(),
    }];
    equals.extend(fields.iter().map(|f| Instruction::CompareField {
        field: f.name.clone(),
        param: OTHER.to_string(),
        mode: mode(f),
    }));
    equals.push(Instruction::Return(Operand::Literal(Literal::Bool(true))));

    let mut hash = vec![Instruction::HashSeed(HASH_SEED)];
    hash.extend(fields.iter().map(|f| Instruction::HashField {
        field: f.name.clone(),
        mode: mode(f),
    }));
    hash.push(Instruction::ReturnHash);

    let precedence = g.precedence();
    [
        g.member(
            MemberKind::Method,
            Signature::new("equals", Visibility::Public)
                .param(Param::new(OTHER, TypeRef::object()))
                .returns(TypeRef::boolean()),
            equals,
            Priority::new(precedence, Section::Equality, 0),
        ),
        g.member(
            MemberKind::Method,
            Signature::new("hashCode", Visibility::Public).returns(TypeRef::int()),
            hash,
            Priority::new(precedence, Section::Equality, 1),
        ),
    ]
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, registry::Registry};
    use stencil_schema::{
        diagnostic::ReasonCode,
        node::{ClassSpec, DirectiveInvocation},
        target::Target,
    };

    fn point() -> ClassSpec {
        ClassSpec::new("Point")
            .field(FieldSpec::new("x", TypeRef::int()))
            .field(FieldSpec::new("y", TypeRef::int()))
            .field(FieldSpec::new("cache", TypeRef::int()).transient())
    }

    fn run(class: &ClassSpec, inv: DirectiveInvocation) -> Result<Output, DirectiveError> {
        let reg = Registry::catalog();
        let d = reg.resolve(0, &inv, Target::Class).unwrap();
        let cfg = EngineConfig::default();
        let view = ClassView::new(class, &cfg, vec![&d]);

        generate(&view, &d)
    }

    #[test]
    fn transient_and_excluded_fields_do_not_participate() {
        let class = point();
        let out = run(
            &class,
            DirectiveInvocation::class("equals_and_hash_code").param("exclude", ["y"]),
        )
        .unwrap();

        let hash = &out.members[1].body;
        assert_eq!(hash.len(), 3);
        assert_eq!(
            hash[1],
            Instruction::HashField {
                field: "x".into(),
                mode: Compare::Value
            }
        );
    }

    #[test]
    fn hash_include_of_excluded_field_is_inconsistent() {
        let class = point();
        let err = run(
            &class,
            DirectiveInvocation::class("equals_and_hash_code")
                .param("exclude", ["y"])
                .param("hash_include", ["y"]),
        )
        .unwrap_err();

        assert_eq!(err.code(), ReasonCode::Consistency);
        assert!(err.to_string().contains('y'));
    }

    #[test]
    fn unknown_field_in_list_is_a_schema_error() {
        let class = point();
        let err = run(
            &class,
            DirectiveInvocation::class("equals_and_hash_code").param("hash_exclude", ["z"]),
        )
        .unwrap_err();

        assert_eq!(err.code(), ReasonCode::Schema);
    }
}
