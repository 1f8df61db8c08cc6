//! Final assembly: wrapper composition, placement order and class edits.

use crate::imp::Edit;
use std::collections::BTreeMap;
use stencil_schema::{
    member::{GeneratedMember, Instruction, MemberKind, Param, Priority, Section, Signature, substitute_all},
    node::{ClassSpec, MethodSpec, Storage},
    types::{TypeRef, Visibility},
};

///
/// Assembly
///

#[derive(Clone, Debug)]
pub struct Assembly {
    pub class: ClassSpec,
    pub members: Vec<GeneratedMember>,
}

/// Compose wrappers, order members for printing and apply `edits` to a
/// copy of the class.
#[must_use]
pub fn assemble(class: &ClassSpec, members: Vec<GeneratedMember>, edits: &[Edit]) -> Assembly {
    let (wrappers, mut members): (Vec<_>, Vec<_>) = members
        .into_iter()
        .partition(|m| m.kind == MemberKind::Wrapper);

    let mut by_method: BTreeMap<usize, Vec<GeneratedMember>> = BTreeMap::new();
    for w in wrappers {
        if let Some(index) = w.wraps {
            by_method.entry(index).or_default().push(w);
        }
    }
    for (index, layers) in by_method {
        if let Some(method) = class.methods.get(index) {
            members.extend(compose(index, method, layers));
        }
    }

    members.sort_by(|a, b| {
        a.priority
            .placement(&b.priority)
            .then_with(|| a.name().cmp(b.name()))
    });

    Assembly {
        class: apply_edits(class, edits),
        members,
    }
}

// compose
// nests every wrapper of one method around its body, outermost first
fn compose(index: usize, method: &MethodSpec, mut layers: Vec<GeneratedMember>) -> Option<GeneratedMember> {
    layers.sort_by(|a, b| b.priority.precedence.cmp(&a.priority.precedence));
    let outer = layers.first()?.clone();

    let mut body = vec![Instruction::Invoke {
        body: method.body.clone(),
    }];
    for layer in layers.iter().rev() {
        body = substitute_all(layer.body.clone(), &body);
    }
    // this(..)/super(..) must stay the first statement
    if method.delegates {
        body.insert(
            0,
            Instruction::DelegateCall {
                body: method.body.clone(),
            },
        );
    }

    let guarded: Vec<&str> = layers
        .iter()
        .flat_map(|l| &l.body)
        .filter_map(|i| match i {
            Instruction::RequireNonNull { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    let mut signature = Signature::new(method.name.clone(), method.visibility);
    signature.is_static = method.is_static;
    signature.returns.clone_from(&method.returns);
    signature.throws = remaining_throws(&method.throws, &layers);
    signature.params = method
        .params
        .iter()
        .map(|p| Param {
            non_null: guarded.contains(&p.name.as_str()),
            ..Param::new(p.name.clone(), p.ty.clone())
        })
        .collect();

    let anchor = u32::try_from(index).unwrap_or(u32::MAX);
    let mut member = GeneratedMember::new(
        MemberKind::Wrapper,
        signature,
        body,
        outer.source,
        Priority::new(outer.priority.precedence, Section::Wrapper, anchor),
    )
    .wrapping(index);
    member.implied = false;

    Some(member)
}

// remaining_throws
// rethrown kinds no longer need declaring; an empty list covers everything
fn remaining_throws(throws: &[TypeRef], layers: &[GeneratedMember]) -> Vec<TypeRef> {
    let mut out = throws.to_vec();

    for layer in layers {
        for i in &layer.body {
            if let Instruction::Rethrow { kinds, .. } = i {
                if kinds.is_empty() {
                    return Vec::new();
                }
                out.retain(|t| !kinds.iter().any(|k| k.simple_name() == t.simple_name()));
            }
        }
    }

    out
}

fn apply_edits(class: &ClassSpec, edits: &[Edit]) -> ClassSpec {
    let mut class = class.clone();

    for edit in edits {
        match edit {
            Edit::ClassFinal => class.is_final = true,
            Edit::FieldFinal(name) => {
                if let Some(f) = class.fields.iter_mut().find(|f| f.name == *name) {
                    f.modifiers.is_final = true;
                }
            }
            Edit::FieldPrivate(name) => {
                if let Some(f) = class.fields.iter_mut().find(|f| f.name == *name) {
                    f.visibility = Visibility::Private;
                }
            }
            Edit::LazySlot(name) => {
                if let Some(f) = class.fields.iter_mut().find(|f| f.name == *name) {
                    f.storage = Storage::LazySlot;
                }
            }
            Edit::LocalType {
                method,
                local,
                ty,
                is_final,
            } => {
                let slot = class
                    .methods
                    .get_mut(*method)
                    .and_then(|m| m.locals.iter_mut().find(|l| l.name == *local));
                if let Some(l) = slot {
                    l.ty = Some(ty.clone());
                    l.is_final |= *is_final;
                }
            }
        }
    }

    class
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_schema::{
        member::{LockMode, LockRef},
        node::{FieldSpec, ParamSpec},
        target::{DirectiveRef, Target},
    };

    fn source(id: usize, name: &str) -> DirectiveRef {
        DirectiveRef {
            id,
            name: name.into(),
            target: Target::Method {
                method: 0,
                name: "run".into(),
            },
        }
    }

    fn layer(id: usize, precedence: u16, body: Vec<Instruction>) -> GeneratedMember {
        GeneratedMember::new(
            MemberKind::Wrapper,
            Signature::new("run", Visibility::Public),
            body,
            source(id, "w"),
            Priority::new(precedence, Section::Wrapper, 0),
        )
        .wrapping(0)
    }

    #[test]
    fn wrappers_nest_by_precedence() {
        let class = ClassSpec::new("Job").method(
            MethodSpec::new("run", "run")
                .param(ParamSpec::new("input", TypeRef::string()))
                .throws(TypeRef::new("IOException")),
        );
        let lock = layer(
            0,
            Priority::LOCK,
            vec![Instruction::WithLock {
                lock: LockRef::Implicit { is_static: false },
                mode: LockMode::Exclusive,
                body: vec![Instruction::Inner],
            }],
        );
        let rethrow = layer(
            1,
            Priority::RETHROW,
            vec![Instruction::Rethrow {
                kinds: vec![TypeRef::new("java.io.IOException")],
                body: vec![Instruction::Inner],
            }],
        );
        let guard = layer(
            2,
            Priority::NULL_GUARD + 99,
            vec![
                Instruction::RequireNonNull {
                    name: "input".into(),
                },
                Instruction::Inner,
            ],
        );

        let out = assemble(&class, vec![lock, rethrow, guard], &[]);
        assert_eq!(out.members.len(), 1);

        let w = &out.members[0];
        assert_eq!(w.source.id, 1);
        assert!(w.signature.throws.is_empty());
        assert!(w.signature.params[0].non_null);

        let Instruction::Rethrow { body, .. } = &w.body[0] else {
            panic!("rethrow must be outermost");
        };
        assert!(matches!(body[0], Instruction::RequireNonNull { .. }));
        let Instruction::WithLock { body, .. } = &body[1] else {
            panic!("lock must sit inside the guard");
        };
        assert!(matches!(body[0], Instruction::Invoke { .. }));
    }

    #[test]
    fn delegating_constructor_keeps_call_first() {
        let class = ClassSpec::new("Job").method(
            MethodSpec::constructor("Job", "ctor")
                .param(ParamSpec::new("name", TypeRef::string()))
                .delegating(),
        );
        let guard = layer(
            0,
            Priority::NULL_GUARD + 99,
            vec![
                Instruction::RequireNonNull {
                    name: "name".into(),
                },
                Instruction::Inner,
            ],
        );

        let out = assemble(&class, vec![guard], &[]);
        let body = &out.members[0].body;

        assert!(matches!(body[0], Instruction::DelegateCall { .. }));
        assert!(matches!(body[1], Instruction::RequireNonNull { .. }));
    }

    #[test]
    fn edits_apply_to_a_copy() {
        let class = ClassSpec::new("Point")
            .field(FieldSpec::new("x", TypeRef::int()).with_visibility(Visibility::Package));
        let edits = [
            Edit::ClassFinal,
            Edit::FieldFinal("x".into()),
            Edit::FieldPrivate("x".into()),
        ];

        let out = assemble(&class, Vec::new(), &edits);

        assert!(out.class.is_final);
        assert!(out.class.fields[0].is_final());
        assert_eq!(out.class.fields[0].visibility, Visibility::Private);
        assert!(!class.is_final);
    }
}
