//! Conflict resolution between generated candidates and user code.

use crate::registry::Directive;
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
};
use stencil_schema::{
    diagnostic::{Diagnostic, ReasonCode},
    error::DirectiveError,
    member::{GeneratedMember, MemberKind, Section},
    node::ClassSpec,
};

///
/// MemberKey
///
/// Identity of a member for override and collision checks. Parameter types
/// are compared after erasure.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MemberKey {
    Field(String),
    NestedType(String),
    Constructor(Vec<String>),
    Method { name: String, params: Vec<String> },
    Wrapper { method: usize, precedence: u16 },
}

impl MemberKey {
    #[must_use]
    pub fn of(member: &GeneratedMember, type_params: &[String]) -> Self {
        let sig = &member.signature;

        match member.kind {
            MemberKind::Field => Self::Field(sig.name.clone()),
            MemberKind::NestedType => Self::NestedType(sig.name.clone()),
            MemberKind::Constructor => Self::Constructor(sig.erased_params(type_params)),
            MemberKind::Method => Self::Method {
                name: sig.name.clone(),
                params: sig.erased_params(type_params),
            },
            MemberKind::Wrapper => Self::Wrapper {
                method: member.wraps.unwrap_or(usize::MAX),
                precedence: member.priority.precedence,
            },
        }
    }

    /// Everything the user already declared.
    #[must_use]
    pub fn user_keys(class: &ClassSpec) -> BTreeSet<Self> {
        let tp = &class.type_params;
        let mut keys = BTreeSet::new();

        keys.extend(class.fields.iter().map(|f| Self::Field(f.name.clone())));
        keys.extend(class.nested_types.iter().cloned().map(Self::NestedType));
        for m in &class.methods {
            let params = m.params.iter().map(|p| p.ty.erased(tp)).collect();
            keys.insert(if m.is_constructor() {
                Self::Constructor(params)
            } else {
                Self::Method {
                    name: m.name.clone(),
                    params,
                }
            });
        }

        keys
    }
}

///
/// Resolution
///

#[derive(Debug, Default)]
pub struct Resolution {
    /// Accepted members, in candidate order.
    pub members: Vec<GeneratedMember>,

    /// Directives that lost all of their output.
    pub rejected: BTreeSet<usize>,

    pub diagnostics: Vec<Diagnostic>,
}

// Entry
struct Entry {
    key: MemberKey,
    member: GeneratedMember,
}

/// Filter candidates against user code, then pick one winner per key.
#[must_use]
pub fn resolve(class: &ClassSpec, batches: Vec<(&Directive, Vec<GeneratedMember>)>) -> Resolution {
    let mut res = Resolution::default();
    let directives: BTreeMap<usize, &Directive> = batches.iter().map(|(d, _)| (d.id, *d)).collect();

    // Phase 1: user declarations win.
    let mut pool = Vec::new();
    for (d, members) in batches {
        match filter_user(class, members) {
            Ok((entries, overridden)) => {
                if !overridden.is_empty() {
                    res.diagnostics.push(Diagnostic::warning(
                        ReasonCode::Overridden,
                        Some(d.name.as_str()),
                        d.target.describe(&class.name),
                        format!("already declared by the class: {}", overridden.join(", ")),
                    ));
                }
                pool.extend(entries);
            }
            Err(err) => {
                res.diagnostics.push(d.diagnostic(&class.name, &err));
                res.rejected.insert(d.id);
            }
        }
    }

    // Phase 2: collisions between directives. A rejected directive loses
    // every member, which can change other groups, so repeat until stable.
    loop {
        let groups = group(&pool, &res.rejected);

        let Some((loser, err)) = groups.values().find_map(|idxs| collision(&pool, idxs)) else {
            res.members = groups
                .values()
                .map(|idxs| idxs[0])
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|i| pool[i].member.clone())
                .collect();
            break;
        };

        if let Some(d) = directives.get(&loser) {
            res.diagnostics.push(d.diagnostic(&class.name, &err));
        }
        res.rejected.insert(loser);
    }

    res
}

// filter_user
// drops candidates the user already wrote; synthetic fields and nested
// types cannot be overridden
fn filter_user(
    class: &ClassSpec,
    members: Vec<GeneratedMember>,
) -> Result<(Vec<Entry>, Vec<String>), DirectiveError> {
    let user = MemberKey::user_keys(class);
    let mut entries = Vec::new();
    let mut overridden = Vec::new();
    let mut equality_overridden = false;

    for member in members {
        let key = MemberKey::of(&member, &class.type_params);

        if !user.contains(&key) {
            entries.push(Entry { key, member });
            continue;
        }
        match member.kind {
            MemberKind::Field | MemberKind::NestedType => {
                return Err(DirectiveError::conflict(format!(
                    "'{}' is already declared by the class",
                    member.name()
                )));
            }
            _ => {
                equality_overridden |= member.priority.section == Section::Equality;
                if !member.implied {
                    overridden.push(member.name().to_string());
                }
            }
        }
    }

    // equals and hashCode only travel together
    if equality_overridden {
        entries.retain(|e| e.member.priority.section != Section::Equality);
    }

    Ok((entries, overridden))
}

// group
// live pool indices per key, winner first: highest precedence, then lowest
// directive id
fn group(pool: &[Entry], rejected: &BTreeSet<usize>) -> BTreeMap<MemberKey, Vec<usize>> {
    let mut groups: BTreeMap<MemberKey, Vec<usize>> = BTreeMap::new();

    for (i, e) in pool.iter().enumerate() {
        if !rejected.contains(&e.member.source.id) {
            groups.entry(e.key.clone()).or_default().push(i);
        }
    }
    for idxs in groups.values_mut() {
        idxs.sort_by_key(|&i| {
            let m = &pool[i].member;
            (Reverse(m.priority.precedence), m.source.id, i)
        });
    }

    groups
}

// collision
// first explicit loser that cannot merge into the winner; identical shared
// members merge, explicit constructors never do
fn collision(pool: &[Entry], idxs: &[usize]) -> Option<(usize, DirectiveError)> {
    let winner = &pool[*idxs.first()?].member;

    idxs[1..].iter().find_map(|&i| {
        let m = &pool[i].member;
        if m.source.id == winner.source.id || m.implied {
            return None;
        }
        if m.kind != MemberKind::Constructor && m.same_content(winner) {
            return None;
        }

        let err = if m.kind == MemberKind::Constructor {
            let types: Vec<_> = m.signature.params.iter().map(|p| p.ty.to_string()).collect();
            DirectiveError::ambiguity(format!(
                "constructor ({}) is also generated by '{}'",
                types.join(", "),
                winner.source.name
            ))
        } else {
            DirectiveError::conflict(format!(
                "'{}' is also generated by '{}'",
                m.name(),
                winner.source.name
            ))
        };

        Some((m.source.id, err))
    })
}

///
/// TESTS
///
