//! One module per generator family.
//!
//! Every generator reads a [`ClassView`] and its own [`Directive`] and
//! returns candidate members plus edits to the class, or a single
//! [`DirectiveError`] that disables the whole directive.

pub mod accessor;
pub mod builder;
pub mod cleanup;
pub mod constructor;
pub mod data;
pub mod equality;
pub mod infer;
pub mod locked;
pub mod non_null;
pub mod sneaky;
pub mod value;

use crate::{registry::Directive, view::ClassView};
use serde::{Deserialize, Serialize};
use stencil_schema::{
    error::DirectiveError,
    member::{GeneratedMember, Instruction, MemberKind, Priority, Signature},
    node::MethodSpec,
    types::TypeRef,
};

///
/// Edit
///
/// Change to the class itself, applied by the assembler when the owning
/// directive survives resolution.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edit {
    FieldFinal(String),
    FieldPrivate(String),
    ClassFinal,
    LazySlot(String),
    LocalType {
        method: usize,
        local: String,
        ty: TypeRef,
        is_final: bool,
    },
}

///
/// Output
///

#[derive(Clone, Debug, Default)]
pub struct Output {
    pub members: Vec<GeneratedMember>,
    pub edits: Vec<Edit>,
}

impl Output {
    pub fn push(&mut self, member: GeneratedMember) {
        self.members.push(member);
    }

    pub fn edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn extend(&mut self, other: Self) {
        self.members.extend(other.members);
        self.edits.extend(other.edits);
    }
}

///
/// Gen
///
/// Per-directive generation context.
///

pub struct Gen<'v, 'a> {
    pub view: &'v ClassView<'a>,
    pub directive: &'v Directive,
    pub implied: bool,
}

impl<'v, 'a> Gen<'v, 'a> {
    pub const fn new(view: &'v ClassView<'a>, directive: &'v Directive) -> Self {
        Self {
            view,
            directive,
            implied: false,
        }
    }

    pub const fn implied(view: &'v ClassView<'a>, directive: &'v Directive) -> Self {
        Self {
            view,
            directive,
            implied: true,
        }
    }

    pub fn member(
        &self,
        kind: MemberKind,
        signature: Signature,
        body: Vec<Instruction>,
        priority: Priority,
    ) -> GeneratedMember {
        let member =
            GeneratedMember::new(kind, signature, body, self.directive.source(), priority);

        if self.implied { member.implied() } else { member }
    }

    /// Precedence for members that may collide with other directives.
    pub const fn precedence(&self) -> u16 {
        if self.implied {
            Priority::IMPLIED
        } else {
            Priority::EXPLICIT
        }
    }
}

// target_method
// the user method a method/parameter/local directive sits in
pub(crate) fn target_method<'a>(
    view: &ClassView<'a>,
    d: &Directive,
) -> Result<(usize, &'a MethodSpec), DirectiveError> {
    let index = d
        .target
        .method()
        .ok_or_else(|| DirectiveError::schema(format!("'{}' must sit inside a method", d.name)))?;
    let method = view
        .class()
        .methods
        .get(index)
        .ok_or_else(|| DirectiveError::schema(format!("no method at index {index}")))?;

    Ok((index, method))
}

/// Wrapper around the user method at `index`; the body holds one `Inner`.
pub(crate) fn wrapper(
    g: &Gen,
    index: usize,
    method: &MethodSpec,
    precedence: u16,
    body: Vec<Instruction>,
) -> GeneratedMember {
    let mut signature = Signature::new(method.name.clone(), method.visibility);
    signature.is_static = method.is_static;

    let anchor = u32::try_from(index).unwrap_or(u32::MAX);
    g.member(
        MemberKind::Wrapper,
        signature,
        body,
        Priority::new(precedence, stencil_schema::member::Section::Wrapper, anchor),
    )
    .wrapping(index)
}
