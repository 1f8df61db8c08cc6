use crate::{
    diagnostic::{Diagnostic, ReasonCode},
    member::{GeneratedMember, MemberKind},
    node::ClassSpec,
};
use serde::{Deserialize, Serialize};

///
/// EmissionResult
///
/// The augmented class, every accepted member in print order, and the full
/// diagnostic list. Whether diagnostics are fatal is the caller's call.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EmissionResult {
    pub class: ClassSpec,

    #[serde(default)]
    pub members: Vec<GeneratedMember>,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl EmissionResult {
    #[must_use]
    pub const fn new(class: ClassSpec) -> Self {
        Self {
            class,
            members: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Diagnostics carrying the given reason code.
    pub fn with_code(&self, code: ReasonCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// First top-level member with this kind and name.
    #[must_use]
    pub fn member(&self, kind: MemberKind, name: &str) -> Option<&GeneratedMember> {
        self.members
            .iter()
            .find(|m| m.kind == kind && m.signature.name == name)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&GeneratedMember> {
        self.member(MemberKind::Method, name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &GeneratedMember> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Constructor)
    }

    /// Generated constructor with the given number of parameters.
    #[must_use]
    pub fn constructor_with_arity(&self, arity: usize) -> Option<&GeneratedMember> {
        self.constructors().find(|m| m.signature.params.len() == arity)
    }

    /// Composed wrapper for the user method at `index`.
    #[must_use]
    pub fn wrapper_for(&self, index: usize) -> Option<&GeneratedMember> {
        self.members
            .iter()
            .find(|m| m.kind == MemberKind::Wrapper && m.wraps == Some(index))
    }

    #[must_use]
    pub fn nested_type(&self, name: &str) -> Option<&GeneratedMember> {
        self.member(MemberKind::NestedType, name)
    }
}
