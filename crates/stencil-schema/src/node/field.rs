use crate::{
    expr::Expr,
    node::directive::DirectiveInvocation,
    types::{TypeRef, Visibility},
};
use serde::{Deserialize, Serialize};

///
/// Modifiers
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Modifiers {
    #[serde(default)]
    pub is_final: bool,

    #[serde(default)]
    pub is_transient: bool,

    #[serde(default)]
    pub is_static: bool,
}

///
/// Storage
///
/// How a field holds its value after generation. Lazy accessors turn the
/// field into a caching slot.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    #[default]
    Plain,
    LazySlot,
}

///
/// FieldSpec
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeRef,

    #[serde(default = "private")]
    pub visibility: Visibility,

    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,

    #[serde(default)]
    pub storage: Storage,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInvocation>,
}

const fn private() -> Visibility {
    Visibility::Private
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            modifiers: Modifiers::default(),
            default: None,
            storage: Storage::Plain,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub const fn final_(mut self) -> Self {
        self.modifiers.is_final = true;
        self
    }

    #[must_use]
    pub const fn transient(mut self) -> Self {
        self.modifiers.is_transient = true;
        self
    }

    #[must_use]
    pub const fn static_(mut self) -> Self {
        self.modifiers.is_static = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, expr: Expr) -> Self {
        self.default = Some(expr);
        self
    }

    #[must_use]
    pub fn directive(mut self, invocation: DirectiveInvocation) -> Self {
        self.directives.push(invocation);
        self
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.modifiers.is_final
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[must_use]
    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name == name)
    }
}
