use crate::{
    expr::Expr,
    node::directive::DirectiveInvocation,
    types::{TypeRef, Visibility},
};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

///
/// BodyHandle
///
/// Opaque reference to a user-written body. The engine wraps it but never
/// looks inside.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BodyHandle(pub String);

impl From<&str> for BodyHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

///
/// MethodKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Method,
    Constructor,
}

///
/// ParamSpec
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeRef,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInvocation>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn directive(mut self, invocation: DirectiveInvocation) -> Self {
        self.directives.push(invocation);
        self
    }
}

///
/// LocalSpec
///
/// A local binding inside a user body, as far as the front-end extracted it:
/// its declared type (absent when it is to be inferred), its initializer,
/// and every later reassignment.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LocalSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reassigned: Vec<Expr>,

    #[serde(default)]
    pub is_final: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInvocation>,
}

impl LocalSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            init: None,
            reassigned: Vec::new(),
            is_final: false,
            directives: Vec::new(),
        }
    }

    #[must_use]
    pub fn typed(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn init(mut self, expr: Expr) -> Self {
        self.init = Some(expr);
        self
    }

    #[must_use]
    pub fn reassign(mut self, expr: Expr) -> Self {
        self.reassigned.push(expr);
        self
    }

    #[must_use]
    pub fn directive(mut self, invocation: DirectiveInvocation) -> Self {
        self.directives.push(invocation);
        self
    }
}

///
/// MethodSpec
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MethodSpec {
    pub name: String,

    #[serde(default)]
    pub kind: MethodKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub is_static: bool,

    /// Constructor body opens with a `this(..)`/`super(..)` call.
    #[serde(default)]
    pub delegates: bool,

    pub body: BodyHandle,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<LocalSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<DirectiveInvocation>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, body: impl Into<BodyHandle>) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Method,
            params: Vec::new(),
            returns: None,
            throws: Vec::new(),
            visibility: Visibility::Public,
            is_static: false,
            delegates: false,
            body: body.into(),
            locals: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// A user-written constructor. Its name is the class name.
    pub fn constructor(class: impl Into<String>, body: impl Into<BodyHandle>) -> Self {
        Self {
            kind: MethodKind::Constructor,
            ..Self::new(class, body)
        }
    }

    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    #[must_use]
    pub fn throws(mut self, ty: TypeRef) -> Self {
        self.throws.push(ty);
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub const fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub const fn delegating(mut self) -> Self {
        self.delegates = true;
        self
    }

    #[must_use]
    pub fn local(mut self, local: LocalSpec) -> Self {
        self.locals.push(local);
        self
    }

    #[must_use]
    pub fn directive(mut self, invocation: DirectiveInvocation) -> Self {
        self.directives.push(invocation);
        self
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }

    #[must_use]
    pub fn local_named(&self, name: &str) -> Option<(usize, &LocalSpec)> {
        self.locals.iter().enumerate().find(|(_, l)| l.name == name)
    }
}
