use crate::types::TypeRef;
use serde::{Deserialize, Serialize};

///
/// Literal
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Static type of the literal; `null` has none.
    #[must_use]
    pub fn ty(&self) -> Option<TypeRef> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(TypeRef::boolean()),
            Self::Int(v) if i32::try_from(*v).is_ok() => Some(TypeRef::int()),
            Self::Int(_) => Some(TypeRef::long()),
            Self::Float(_) => Some(TypeRef::double()),
            Self::Text(_) => Some(TypeRef::string()),
        }
    }
}

///
/// Expr
///
/// Initializer and default-value expressions. The engine never evaluates
/// them; it only reads their static type for local inference and hands them
/// through to generated bodies.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Literal),

    /// Opaque call such as `System.currentTimeMillis()`.
    Call {
        function: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        returns: Option<TypeRef>,
    },

    /// `new T()`
    New(TypeRef),

    /// Reference to an earlier local binding.
    Local(String),

    /// `receiver.name(..)`
    Method {
        receiver: Box<Expr>,
        name: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        returns: Option<TypeRef>,
    },
}

impl Expr {
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    #[must_use]
    pub const fn int(v: i64) -> Self {
        Self::Literal(Literal::Int(v))
    }

    #[must_use]
    pub const fn bool(v: bool) -> Self {
        Self::Literal(Literal::Bool(v))
    }

    pub fn text(v: impl Into<String>) -> Self {
        Self::Literal(Literal::Text(v.into()))
    }

    pub fn call(function: impl Into<String>) -> Self {
        Self::Call {
            function: function.into(),
            returns: None,
        }
    }

    pub fn call_returning(function: impl Into<String>, returns: TypeRef) -> Self {
        Self::Call {
            function: function.into(),
            returns: Some(returns),
        }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::Local(name.into())
    }

    pub fn method(receiver: Self, name: impl Into<String>, returns: Option<TypeRef>) -> Self {
        Self::Method {
            receiver: Box::new(receiver),
            name: name.into(),
            returns,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Literal(Literal::Null))
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}
