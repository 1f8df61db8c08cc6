use crate::node::TargetKind;
use serde::{Deserialize, Serialize};

///
/// Target
///
/// Where a directive sits inside a class. Methods are addressed by their
/// index in `ClassSpec::methods` so overloads stay distinct.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Class,
    Field {
        field: String,
    },
    Method {
        method: usize,
        name: String,
    },
    Parameter {
        method: usize,
        name: String,
        param: String,
    },
    Local {
        method: usize,
        name: String,
        local: String,
    },
}

impl Target {
    #[must_use]
    pub const fn kind(&self) -> TargetKind {
        match self {
            Self::Class => TargetKind::Class,
            Self::Field { .. } => TargetKind::Field,
            Self::Method { .. } => TargetKind::Method,
            Self::Parameter { .. } => TargetKind::Parameter,
            Self::Local { .. } => TargetKind::Local,
        }
    }

    /// Owning method index, if the target lives inside a method.
    #[must_use]
    pub const fn method(&self) -> Option<usize> {
        match self {
            Self::Method { method, .. }
            | Self::Parameter { method, .. }
            | Self::Local { method, .. } => Some(*method),
            Self::Class | Self::Field { .. } => None,
        }
    }

    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Field { field } => Some(field),
            _ => None,
        }
    }

    /// Stable identifier used in diagnostics: `Class`, `Class.field`,
    /// `Class#method`, `Class#method(param)`, `Class#method:local`.
    #[must_use]
    pub fn describe(&self, class: &str) -> String {
        match self {
            Self::Class => class.to_string(),
            Self::Field { field } => format!("{class}.{field}"),
            Self::Method { name, .. } => format!("{class}#{name}"),
            Self::Parameter { name, param, .. } => format!("{class}#{name}({param})"),
            Self::Local { name, local, .. } => format!("{class}#{name}:{local}"),
        }
    }
}

///
/// DirectiveRef
///
/// Back-reference from a generated member to the directive that produced it.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DirectiveRef {
    /// Position of the directive in the engine's collection order.
    pub id: usize,
    pub name: String,
    pub target: Target,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_formats_each_target_kind() {
        let local = Target::Local {
            method: 0,
            name: "main".into(),
            local: "in".into(),
        };
        let param = Target::Parameter {
            method: 1,
            name: "Person".into(),
            param: "person".into(),
        };

        assert_eq!(Target::Class.describe("Point"), "Point");
        assert_eq!(
            Target::Field { field: "x".into() }.describe("Point"),
            "Point.x"
        );
        assert_eq!(local.describe("CleanupExample"), "CleanupExample#main:in");
        assert_eq!(param.describe("Guarded"), "Guarded#Person(person)");
        assert_eq!(local.method(), Some(0));
    }
}
