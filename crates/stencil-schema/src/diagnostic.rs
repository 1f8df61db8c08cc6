use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Severity
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

///
/// ReasonCode
///
/// Stable, machine-checkable reason attached to every diagnostic. The
/// serialized form never changes between releases.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ReasonCode {
    Ambiguity,
    Conflict,
    Consistency,
    Coverage,
    Overridden,
    Schema,
}

impl ReasonCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambiguity => "ambiguity",
            Self::Conflict => "conflict",
            Self::Consistency => "consistency",
            Self::Coverage => "coverage",
            Self::Overridden => "overridden",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Directive the diagnostic belongs to; absent for model-level issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,

    pub target: String,
    pub severity: Severity,
    pub code: ReasonCode,
    pub message: String,
}

impl Diagnostic {
    pub fn error(
        code: ReasonCode,
        directive: Option<&str>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            directive: directive.map(ToString::to_string),
            target: target.into(),
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(
        code: ReasonCode,
        directive: Option<&str>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, directive, target, message)
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        match &self.directive {
            Some(directive) => write!(
                f,
                "{severity}[{}] {} ({directive}): {}",
                self.code, self.target, self.message
            ),
            None => write!(
                f,
                "{severity}[{}] {}: {}",
                self.code, self.target, self.message
            ),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_serialize_to_stable_strings() {
        let json = serde_json::to_string(&ReasonCode::Consistency).unwrap();
        assert_eq!(json, "\"consistency\"");

        for code in [
            ReasonCode::Ambiguity,
            ReasonCode::Conflict,
            ReasonCode::Coverage,
            ReasonCode::Overridden,
            ReasonCode::Schema,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn display_includes_directive_when_present() {
        let diag = Diagnostic::error(
            ReasonCode::Schema,
            Some("getter"),
            "Point.x",
            "unknown parameter 'fast'",
        );

        assert_eq!(
            diag.to_string(),
            "error[schema] Point.x (getter): unknown parameter 'fast'"
        );
    }
}
