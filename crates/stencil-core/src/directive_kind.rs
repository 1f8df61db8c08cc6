use crate::{
    imp::{self, Output},
    registry::Directive,
    view::ClassView,
};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use stencil_schema::{error::DirectiveError, node::ClassSpec};

///
/// DirectiveKind
///
/// Generator family a directive name dispatches to.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[remain::sorted]
pub enum DirectiveKind {
    Accessor,
    AllArgsConstructor,
    Builder,
    BuilderDefault,
    Cleanup,
    Data,
    EqualityExclude,
    EqualsAndHashCode,
    Locked,
    LockedRead,
    LockedWrite,
    NonFinal,
    NonNull,
    RequiredArgsConstructor,
    Singular,
    SneakyThrows,
    Val,
    Value,
    Var,
    With,
}

impl DirectiveKind {
    /// Markers produce nothing themselves; other generators read them.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        matches!(
            self,
            Self::BuilderDefault | Self::EqualityExclude | Self::NonFinal | Self::Singular
        )
    }

    /// Local checks that decide whether a marker is live before any
    /// generator sees it.
    #[remain::check]
    pub(crate) fn check(self, class: &ClassSpec, d: &Directive) -> Result<(), DirectiveError> {
        #[remain::sorted]
        match self {
            Self::BuilderDefault => imp::builder::check_default(class, d),
            Self::NonNull => imp::non_null::check(class, d),
            Self::Singular => imp::builder::check_singular(class, d),
            _ => Ok(()),
        }
    }

    #[remain::check]
    pub(crate) fn generate(self, view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
        #[remain::sorted]
        match self {
            Self::Accessor => imp::accessor::generate(view, d),
            Self::AllArgsConstructor => imp::constructor::generate(view, d, false),
            Self::Builder => imp::builder::generate(view, d),
            Self::BuilderDefault => Ok(Output::default()),
            Self::Cleanup => imp::cleanup::generate(view, d),
            Self::Data => imp::data::generate(view, d),
            Self::EqualityExclude => Ok(Output::default()),
            Self::EqualsAndHashCode => imp::equality::generate(view, d),
            Self::Locked => imp::locked::generate(view, d),
            Self::LockedRead => imp::locked::generate(view, d),
            Self::LockedWrite => imp::locked::generate(view, d),
            Self::NonFinal => Ok(Output::default()),
            Self::NonNull => imp::non_null::generate(view, d),
            Self::RequiredArgsConstructor => imp::constructor::generate(view, d, true),
            Self::Singular => Ok(Output::default()),
            Self::SneakyThrows => imp::sneaky::generate(view, d),
            Self::Val => imp::infer::generate(view, d),
            Self::Value => imp::value::generate(view, d),
            Self::Var => imp::infer::generate(view, d),
            Self::With => imp::value::generate_with(view, d),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_round_trips_through_display() {
        for kind in [DirectiveKind::Accessor, DirectiveKind::SneakyThrows, DirectiveKind::Val] {
            assert_eq!(DirectiveKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert!(DirectiveKind::Singular.is_marker());
        assert!(!DirectiveKind::NonNull.is_marker());
    }
}
