use crate::{
    expr::{Expr, Literal},
    node::BodyHandle,
    target::DirectiveRef,
    types::{TypeRef, Visibility},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Starting value of the hash accumulator.
pub const HASH_SEED: i32 = 1;

/// Multiplier applied to the accumulator before each field is added.
pub const HASH_MULTIPLIER: i32 = 31;

///
/// MemberKind
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Constructor,
    Method,
    Field,
    NestedType,

    /// Wraps a user-written method body; see `GeneratedMember::wraps`.
    Wrapper,
}

///
/// Param
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub non_null: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            non_null: false,
        }
    }
}

///
/// Signature
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Signature {
    pub name: String,
    pub visibility: Visibility,

    #[serde(default)]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    /// Return type for methods, the declared type for fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,
}

impl Signature {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            is_static: false,
            type_params: Vec::new(),
            params: Vec::new(),
            returns: None,
            throws: Vec::new(),
        }
    }

    /// Signature of a synthetic field.
    pub fn field(name: impl Into<String>, ty: TypeRef, visibility: Visibility) -> Self {
        Self {
            returns: Some(ty),
            ..Self::new(name, visibility)
        }
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    #[must_use]
    pub const fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[must_use]
    pub fn type_params(mut self, params: &[String]) -> Self {
        self.type_params = params.to_vec();
        self
    }

    /// Parameter types after erasure against the given class type parameters.
    #[must_use]
    pub fn erased_params(&self, type_params: &[String]) -> Vec<String> {
        self.params
            .iter()
            .map(|p| p.ty.erased(type_params))
            .collect()
    }
}

///
/// Compare
///
/// How a field takes part in equality and hashing.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compare {
    Value,

    /// Element-wise, for arrays.
    Deep,
}

///
/// LockRef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockRef {
    /// The class-owned lock; static methods use the per-class instance.
    Implicit { is_static: bool },

    /// A lock-typed field of the class.
    Named(String),
}

///
/// LockMode
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    Read,
    Write,
    Exclusive,
}

///
/// Operand
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Field(String),
    Param(String),
    Literal(Literal),
    This,

    /// Builder field that falls back to its default expression when the
    /// `flag` field was never set. The expression runs at read time.
    Defaulted {
        field: String,
        flag: String,
        expr: Expr,
    },

    /// Fresh copy of an accumulated collection; `unique` drops duplicates
    /// while keeping first-insertion order.
    Snapshot {
        field: String,
        unique: bool,
    },
}

///
/// Instruction
///
/// Body template of a generated member. Statements execute in order; any
/// `Return*` ends the body.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Store a field's default initializer.
    InitDefault { field: String, expr: Expr },

    /// Fail with an invalid-argument failure when the parameter is null.
    RequireNonNull { name: String },

    Assign { field: String, value: Operand },

    /// Push one element into a collection field.
    Append { field: String, value: Operand },

    /// Push every element of a collection operand.
    AppendAll { field: String, value: Operand },

    Clear { field: String },

    Return(Operand),
    ReturnThis,

    /// Construct `class`; `args` go to the constructor with that arity,
    /// `init` pairs are then stored directly into the new instance.
    ReturnNew {
        class: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Operand>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        init: Vec<(String, Operand)>,
    },

    /// Return the receiver when `param` is identical to the current value.
    ReturnThisIfUnchanged { field: String, param: String },

    /// Read-through cache; runs `init` at most once per instance.
    LazyGet { field: String, init: Expr },

    /// `true` for the same object, `false` for null or another class.
    EnsureSameType { param: String },

    /// Return `false` unless the field matches on both sides.
    CompareField {
        field: String,
        param: String,
        mode: Compare,
    },

    HashSeed(i32),
    HashField { field: String, mode: Compare },
    ReturnHash,

    WithLock {
        lock: LockRef,
        mode: LockMode,
        body: Vec<Instruction>,
    },

    /// Bind `acquire` to `binding`, run `body`, then call `release` on it.
    Scoped {
        binding: String,
        acquire: Expr,
        release: String,
        body: Vec<Instruction>,
    },

    /// Transparent pass-through of the listed failure kinds (all when empty).
    Rethrow {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        kinds: Vec<TypeRef>,
        body: Vec<Instruction>,
    },

    /// The `this(..)`/`super(..)` prefix of a user constructor.
    DelegateCall { body: BodyHandle },

    /// The user-written body.
    Invoke { body: BodyHandle },

    /// Placeholder for the next wrapper layer.
    Inner,
}

impl Instruction {
    /// Replace every `Inner` placeholder with `inner`.
    #[must_use]
    pub fn substitute(self, inner: &[Self]) -> Vec<Self> {
        match self {
            Self::Inner => inner.to_vec(),
            Self::WithLock { lock, mode, body } => vec![Self::WithLock {
                lock,
                mode,
                body: substitute_all(body, inner),
            }],
            Self::Scoped {
                binding,
                acquire,
                release,
                body,
            } => vec![Self::Scoped {
                binding,
                acquire,
                release,
                body: substitute_all(body, inner),
            }],
            Self::Rethrow { kinds, body } => vec![Self::Rethrow {
                kinds,
                body: substitute_all(body, inner),
            }],
            other => vec![other],
        }
    }
}

/// Substitute `inner` into every placeholder of a body.
#[must_use]
pub fn substitute_all(body: Vec<Instruction>, inner: &[Instruction]) -> Vec<Instruction> {
    body.into_iter()
        .flat_map(|i| i.substitute(inner))
        .collect()
}

///
/// Section
///
/// Placement bucket; members print section by section in this order.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Field,
    Constructor,
    Accessor,
    Copy,
    Equality,
    Builder,
    Wrapper,
    Type,
}

///
/// Priority
///
/// Precedence decides conflicts between candidates with the same key;
/// section and anchor decide placement.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Priority {
    pub precedence: u16,
    pub section: Section,

    /// Declaration index of the field or method the member belongs to.
    pub anchor: u32,
}

impl Priority {
    pub const EXPLICIT: u16 = 100;
    pub const IMPLIED: u16 = 10;

    // wrapper nesting, outermost first
    pub const RETHROW: u16 = 400;
    pub const NULL_GUARD: u16 = 300;
    pub const LOCK: u16 = 200;
    pub const SCOPE: u16 = 100;

    #[must_use]
    pub const fn new(precedence: u16, section: Section, anchor: u32) -> Self {
        Self {
            precedence,
            section,
            anchor,
        }
    }

    #[must_use]
    pub const fn explicit(section: Section, anchor: u32) -> Self {
        Self::new(Self::EXPLICIT, section, anchor)
    }

    #[must_use]
    pub const fn implied(section: Section, anchor: u32) -> Self {
        Self::new(Self::IMPLIED, section, anchor)
    }

    /// Placement order: section, anchor, then higher precedence first.
    #[must_use]
    pub fn placement(&self, other: &Self) -> Ordering {
        self.section
            .cmp(&other.section)
            .then(self.anchor.cmp(&other.anchor))
            .then(other.precedence.cmp(&self.precedence))
    }
}

///
/// GeneratedMember
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeneratedMember {
    pub kind: MemberKind,
    pub signature: Signature,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Instruction>,

    pub source: DirectiveRef,
    pub priority: Priority,

    /// Contributed by a composite directive; yields silently to explicit
    /// candidates and user code.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub implied: bool,

    /// Index of the wrapped user method, for wrappers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wraps: Option<usize>,

    /// Members of a nested type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<GeneratedMember>,
}

impl GeneratedMember {
    #[must_use]
    pub const fn new(
        kind: MemberKind,
        signature: Signature,
        body: Vec<Instruction>,
        source: DirectiveRef,
        priority: Priority,
    ) -> Self {
        Self {
            kind,
            signature,
            body,
            source,
            priority,
            implied: false,
            wraps: None,
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn implied(mut self) -> Self {
        self.implied = true;
        self.priority.precedence = self.priority.precedence.min(Priority::IMPLIED);
        self
    }

    #[must_use]
    pub const fn wrapping(mut self, method: usize) -> Self {
        self.wraps = Some(method);
        self
    }

    #[must_use]
    pub fn with_nested(mut self, nested: Vec<Self>) -> Self {
        self.nested = nested;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Content equality, ignoring provenance.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.signature == other.signature
            && self.body == other.body
            && self.nested.len() == other.nested.len()
            && self
                .nested
                .iter()
                .zip(&other.nested)
                .all(|(a, b)| a.same_content(b))
    }

    /// Find a nested member by name and kind.
    #[must_use]
    pub fn nested_member(&self, kind: MemberKind, name: &str) -> Option<&Self> {
        self.nested
            .iter()
            .find(|m| m.kind == kind && m.signature.name == name)
    }
}

///
/// TESTS
///
