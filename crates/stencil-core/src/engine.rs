use crate::{
    assemble::assemble,
    config::EngineConfig,
    imp::Edit,
    registry::{Directive, Registry, SchemaError},
    resolve::resolve,
    view::ClassView,
};
use log::{debug, warn};
use std::{borrow::Cow, collections::BTreeSet};
use stencil_schema::{
    MAX_IDENT_LEN,
    diagnostic::{Diagnostic, ReasonCode},
    member::MemberKind,
    node::{ClassSpec, DirectiveInvocation},
    result::EmissionResult,
    target::Target,
};

///
/// Engine
///
/// Stateless pipeline driver. Every call to [`Engine::process`] recomputes
/// everything from the class snapshot.
///

#[derive(Clone, Debug)]
pub struct Engine {
    registry: Registry,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the built-in directive catalog and default naming.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::catalog(),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every directive on `class`. Never fails: each problem becomes a
    /// diagnostic that disables at most the directive it belongs to.
    #[must_use]
    pub fn process(&self, class: &ClassSpec) -> EmissionResult {
        let mut diagnostics = Vec::new();
        let class = check_model(class, &mut diagnostics);
        let class = class.as_ref();

        // Phase 1: schema validation, then per-target duplicates and
        // exclusions. The later invocation loses.
        let mut live: Vec<Directive> = Vec::new();
        for (id, (target, inv)) in invocations(class).into_iter().enumerate() {
            let checked = self
                .registry
                .resolve(id, inv, target.clone())
                .and_then(|d| self.check_siblings(&live, d));

            match checked {
                Ok(d) => live.push(d),
                Err(err) => diagnostics.push(Diagnostic::error(
                    ReasonCode::Schema,
                    Some(inv.name.as_str()),
                    target.describe(&class.name),
                    err.to_string(),
                )),
            }
        }
        debug!("Engine: {} directive(s) on '{}' passed schema", live.len(), class.name);

        // Phase 2: local checks on markers
        live.retain(|d| match d.kind.check(class, d) {
            Ok(()) => true,
            Err(err) => {
                diagnostics.push(d.diagnostic(&class.name, &err));
                false
            }
        });

        // Phase 3: generate against a shared read-only view
        let view = ClassView::new(class, &self.config, live.iter().collect());
        let mut batches = Vec::new();
        let mut edits: Vec<(usize, Edit)> = Vec::new();
        for d in live.iter().filter(|d| !d.kind.is_marker()) {
            match d.kind.generate(&view, d) {
                Ok(out) => {
                    debug!("Engine: '{}' produced {} candidate(s)", d.name, out.members.len());
                    edits.extend(out.edits.into_iter().map(|e| (d.id, e)));
                    batches.push((d, out.members));
                }
                Err(err) => diagnostics.push(d.diagnostic(&class.name, &err)),
            }
        }

        // Phase 4: resolution
        let resolution = resolve(class, batches);
        diagnostics.extend(resolution.diagnostics);
        let edits: Vec<Edit> = edits
            .into_iter()
            .filter(|(id, _)| !resolution.rejected.contains(id))
            .map(|(_, e)| e)
            .collect();
        debug!(
            "Engine: {} member(s) accepted, {} directive(s) rejected",
            resolution.members.len(),
            resolution.rejected.len()
        );

        // Phase 5: a final field nothing can initialize
        let has_constructor = class.constructors().next().is_some()
            || resolution
                .members
                .iter()
                .any(|m| m.kind == MemberKind::Constructor);
        if !has_constructor {
            for f in class.instance_fields() {
                if view.effectively_final(f) && !f.has_default() {
                    diagnostics.push(Diagnostic::error(
                        ReasonCode::Coverage,
                        None,
                        Target::Field {
                            field: f.name.clone(),
                        }
                        .describe(&class.name),
                        format!("final field '{}' is never initialized: no constructor", f.name),
                    ));
                }
            }
        }

        // Phase 6: assembly
        let assembly = assemble(class, resolution.members, &edits);

        for d in diagnostics.iter().filter(|d| d.is_error()) {
            warn!("{d}");
        }

        EmissionResult {
            class: assembly.class,
            members: assembly.members,
            diagnostics,
        }
    }

    // check_siblings
    // a directive may appear once per target, and never next to one it
    // excludes
    fn check_siblings(&self, live: &[Directive], d: Directive) -> Result<Directive, SchemaError> {
        for prev in live.iter().filter(|p| p.target == d.target) {
            if prev.name == d.name {
                return Err(SchemaError::DuplicateDirective {
                    directive: d.name.clone(),
                });
            }
            if self.registry.excludes(&prev.name, &d.name) {
                return Err(SchemaError::Excluded {
                    directive: d.name.clone(),
                    other: prev.name.clone(),
                });
            }
        }

        Ok(d)
    }
}

// check_model
// duplicate fields keep the first declaration; overlong identifiers are
// reported but left alone
fn check_model<'a>(class: &'a ClassSpec, diagnostics: &mut Vec<Diagnostic>) -> Cow<'a, ClassSpec> {
    let mut names = BTreeSet::new();
    let mut duplicates = Vec::new();

    for (i, f) in class.fields.iter().enumerate() {
        if !names.insert(f.name.as_str()) {
            duplicates.push(i);
            diagnostics.push(Diagnostic::error(
                ReasonCode::Schema,
                None,
                format!("{}.{}", class.name, f.name),
                format!("field '{}' is declared more than once", f.name),
            ));
        }
    }

    let idents = std::iter::once(&class.name)
        .chain(class.fields.iter().map(|f| &f.name))
        .chain(class.methods.iter().map(|m| &m.name));
    for ident in idents.filter(|s| s.len() > MAX_IDENT_LEN) {
        diagnostics.push(Diagnostic::error(
            ReasonCode::Schema,
            None,
            class.name.clone(),
            format!("identifier exceeds {MAX_IDENT_LEN} characters: {ident}"),
        ));
    }

    if duplicates.is_empty() {
        return Cow::Borrowed(class);
    }

    let mut owned = class.clone();
    let mut i = 0;
    owned.fields.retain(|_| {
        let keep = !duplicates.contains(&i);
        i += 1;
        keep
    });

    Cow::Owned(owned)
}

// invocations
// class directives first, then fields, then methods with their parameters
// and locals; the position doubles as the directive id
fn invocations(class: &ClassSpec) -> Vec<(Target, &DirectiveInvocation)> {
    let mut out: Vec<_> = class
        .directives
        .iter()
        .map(|inv| (Target::Class, inv))
        .collect();

    for f in &class.fields {
        let target = Target::Field {
            field: f.name.clone(),
        };
        out.extend(f.directives.iter().map(|inv| (target.clone(), inv)));
    }

    for (index, m) in class.methods.iter().enumerate() {
        let target = Target::Method {
            method: index,
            name: m.name.clone(),
        };
        out.extend(m.directives.iter().map(|inv| (target.clone(), inv)));

        for p in &m.params {
            let target = Target::Parameter {
                method: index,
                name: m.name.clone(),
                param: p.name.clone(),
            };
            out.extend(p.directives.iter().map(|inv| (target.clone(), inv)));
        }
        for l in &m.locals {
            let target = Target::Local {
                method: index,
                name: m.name.clone(),
                local: l.name.clone(),
            };
            out.extend(l.directives.iter().map(|inv| (target.clone(), inv)));
        }
    }

    out
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_schema::{
        expr::Expr,
        member::{Instruction, Operand},
        node::{FieldSpec, LocalSpec, MethodSpec, ParamSpec},
        types::{TypeRef, Visibility},
    };

    fn point() -> ClassSpec {
        ClassSpec::new("Point")
            .directive(DirectiveInvocation::class("data"))
            .field(FieldSpec::new("x", TypeRef::int()).final_())
            .field(FieldSpec::new("y", TypeRef::int()).final_())
    }

    #[test]
    fn data_point_gets_constructor_getters_and_equality() {
        let out = Engine::new().process(&point());

        assert!(!out.has_errors(), "{:?}", out.diagnostics);
        assert!(out.method("getX").is_some());
        assert!(out.method("getY").is_some());
        assert!(out.method("setX").is_none());
        assert!(out.method("equals").is_some());
        assert!(out.method("hashCode").is_some());

        let ctor = out.constructor_with_arity(2).unwrap();
        assert_eq!(ctor.signature.visibility, Visibility::Public);
        assert_eq!(out.constructors().count(), 1);
    }

    #[test]
    fn members_come_out_in_section_order() {
        let out = Engine::new().process(&point());
        let kinds: Vec<_> = out.members.iter().map(|m| m.priority.section).collect();

        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }

    #[test]
    fn same_shape_constructors_from_two_directives_are_ambiguous() {
        let class = ClassSpec::new("Point")
            .directive(DirectiveInvocation::class("required_args_constructor"))
            .directive(DirectiveInvocation::class("all_args_constructor"))
            .field(FieldSpec::new("x", TypeRef::int()))
            .field(FieldSpec::new("y", TypeRef::int()));
        let out = Engine::new().process(&class);

        assert_eq!(out.constructors().count(), 1);
        let diag = out.with_code(ReasonCode::Ambiguity).next().unwrap();
        assert_eq!(diag.directive.as_deref(), Some("all_args_constructor"));
        assert!(diag.is_error());
    }

    #[test]
    fn excluded_pair_rejects_the_later_directive() {
        let class = point().directive(DirectiveInvocation::class("value"));
        let out = Engine::new().process(&class);

        let diag = out.with_code(ReasonCode::Schema).next().unwrap();
        assert_eq!(diag.directive.as_deref(), Some("value"));
        assert!(!out.class.is_final);
        assert!(out.method("getX").is_some());
    }

    #[test]
    fn duplicate_field_keeps_the_first() {
        let class = ClassSpec::new("Dup")
            .directive(DirectiveInvocation::class("all_args_constructor"))
            .field(FieldSpec::new("a", TypeRef::int()))
            .field(FieldSpec::new("a", TypeRef::string()));

        let out = Engine::new().process(&class);

        assert_eq!(out.class.fields.len(), 1);
        assert_eq!(out.class.fields[0].ty, TypeRef::int());
        assert_eq!(out.constructor_with_arity(1).unwrap().signature.params[0].ty, TypeRef::int());
        assert_eq!(out.with_code(ReasonCode::Schema).count(), 1);
    }

    #[test]
    fn one_bad_directive_leaves_siblings_alone() {
        let class = ClassSpec::new("Account")
            .directive(DirectiveInvocation::class("equals_and_hash_code").param("exclude", ["nope"]))
            .field(FieldSpec::new("id", TypeRef::long()).directive(DirectiveInvocation::field("getter")));

        let out = Engine::new().process(&class);

        assert_eq!(out.errors().count(), 1);
        assert!(out.method("getId").is_some());
        assert!(out.method("equals").is_none());
    }

    #[test]
    fn uninitialized_final_field_is_reported() {
        let class = ClassSpec::new("Config")
            .field(FieldSpec::new("name", TypeRef::string()).final_())
            .field(FieldSpec::new("port", TypeRef::int()).final_().default_value(Expr::int(80)));

        let out = Engine::new().process(&class);
        let diags: Vec<_> = out.with_code(ReasonCode::Coverage).collect();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].target, "Config.name");
        assert!(diags[0].directive.is_none());
    }

    #[test]
    fn user_getter_overrides_generated_one() {
        let class = ClassSpec::new("User")
            .field(
                FieldSpec::new("name", TypeRef::string())
                    .directive(DirectiveInvocation::field("getter")),
            )
            .method(MethodSpec::new("getName", "custom").returns(TypeRef::string()));

        let out = Engine::new().process(&class);

        assert!(out.method("getName").is_none());
        let diag = out.with_code(ReasonCode::Overridden).next().unwrap();
        assert!(!diag.is_error());
    }

    #[test]
    fn val_records_the_inferred_type() {
        let class = ClassSpec::new("Main").method(
            MethodSpec::new("main", "main").static_().local(
                LocalSpec::new("greeting")
                    .init(Expr::text("hi"))
                    .directive(DirectiveInvocation::local("val")),
            ),
        );

        let out = Engine::new().process(&class);
        let local = &out.class.methods[0].locals[0];

        assert_eq!(local.ty, Some(TypeRef::string()));
        assert!(local.is_final);
        assert!(class.methods[0].locals[0].ty.is_none());
    }

    #[test]
    fn guarded_parameter_wraps_the_body() {
        let class = ClassSpec::new("Greeter").method(
            MethodSpec::new("greet", "greet").param(
                ParamSpec::new("name", TypeRef::string())
                    .directive(DirectiveInvocation::parameter("non_null")),
            ),
        );

        let out = Engine::new().process(&class);
        let w = out.wrapper_for(0).unwrap();

        assert_eq!(
            w.body[0],
            Instruction::RequireNonNull {
                name: "name".into()
            }
        );
        assert!(w.signature.params[0].non_null);
    }

    #[test]
    fn primitive_guard_is_only_a_warning() {
        let class = ClassSpec::new("Counter")
            .directive(DirectiveInvocation::class("all_args_constructor"))
            .field(FieldSpec::new("n", TypeRef::int()).directive(DirectiveInvocation::field("non_null")));

        let out = Engine::new().process(&class);

        assert!(!out.has_errors());
        assert_eq!(out.warnings().count(), 1);
        let ctor = out.constructor_with_arity(1).unwrap();
        assert_eq!(
            ctor.body,
            vec![Instruction::Assign {
                field: "n".into(),
                value: Operand::Param("n".into()),
            }]
        );
    }
}
