use crate::{
    config::EngineConfig,
    directive_kind::DirectiveKind,
    registry::{Arg, Directive},
};
use std::collections::BTreeMap;
use stencil_schema::{
    node::{ClassSpec, FieldSpec},
    target::Target,
    types::Access,
};

///
/// Layer
///
/// Where an accessor setting came from. Later layers override earlier ones.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Layer {
    Implied,
    Class,
    Field,
}

///
/// Slot
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Slot<T> {
    pub value: T,
    pub source: usize,
    pub layer: Layer,
}

///
/// AccessorPlan
///
/// Effective accessor settings of one field after layering.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AccessorPlan {
    pub read: Option<Slot<Access>>,
    pub write: Option<Slot<Access>>,
    pub lazy: Option<Slot<bool>>,
}

impl AccessorPlan {
    fn apply(&mut self, d: &Directive, layer: Layer) {
        let slot = |value| Slot {
            value,
            source: d.id,
            layer,
        };

        if let Some(Arg::Access(a)) = d.params.layer("read") {
            self.read = Some(slot(*a));
        }
        if let Some(Arg::Access(a)) = d.params.layer("write") {
            self.write = Some(slot(*a));
        }
        if let Some(Arg::Bool(b)) = d.params.layer("lazy") {
            self.lazy = Some(Slot {
                value: *b,
                source: d.id,
                layer,
            });
        }
    }

    #[must_use]
    pub fn wants_lazy(&self) -> bool {
        self.lazy.is_some_and(|s| s.value)
    }
}

///
/// AllArgsProvider
///
/// Who supplies the constructor taking every instance field.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AllArgsProvider {
    Directive,
    User,

    /// Implied by `value`, or by `data` when no field has a default.
    Implied,
    Builder,
    None,
}

///
/// ClassView
///
/// Read-only view over a class and its live directives, shared by every
/// generator.
///

pub struct ClassView<'a> {
    class: &'a ClassSpec,
    config: &'a EngineConfig,
    directives: Vec<&'a Directive>,
    accessors: BTreeMap<String, AccessorPlan>,
}

impl<'a> ClassView<'a> {
    #[must_use]
    pub fn new(
        class: &'a ClassSpec,
        config: &'a EngineConfig,
        directives: Vec<&'a Directive>,
    ) -> Self {
        let accessors = plan_accessors(class, &directives);

        Self {
            class,
            config,
            directives,
            accessors,
        }
    }

    #[must_use]
    pub const fn class(&self) -> &'a ClassSpec {
        self.class
    }

    #[must_use]
    pub const fn config(&self) -> &'a EngineConfig {
        self.config
    }

    #[must_use]
    pub fn describe(&self, target: &Target) -> String {
        target.describe(&self.class.name)
    }

    pub fn by_kind(&self, kind: DirectiveKind) -> impl Iterator<Item = &'a Directive> + '_ {
        self.directives.iter().copied().filter(move |d| d.kind == kind)
    }

    #[must_use]
    pub fn has(&self, kind: DirectiveKind) -> bool {
        self.by_kind(kind).next().is_some()
    }

    /// Live marker directive of `kind` on a field.
    #[must_use]
    pub fn field_marker(&self, field: &str, kind: DirectiveKind) -> Option<&'a Directive> {
        self.by_kind(kind)
            .find(|d| d.target.field_name() == Some(field))
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        self.has(DirectiveKind::Value)
    }

    #[must_use]
    pub fn field_index(&self, name: &str) -> u32 {
        let index = self
            .class
            .fields
            .iter()
            .position(|f| f.name == name)
            .unwrap_or(usize::MAX);

        u32::try_from(index).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn is_non_null(&self, field: &str) -> bool {
        self.field_marker(field, DirectiveKind::NonNull).is_some()
    }

    /// Final after the value directive has been applied.
    #[must_use]
    pub fn effectively_final(&self, field: &FieldSpec) -> bool {
        field.is_final()
            || (self.is_value()
                && !field.is_static()
                && self.field_marker(&field.name, DirectiveKind::NonFinal).is_none())
    }

    #[must_use]
    pub fn accessor(&self, field: &str) -> AccessorPlan {
        self.accessors.get(field).copied().unwrap_or_default()
    }

    /// A lazy slot that will actually be generated.
    #[must_use]
    pub fn is_lazy(&self, field: &FieldSpec) -> bool {
        let plan = self.accessor(&field.name);

        plan.wants_lazy()
            && plan.read.is_some_and(|s| s.value != Access::None)
            && !field.is_static()
            && field.has_default()
            && self.effectively_final(field)
    }

    /// Constructor parameters: every non-static, non-lazy field, optionally
    /// only those without a default expression.
    #[must_use]
    pub fn constructor_fields(&self, required_only: bool) -> Vec<&'a FieldSpec> {
        self.class
            .instance_fields()
            .filter(|f| !self.is_lazy(f))
            .filter(|f| !(required_only && f.has_default()))
            .collect()
    }

    #[must_use]
    pub fn erased(&self, fields: &[&FieldSpec]) -> Vec<String> {
        fields
            .iter()
            .map(|f| f.ty.erased(&self.class.type_params))
            .collect()
    }

    /// A constructor directive that will generate something.
    #[must_use]
    pub fn has_constructor_directive(&self) -> bool {
        [
            DirectiveKind::AllArgsConstructor,
            DirectiveKind::RequiredArgsConstructor,
        ]
        .into_iter()
        .flat_map(|k| self.by_kind(k))
        .any(|d| d.params.access("access") != Some(Access::None))
    }

    #[must_use]
    pub fn has_user_constructor(&self) -> bool {
        self.class.constructors().next().is_some()
    }

    #[must_use]
    pub fn all_args_provider(&self) -> AllArgsProvider {
        let all = self.erased(&self.constructor_fields(false));
        let required = self.erased(&self.constructor_fields(true));
        let generates = |kind| {
            self.by_kind(kind)
                .any(|d: &Directive| d.params.access("access") != Some(Access::None))
        };

        if generates(DirectiveKind::AllArgsConstructor)
            || (required == all && generates(DirectiveKind::RequiredArgsConstructor))
        {
            return AllArgsProvider::Directive;
        }

        let user = self.class.constructors().any(|m| {
            let params: Vec<_> = m
                .params
                .iter()
                .map(|p| p.ty.erased(&self.class.type_params))
                .collect();
            params == all
        });
        if user {
            return AllArgsProvider::User;
        }
        let composite = self.is_value() || (required == all && self.has(DirectiveKind::Data));
        if composite && !self.has_constructor_directive() && !self.has_user_constructor() {
            return AllArgsProvider::Implied;
        }
        if self.has(DirectiveKind::Builder) {
            return AllArgsProvider::Builder;
        }

        AllArgsProvider::None
    }
}

// plan_accessors
// implied layers first, then class-level directives, then field-level ones
fn plan_accessors(class: &ClassSpec, directives: &[&Directive]) -> BTreeMap<String, AccessorPlan> {
    let mut plans = BTreeMap::new();

    for field in &class.fields {
        let mut plan = AccessorPlan::default();

        if !field.is_static() {
            for d in directives {
                let implied = |value| Slot {
                    value,
                    source: d.id,
                    layer: Layer::Implied,
                };
                match d.kind {
                    DirectiveKind::Data => {
                        plan.read = Some(implied(Access::Public));
                        plan.write = Some(implied(Access::Public));
                    }
                    DirectiveKind::Value => plan.read = Some(implied(Access::Public)),
                    _ => {}
                }
            }
            for d in directives
                .iter()
                .filter(|d| d.kind == DirectiveKind::Accessor && d.target == Target::Class)
            {
                plan.apply(d, Layer::Class);
            }
        }

        for d in directives.iter().filter(|d| {
            d.kind == DirectiveKind::Accessor && d.target.field_name() == Some(field.name.as_str())
        }) {
            plan.apply(d, Layer::Field);
        }

        plans.insert(field.name.clone(), plan);
    }

    plans
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use stencil_schema::{
        expr::Expr,
        node::{DirectiveInvocation, FieldSpec},
        types::TypeRef,
    };

    fn resolve(reg: &Registry, id: usize, inv: &DirectiveInvocation, target: Target) -> Directive {
        reg.resolve(id, inv, target).unwrap()
    }

    #[test]
    fn field_layer_overrides_only_what_it_supplies() {
        let reg = Registry::catalog();
        let class = ClassSpec::new("Person")
            .field(FieldSpec::new("name", TypeRef::string()))
            .field(FieldSpec::new("age", TypeRef::int()));
        let directives = [
            resolve(&reg, 0, &DirectiveInvocation::class("data"), Target::Class),
            resolve(
                &reg,
                1,
                &DirectiveInvocation::field("setter").param("write", "private"),
                Target::Field {
                    field: "age".into(),
                },
            ),
        ];
        let cfg = EngineConfig::default();
        let view = ClassView::new(&class, &cfg, directives.iter().collect());

        let age = view.accessor("age");
        assert_eq!(age.read.unwrap().layer, Layer::Implied);
        assert_eq!(age.write.unwrap().value, Access::Private);
        assert_eq!(age.write.unwrap().source, 1);

        let name = view.accessor("name");
        assert_eq!(name.write.unwrap().value, Access::Public);
    }

    #[test]
    fn lazy_requires_final_field_with_initializer() {
        let reg = Registry::catalog();
        let class = ClassSpec::new("Cache")
            .field(
                FieldSpec::new("table", TypeRef::array_of(TypeRef::double()))
                    .final_()
                    .default_value(Expr::call("calculate")),
            )
            .field(FieldSpec::new("plain", TypeRef::int()));
        let getter = DirectiveInvocation::field("getter").param("lazy", true);
        let directives = [
            resolve(&reg, 0, &getter, Target::Field {
                field: "table".into(),
            }),
            resolve(&reg, 1, &getter, Target::Field {
                field: "plain".into(),
            }),
        ];
        let cfg = EngineConfig::default();
        let view = ClassView::new(&class, &cfg, directives.iter().collect());

        assert!(view.is_lazy(&class.fields[0]));
        assert!(!view.is_lazy(&class.fields[1]));
        assert_eq!(view.constructor_fields(false).len(), 1);
    }

    #[test]
    fn value_supplies_all_args_unless_a_constructor_exists() {
        let reg = Registry::catalog();
        let class = ClassSpec::new("Point")
            .field(FieldSpec::new("x", TypeRef::int()))
            .field(FieldSpec::new("y", TypeRef::int()));
        let value = resolve(&reg, 0, &DirectiveInvocation::class("value"), Target::Class);
        let required = resolve(
            &reg,
            1,
            &DirectiveInvocation::class("required_args_constructor"),
            Target::Class,
        );
        let cfg = EngineConfig::default();

        let view = ClassView::new(&class, &cfg, vec![&value]);
        assert_eq!(view.all_args_provider(), AllArgsProvider::Implied);
        assert!(view.effectively_final(&class.fields[0]));

        // without defaults the required-args signature is the all-args one
        let view = ClassView::new(&class, &cfg, vec![&value, &required]);
        assert_eq!(view.all_args_provider(), AllArgsProvider::Directive);
    }
}
