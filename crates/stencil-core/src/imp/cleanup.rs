use crate::{
    imp::{Gen, Output, target_method, wrapper},
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    member::{Instruction, Priority},
    target::Target,
};

/// Scoped release of a local; later cleanup locals nest inside earlier ones.
pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let (index, method) = target_method(view, d)?;
    let Target::Local { local, .. } = &d.target else {
        return Err(DirectiveError::schema("cleanup must sit on a local"));
    };

    let (position, spec) = method
        .local_named(local)
        .ok_or_else(|| DirectiveError::schema(format!("unknown local '{local}'")))?;
    let acquire = spec.init.clone().ok_or_else(|| {
        DirectiveError::consistency(format!("cleanup local '{local}' needs an initializer"))
    })?;
    let release = d.params.ident("release").unwrap_or("close").to_string();

    // stays above zero and below every lock and guard wrapper
    let offset = u16::try_from(position).unwrap_or(99).min(99);
    let precedence = Priority::SCOPE - offset;

    let mut out = Output::default();
    out.push(wrapper(
        &Gen::new(view, d),
        index,
        method,
        precedence,
        vec![Instruction::Scoped {
            binding: local.clone(),
            acquire,
            release,
            body: vec![Instruction::Inner],
        }],
    ));

    Ok(out)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, registry::Registry};
    use stencil_schema::{
        expr::Expr,
        node::{ClassSpec, DirectiveInvocation, LocalSpec, MethodSpec},
    };

    fn precedence_of(class: &ClassSpec, local: &str) -> u16 {
        let reg = Registry::catalog();
        let target = Target::Local {
            method: 0,
            name: "copy".into(),
            local: local.into(),
        };
        let d = reg
            .resolve(0, &DirectiveInvocation::local("cleanup"), target)
            .unwrap();
        let cfg = EngineConfig::default();
        let view = ClassView::new(class, &cfg, vec![&d]);

        generate(&view, &d).unwrap().members[0].priority.precedence
    }

    #[test]
    fn later_locals_nest_inside_and_never_reach_zero() {
        let method = (0..150).fold(MethodSpec::new("copy", "copy"), |m, i| {
            m.local(LocalSpec::new(format!("in{i}")).init(Expr::call("open")))
        });
        let class = ClassSpec::new("Copier").method(method);

        let first = precedence_of(&class, "in0");
        let second = precedence_of(&class, "in1");
        let last = precedence_of(&class, "in149");

        assert_eq!(first, Priority::SCOPE);
        assert!(second < first);
        assert!(last > 0);
        assert!(first < Priority::LOCK && first < Priority::NULL_GUARD);
    }
}
