use crate::{
    directive_kind::DirectiveKind,
    imp::{Edit, Output, target_method},
    registry::Directive,
    view::ClassView,
};
use stencil_schema::{
    error::DirectiveError,
    expr::Expr,
    node::MethodSpec,
    target::Target,
    types::TypeRef,
};

/// Fix the type of a `val`/`var` local from its initializer.
pub fn generate(view: &ClassView, d: &Directive) -> Result<Output, DirectiveError> {
    let (index, method) = target_method(view, d)?;
    let Target::Local { local, .. } = &d.target else {
        return Err(DirectiveError::schema(format!("'{}' must sit on a local", d.name)));
    };
    let (position, spec) = method
        .local_named(local)
        .ok_or_else(|| DirectiveError::schema(format!("unknown local '{local}'")))?;

    if let Some(ty) = &spec.ty {
        return Err(DirectiveError::schema(format!(
            "'{local}' already declares type {ty}"
        )));
    }
    let init = spec.init.as_ref().ok_or_else(|| {
        DirectiveError::consistency(format!("'{local}' needs an initializer to infer its type"))
    })?;
    if init.is_null() {
        return Err(DirectiveError::consistency(format!(
            "cannot infer the type of '{local}' from null"
        )));
    }
    let ty = infer(method, position, init).ok_or_else(|| {
        DirectiveError::consistency(format!("cannot infer the type of '{local}'"))
    })?;

    let is_final = d.kind == DirectiveKind::Val;
    if is_final && !spec.reassigned.is_empty() {
        return Err(DirectiveError::consistency(format!(
            "'{local}' is final and cannot be reassigned"
        )));
    }
    for expr in &spec.reassigned {
        if !compatible(method, &ty, expr) {
            return Err(DirectiveError::consistency(format!(
                "'{local}' has type {ty} and cannot be reassigned an incompatible value"
            )));
        }
    }

    let mut out = Output::default();
    out.edit(Edit::LocalType {
        method: index,
        local: local.clone(),
        ty,
        is_final,
    });

    Ok(out)
}

/// Static type of `expr` as seen by the local at `position`.
#[must_use]
pub fn infer(method: &MethodSpec, position: usize, expr: &Expr) -> Option<TypeRef> {
    match expr {
        Expr::Literal(lit) => lit.ty(),
        Expr::Call { returns, .. } | Expr::Method { returns, .. } => returns.clone(),
        Expr::New(ty) => Some(ty.clone()),
        Expr::Local(name) => {
            let (at, earlier) = method
                .locals
                .iter()
                .take(position)
                .enumerate()
                .rev()
                .find(|(_, l)| l.name == *name)?;

            earlier
                .ty
                .clone()
                .or_else(|| earlier.init.as_ref().and_then(|e| infer(method, at, e)))
        }
    }
}

fn compatible(method: &MethodSpec, ty: &TypeRef, expr: &Expr) -> bool {
    if expr.is_null() {
        return !ty.is_primitive();
    }

    infer(method, method.locals.len(), expr).is_some_and(|found| ty.accepts(&found))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_schema::node::LocalSpec;

    #[test]
    fn infer_follows_earlier_locals() {
        let method = MethodSpec::new("run", "run")
            .local(LocalSpec::new("list").init(Expr::New(TypeRef::new("ArrayList"))))
            .local(LocalSpec::new("alias").init(Expr::local("list")))
            .local(LocalSpec::new("n").init(Expr::int(3_000_000_000)));

        assert_eq!(
            infer(&method, 1, &Expr::local("list")),
            Some(TypeRef::new("ArrayList"))
        );
        // a local cannot see itself or later bindings
        assert_eq!(infer(&method, 0, &Expr::local("list")), None);
        assert_eq!(infer(&method, 3, &Expr::int(3_000_000_000)), Some(TypeRef::long()));
    }

    #[test]
    fn reassignment_accepts_widening_and_null_for_references() {
        let method = MethodSpec::new("run", "run");

        assert!(compatible(&method, &TypeRef::long(), &Expr::int(1)));
        assert!(!compatible(&method, &TypeRef::int(), &Expr::text("x")));
        assert!(compatible(&method, &TypeRef::string(), &Expr::null()));
        assert!(!compatible(&method, &TypeRef::int(), &Expr::null()));
        assert!(!compatible(&method, &TypeRef::int(), &Expr::call("opaque")));
    }
}
