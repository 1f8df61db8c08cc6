use proptest::prelude::*;
use std::sync::Arc;
use stencil::prelude::*;

fn money() -> ClassSpec {
    ClassSpec::new("Money")
        .directive(DirectiveInvocation::class("value"))
        .directive(DirectiveInvocation::class("with"))
        .field(FieldSpec::new("amount", TypeRef::long()))
        .field(FieldSpec::new("currency", TypeRef::string()))
}

fn interpreter() -> Interpreter<Bodies> {
    let out = stencil::process(&money());
    assert!(!out.has_errors(), "{:?}", out.diagnostics);

    Interpreter::new(&out, Bodies::new())
}

fn money_of(interp: &Interpreter<Bodies>, amount: i64, currency: &str) -> Arc<Instance> {
    interp
        .construct("Money", vec![Value::from(amount), Value::from(currency)])
        .unwrap()
}

fn hash_of(interp: &Interpreter<Bodies>, m: &Arc<Instance>) -> i64 {
    interp.call(m, "hashCode", Vec::new()).unwrap().as_int().unwrap()
}

#[test]
fn value_class_is_final_with_final_fields() {
    let out = stencil::process(&money());

    assert!(out.class.is_final);
    assert!(out.class.fields.iter().all(FieldSpec::is_final));
    assert!(out.method("setAmount").is_none());
    assert!(out.constructor_with_arity(2).is_some());
}

#[test]
fn with_leaves_the_receiver_unchanged() {
    let interp = interpreter();
    let ten = money_of(&interp, 10, "EUR");

    let twenty = interp.call(&ten, "withAmount", vec![Value::from(20_i64)]).unwrap();
    let twenty = twenty.as_object().unwrap();

    assert!(!Arc::ptr_eq(&ten, twenty));
    assert_eq!(ten.field("amount").unwrap().as_int(), Some(10));
    assert_eq!(twenty.field("amount").unwrap().as_int(), Some(20));
    assert_eq!(twenty.field("currency").unwrap().as_text(), Some("EUR"));
}

#[test]
fn with_same_value_returns_the_receiver() {
    let interp = interpreter();
    let ten = money_of(&interp, 10, "EUR");

    let same = interp.call(&ten, "withAmount", vec![Value::from(10_i64)]).unwrap();

    assert!(Arc::ptr_eq(&ten, same.as_object().unwrap()));
}

proptest! {
    #[test]
    fn equal_values_hash_alike(amount in any::<i64>(), currency in "[A-Z]{3}") {
        let interp = interpreter();
        let a = money_of(&interp, amount, &currency);
        let b = money_of(&interp, amount, &currency);

        prop_assert!(interp.equals(&a.clone().into(), &b.clone().into()).unwrap());
        prop_assert_eq!(hash_of(&interp, &a), hash_of(&interp, &b));
    }

    #[test]
    fn equality_is_consistent_with_hash(
        left in (any::<i8>(), "[AB]"),
        right in (any::<i8>(), "[AB]"),
    ) {
        let interp = interpreter();
        let a = money_of(&interp, left.0.into(), &left.1);
        let b = money_of(&interp, right.0.into(), &right.1);

        let equal = interp.equals(&a.clone().into(), &b.clone().into()).unwrap();
        prop_assert_eq!(equal, left == right);
        if equal {
            prop_assert_eq!(hash_of(&interp, &a), hash_of(&interp, &b));
        }
    }
}
