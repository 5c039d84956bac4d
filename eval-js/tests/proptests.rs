use eval_js::ast::{
  ArrayExpr, BinaryExpr, BinaryOp, CallExpr, CondExpr, Expr, IdExpr, LitExpr, Literal,
  LogicalExpr, LogicalOp, MemberExpr, UnaryExpr, UnaryOp,
};
use eval_js::{compile, Value};
use proptest::prelude::*;
use serde_json::json;

fn arb_literal() -> impl Strategy<Value = Literal> {
  prop_oneof![
    Just(Literal::Null),
    any::<bool>().prop_map(Literal::Bool),
    (-1e6f64..1e6f64).prop_map(Literal::Number),
    "[a-z ]{0,8}".prop_map(Literal::String),
  ]
}

fn arb_name() -> impl Strategy<Value = String> {
  prop::sample::select(vec!["a", "b", "c", "x", "y"]).prop_map(|name| name.to_string())
}

fn arb_expr() -> impl Strategy<Value = Expr> {
  let leaf = prop_oneof![
    arb_literal().prop_map(|value| Expr::Lit(LitExpr { value })),
    arb_name().prop_map(|name| Expr::Id(IdExpr { name })),
  ];
  leaf.prop_recursive(4, 24, 3, |inner| {
    prop_oneof![
      (inner.clone(), arb_name()).prop_map(|(object, name)| {
        Expr::Member(MemberExpr {
          object: Box::new(object),
          property: Box::new(Expr::Id(IdExpr { name })),
          computed: false,
        })
      }),
      (inner.clone(), inner.clone(), any::<bool>()).prop_map(|(left, right, and)| {
        Expr::Logical(LogicalExpr {
          operator: if and {
            LogicalOp::LogicalAnd
          } else {
            LogicalOp::LogicalOr
          },
          left: Box::new(left),
          right: Box::new(right),
        })
      }),
      (inner.clone(), inner.clone(), any::<bool>()).prop_map(|(left, right, add)| {
        Expr::Binary(BinaryExpr {
          operator: if add {
            BinaryOp::Addition
          } else {
            BinaryOp::StrictEquality
          },
          left: Box::new(left),
          right: Box::new(right),
        })
      }),
      (inner.clone(), inner.clone(), inner.clone()).prop_map(|(test, consequent, alternate)| {
        Expr::Cond(CondExpr {
          test: Box::new(test),
          consequent: Box::new(consequent),
          alternate: Box::new(alternate),
        })
      }),
      inner.clone().prop_map(|argument| {
        Expr::Unary(UnaryExpr {
          operator: UnaryOp::LogicalNot,
          argument: Box::new(argument),
        })
      }),
      prop::collection::vec(prop::option::of(inner.clone()), 0..3)
        .prop_map(|elements| Expr::Array(ArrayExpr { elements })),
      (inner.clone(), prop::collection::vec(inner, 0..2)).prop_map(|(callee, arguments)| {
        Expr::Call(CallExpr {
          callee: Box::new(callee),
          arguments,
        })
      }),
    ]
  })
}

fn sample_context() -> Value {
  Value::from_json(&json!({
    "a": 1,
    "b": {"c": 2, "a": false},
    "c": null,
    "x": "s",
    "y": [1, 2, 3],
  }))
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn compilation_and_evaluation_never_panic(expr in arb_expr()) {
    let unit = compile(&expr);
    let _ = unit.to_string();
    let _ = unit.call(&sample_context());
    let _ = unit.call(&Value::Null);
  }

  #[test]
  fn independent_compilations_agree(expr in arb_expr()) {
    let first = compile(&expr);
    let second = compile(&expr);

    // Identical programs...
    prop_assert_eq!(first.to_string(), second.to_string());

    // ...and identical results, with no state leaking between units or across calls.
    // Results are compared through Debug so a NaN result still counts as agreement.
    let context = sample_context();
    let expected = format!("{:?}", first.call(&context));
    let repeat = format!("{:?}", second.call(&context));
    prop_assert_eq!(&repeat, &expected);
    prop_assert_eq!(
      format!("{:?}", first.call(&Value::Null)),
      format!("{:?}", second.call(&Value::Null))
    );
    // A second call on the same unit sees no leftover slot state.
    prop_assert_eq!(format!("{:?}", first.call(&context)), expected);
  }

  #[test]
  fn literal_numbers_are_transparent(n in any::<f64>()) {
    prop_assume!(!n.is_nan());
    let unit = compile(&Expr::Lit(LitExpr { value: Literal::Number(n) }));
    prop_assert_eq!(unit.call(&Value::Null).unwrap(), Value::Number(n));
    prop_assert_eq!(unit.call(&sample_context()).unwrap(), Value::Number(n));
  }

  #[test]
  fn literal_strings_are_transparent(s in any::<String>()) {
    let unit = compile(&Expr::Lit(LitExpr { value: Literal::String(s.clone()) }));
    prop_assert_eq!(unit.call(&Value::Null).unwrap(), Value::string(&s));
  }
}
