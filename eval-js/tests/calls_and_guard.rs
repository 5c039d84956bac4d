//! Call lowering: receiver binding, argument passing, forgiving absent-callee behavior, and the
//! function-constructor guard.

use eval_js::{compile, EvalError, Expr, NativeFunction, Value};
use serde_json::json;

fn ast(json: serde_json::Value) -> Expr {
  serde_json::from_value(json).expect("well-formed AST")
}

fn id(name: &str) -> serde_json::Value {
  json!({"type": "Identifier", "name": name})
}

fn return_this() -> NativeFunction {
  NativeFunction::new("returnThis", |this, _args| Ok(this.clone()))
}

fn return_args() -> NativeFunction {
  NativeFunction::new("returnArgs", |_this, args| Ok(Value::array(args.to_vec())))
}

#[test]
fn method_call_binds_the_object_as_receiver() {
  // o.m() must call with `this = o`, not the guarded access result.
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": {
      "type": "MemberExpression",
      "object": id("o"),
      "property": id("m"),
    },
    "arguments": [],
  })));

  let o = Value::object([
    ("m".to_string(), Value::Function(return_this())),
    ("tag".to_string(), Value::string("receiver")),
  ]);
  let context = Value::object([("o".to_string(), o.clone())]);

  assert_eq!(unit.call(&context).unwrap(), o);
}

#[test]
fn bare_call_binds_the_context_as_receiver() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("f"),
    "arguments": [],
  })));

  let context = Value::object([
    ("f".to_string(), Value::Function(return_this())),
    ("tag".to_string(), Value::string("global")),
  ]);

  assert_eq!(unit.call(&context).unwrap(), context);
}

#[test]
fn arguments_evaluate_in_order() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("f"),
    "arguments": [
      id("x"),
      {"type": "Literal", "value": 2},
      {
        "type": "BinaryExpression",
        "operator": "+",
        "left": id("x"),
        "right": {"type": "Literal", "value": 10},
      },
    ],
  })));

  let context = Value::object([
    ("f".to_string(), Value::Function(return_args())),
    ("x".to_string(), Value::Number(1.0)),
  ]);

  assert_eq!(
    unit.call(&context).unwrap(),
    Value::array([Value::Number(1.0), Value::Number(2.0), Value::Number(11.0)])
  );
}

#[test]
fn calling_an_absent_function_is_undefined() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("missing"),
    "arguments": [],
  })));

  assert_eq!(
    unit.call(&Value::from_json(&json!({}))).unwrap(),
    Value::Undefined
  );
  assert_eq!(unit.call(&Value::Null).unwrap(), Value::Undefined);

  // Same through a member chain: o.f() with o absent.
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": {
      "type": "MemberExpression",
      "object": id("o"),
      "property": id("f"),
    },
    "arguments": [],
  })));
  assert_eq!(
    unit.call(&Value::from_json(&json!({}))).unwrap(),
    Value::Undefined
  );
}

#[test]
fn calling_a_truthy_non_function_faults() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("n"),
    "arguments": [],
  })));

  let context = Value::from_json(&json!({"n": 5}));
  assert_eq!(unit.call(&context), Err(EvalError::NotCallable));
}

#[test]
fn function_call_results_flow_into_enclosing_expressions() {
  // f(g.h): a call argument that is itself a guarded member chain.
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("f"),
    "arguments": [{
      "type": "MemberExpression",
      "object": id("g"),
      "property": id("h"),
    }],
  })));

  let context = Value::object([
    ("f".to_string(), Value::Function(return_args())),
    (
      "g".to_string(),
      Value::object([("h".to_string(), Value::Number(3.0))]),
    ),
  ]);
  assert_eq!(unit.call(&context).unwrap(), Value::array([Value::Number(3.0)]));
}

#[test]
fn function_constructor_is_rejected_as_identifier_callee() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("F"),
    "arguments": [],
  })));

  let context = Value::object([(
    "F".to_string(),
    Value::Function(NativeFunction::function_constructor()),
  )]);
  assert_eq!(unit.call(&context), Err(EvalError::ForbiddenCallTarget));
}

#[test]
fn function_constructor_is_rejected_through_member_chains() {
  let context = Value::object([(
    "o".to_string(),
    Value::object([(
      "F".to_string(),
      Value::Function(NativeFunction::function_constructor()),
    )]),
  )]);

  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": {
      "type": "MemberExpression",
      "object": id("o"),
      "property": id("F"),
    },
    "arguments": [],
  })));
  assert_eq!(unit.call(&context), Err(EvalError::ForbiddenCallTarget));

  // Computed access reaches the same value and the same stop.
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": {
      "type": "MemberExpression",
      "object": id("o"),
      "property": {"type": "Literal", "value": "F"},
      "computed": true,
    },
    "arguments": [],
  })));
  assert_eq!(unit.call(&context), Err(EvalError::ForbiddenCallTarget));
}

#[test]
fn function_constructor_value_itself_is_inert_data() {
  // Reading it is fine; only invoking it is rejected.
  let unit = compile(&ast(id("F")));
  let ctor = NativeFunction::function_constructor();
  let context = Value::object([("F".to_string(), Value::Function(ctor.clone()))]);
  assert_eq!(unit.call(&context).unwrap(), Value::Function(ctor));
}

#[test]
fn host_errors_propagate_out_of_evaluation() {
  let unit = compile(&ast(json!({
    "type": "CallExpression",
    "callee": id("f"),
    "arguments": [],
  })));

  let context = Value::object([(
    "f".to_string(),
    Value::Function(NativeFunction::new("f", |_, _| {
      Err(EvalError::TypeError("host rejected"))
    })),
  )]);
  assert_eq!(unit.call(&context), Err(EvalError::TypeError("host rejected")));
}
