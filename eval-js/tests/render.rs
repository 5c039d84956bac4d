//! Pseudo-source renderings of compiled units: declarations first, then the emitted statements
//! in order, then the return. These pin the compiled shape (slot allocation order, guard
//! structure, branch blocks) without executing anything.

use eval_js::{compile, Expr};
use serde_json::json;

fn render(ast_json: serde_json::Value) -> String {
  let ast: Expr = serde_json::from_value(ast_json).expect("well-formed AST");
  compile(&ast).to_string()
}

fn id(name: &str) -> serde_json::Value {
  json!({"type": "Identifier", "name": name})
}

fn lit(value: serde_json::Value) -> serde_json::Value {
  json!({"type": "Literal", "value": value})
}

#[test]
fn literal_renders_as_bare_return() {
  assert_eq!(render(lit(json!(5))), "return 5;");
  assert_eq!(render(lit(json!(true))), "return true;");
  assert_eq!(render(lit(json!(null))), "return null;");
}

#[test]
fn string_literals_escape() {
  assert_eq!(render(lit(json!("a\"b"))), "return \"a\\\"b\";");
  assert_eq!(render(lit(json!("line\nbreak"))), "return \"line\\nbreak\";");
  assert_eq!(render(lit(json!("back\\slash"))), "return \"back\\\\slash\";");
}

#[test]
fn identifier_load_is_guarded_on_the_context() {
  assert_eq!(render(id("x")), "var v0;\nif(ctx){v0=ctx.x;}\nreturn v0;");
}

#[test]
fn member_chain_declares_and_guards_every_link() {
  let rendered = render(json!({
    "type": "MemberExpression",
    "object": id("a"),
    "property": id("b"),
  }));
  assert_eq!(
    rendered,
    "var v0,v1;\nif(ctx){v0=ctx.a;}\nif(v0){v1=v0.b;}\nreturn v1;"
  );
}

#[test]
fn non_identifier_keys_render_bracketed() {
  let rendered = render(json!({
    "type": "MemberExpression",
    "object": id("a"),
    "property": lit(json!("b c")),
    "computed": true,
  }));
  assert!(rendered.contains("v1=v0[\"b c\"];"));
}

#[test]
fn logical_and_renders_a_conditional_block() {
  let rendered = render(json!({
    "type": "LogicalExpression",
    "operator": "&&",
    "left": id("a"),
    "right": {
      "type": "MemberExpression",
      "object": id("b"),
      "property": id("c"),
    },
  }));
  assert_eq!(
    rendered,
    "var v0,v1,v2,v3;\n\
     if(ctx){v1=ctx.a;}\n\
     v0=v1;\n\
     if(v0){if(ctx){v2=ctx.b;}if(v2){v3=v2.c;}v0=v3;}\n\
     return v0;"
  );
}

#[test]
fn nullish_guard_renders_as_eq_null() {
  let rendered = render(json!({
    "type": "LogicalExpression",
    "operator": "??",
    "left": id("a"),
    "right": lit(json!(1)),
  }));
  assert!(rendered.contains("if(v0==null){v0=1;}"));
}

#[test]
fn conditional_renders_two_branch_blocks() {
  let rendered = render(json!({
    "type": "ConditionalExpression",
    "test": id("a"),
    "consequent": lit(json!(1)),
    "alternate": lit(json!(2)),
  }));
  assert_eq!(
    rendered,
    "var v0,v1,v2;\n\
     if(ctx){v2=ctx.a;}\n\
     v1=v2;\n\
     if(v1){v0=1;}\n\
     if(!v1){v0=2;}\n\
     return v0;"
  );
}

#[test]
fn call_renders_guard_then_guarded_invocation() {
  let rendered = render(json!({
    "type": "CallExpression",
    "callee": id("f"),
    "arguments": [lit(json!(1))],
  }));
  assert!(rendered.contains("guard(v0);if(v0){v1=v0.call(ctx,1);}"));

  let rendered = render(json!({
    "type": "CallExpression",
    "callee": {
      "type": "MemberExpression",
      "object": id("o"),
      "property": id("m"),
    },
    "arguments": [],
  }));
  // The receiver is the object slot, not the guarded access result.
  assert!(rendered.contains("guard(v1);if(v1){v2=v1.call(v0);}"));
}

#[test]
fn binary_operands_are_parenthesized() {
  let rendered = render(json!({
    "type": "BinaryExpression",
    "operator": "+",
    "left": lit(json!(1)),
    "right": lit(json!(2)),
  }));
  assert_eq!(rendered, "return (1)+(2);");

  let rendered = render(json!({
    "type": "BinaryExpression",
    "operator": "in",
    "left": lit(json!("k")),
    "right": id("o"),
  }));
  assert!(rendered.contains("(\"k\") in (v0)"));
}

#[test]
fn array_holes_render_as_empty_slots() {
  let rendered = render(json!({
    "type": "ArrayExpression",
    "elements": [lit(json!(1)), null, lit(json!(3))],
  }));
  assert_eq!(rendered, "return [1,,3];");
}

#[test]
fn object_keys_render_by_kind() {
  let rendered = render(json!({
    "type": "ObjectExpression",
    "properties": [
      {"key": id("a"), "value": lit(json!(1))},
      {"key": lit(json!("a b")), "value": lit(json!(2))},
      {"key": id("k"), "value": lit(json!(3)), "computed": true},
    ],
  }));
  // Identifier keys are bare; non-identifier and computed keys are lowered key expressions.
  assert_eq!(
    rendered,
    "var v0;\nif(ctx){v0=ctx.k;}\nreturn {a:1,[\"a b\"]:2,[v0]:3};"
  );
}

#[test]
fn program_renders_bare_statements_before_the_return() {
  let rendered = render(json!({
    "type": "Program",
    "body": [lit(json!(1)), lit(json!(2))],
  }));
  assert_eq!(rendered, "1;\nreturn 2;");
}
