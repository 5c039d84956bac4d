//! Compile expression syntax trees into reusable evaluators.
//!
//! `eval-js` lowers a parsed expression AST (the subset embedded in templates and
//! configuration: member chains, calls, literals, logical/conditional operators) into a
//! [`CompiledExpr`], a callable unit evaluated against a context value. The AST is compiled
//! once; the unit is then reusable indefinitely with different contexts, without re-walking the
//! tree.
//!
//! Evaluation is "forgiving": reading an identifier from a null context, dereferencing through
//! a null/undefined link in a member chain, or calling an absent function property all resolve
//! to undefined instead of faulting. The one hard stop is security-motivated: a compiled unit
//! refuses to invoke the function-construction primitive
//! ([`NativeFunction::function_constructor`]), since reaching it would let untrusted expression
//! text fabricate and run arbitrary code.
//!
//! The parser is a collaborator, not part of this crate: build [`Expr`] values directly, or
//! deserialize them from ESTree-style JSON.
//!
//! # Example
//! ```
//! use eval_js::{compile, Expr, Value};
//!
//! // `a && b.c`, as an ESTree-style tree.
//! let ast: Expr = serde_json::from_value(serde_json::json!({
//!   "type": "LogicalExpression",
//!   "operator": "&&",
//!   "left": {"type": "Identifier", "name": "a"},
//!   "right": {
//!     "type": "MemberExpression",
//!     "object": {"type": "Identifier", "name": "b"},
//!     "property": {"type": "Identifier", "name": "c"},
//!   },
//! }))
//! .unwrap();
//!
//! let unit = compile(&ast);
//!
//! let context = Value::from_json(&serde_json::json!({"a": true, "b": {"c": 42}}));
//! assert_eq!(unit.call(&context).unwrap(), Value::Number(42.0));
//!
//! // The same unit, a different context.
//! let context = Value::from_json(&serde_json::json!({"a": true, "b": null}));
//! assert_eq!(unit.call(&context).unwrap(), Value::Undefined);
//! ```

pub mod ast;
mod code;
mod compile;
mod error;
mod exec;
mod function;
pub mod ops;
mod value;

pub use ast::Expr;
pub use code::CompiledExpr;
pub use compile::compile;
pub use error::EvalError;
pub use function::NativeFunction;
pub use value::Value;
