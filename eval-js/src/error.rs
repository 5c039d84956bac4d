/// Errors produced while evaluating a compiled expression.
///
/// Absent data is deliberately *not* an error: reading an identifier from a null context, a
/// missing property anywhere in a member chain, or calling through a null/undefined callee all
/// resolve to `undefined` via the guarded statements the compiler emits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
  /// A call attempted to invoke the function-construction primitive.
  ///
  /// Allowing an expression to reach it would let untrusted expression text fabricate and run
  /// arbitrary code, so the compiled unit checks every callee before invoking it. This is a
  /// deliberate security stop and is never swallowed.
  #[error("the function constructor is not a permitted call target")]
  ForbiddenCallTarget,

  /// Attempted to call a truthy, non-callable value.
  #[error("value is not callable")]
  NotCallable,

  #[error("type error: {0}")]
  TypeError(&'static str),
}
