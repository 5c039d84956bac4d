use crate::error::EvalError;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// A host-implemented callable entrypoint.
///
/// The caller supplies the receiver (`this`) and the evaluated argument list; the callable
/// returns a value or an evaluation error.
pub type HostFn = dyn Fn(&Value, &[Value]) -> Result<Value, EvalError>;

/// A named, host-supplied function value.
///
/// Function values compare by identity, matching the source language: two separately constructed
/// functions are never equal, and a clone is equal to its original.
#[derive(Clone)]
pub struct NativeFunction(Rc<Inner>);

struct Inner {
  name: Rc<str>,
  callee: Callee,
}

enum Callee {
  Host(Box<HostFn>),
  /// The runtime's generic function-construction primitive: the mechanism that would fabricate
  /// new callables from source text. It exists as a value so hosts can expose a complete global
  /// environment, but invoking it is always rejected.
  FunctionConstructor,
}

impl NativeFunction {
  /// Wraps a host closure as a function value.
  pub fn new(
    name: impl AsRef<str>,
    f: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + 'static,
  ) -> Self {
    Self(Rc::new(Inner {
      name: Rc::from(name.as_ref()),
      callee: Callee::Host(Box::new(f)),
    }))
  }

  /// Returns the function-construction primitive.
  ///
  /// This is the one call target compiled expressions refuse to invoke (see
  /// [`ensure_safe_function`]). Hosts may install it into contexts that mirror a full global
  /// environment; any attempt to call it raises [`EvalError::ForbiddenCallTarget`].
  pub fn function_constructor() -> Self {
    Self(Rc::new(Inner {
      name: Rc::from("Function"),
      callee: Callee::FunctionConstructor,
    }))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  /// Whether this value is the function-construction primitive.
  pub fn is_function_constructor(&self) -> bool {
    matches!(self.0.callee, Callee::FunctionConstructor)
  }

  /// Invokes the function with an explicit receiver.
  pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, EvalError> {
    match &self.0.callee {
      Callee::Host(f) => f(this, args),
      Callee::FunctionConstructor => Err(EvalError::ForbiddenCallTarget),
    }
  }
}

impl PartialEq for NativeFunction {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for NativeFunction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NativeFunction")
      .field("name", &self.0.name)
      .finish_non_exhaustive()
  }
}

/// The call-target guard every compiled unit runs before invoking a callee.
///
/// Rejects only the function-construction primitive; all other callees pass unchecked. This is
/// intentionally a narrow denylist, not a general sandbox.
pub fn ensure_safe_function(value: &Value) -> Result<(), EvalError> {
  match value {
    Value::Function(f) if f.is_function_constructor() => Err(EvalError::ForbiddenCallTarget),
    _ => Ok(()),
  }
}
