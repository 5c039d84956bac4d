use crate::function::NativeFunction;
use ahash::AHashMap;
use std::rc::Rc;

/// An expression-language value.
///
/// This is the canonical value representation shared by contexts, compiled constants, and
/// evaluation results. Heap-backed values are cheap-to-clone [`Rc`] handles; compiled units are
/// single-threaded and never mutate values they did not construct, so reference counting is
/// sufficient.
///
/// Equality is structural for data values and identity-based for functions.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  /// The `undefined` value. Absent identifiers, properties, and callees resolve to this.
  Undefined,
  /// The `null` value.
  Null,
  /// A boolean.
  Bool(bool),
  /// A number (IEEE-754 double).
  Number(f64),
  /// A string.
  String(Rc<str>),
  /// An array.
  Array(Rc<Vec<Value>>),
  /// An object: a string-keyed property map.
  Object(Rc<AHashMap<String, Value>>),
  /// A host-supplied callable.
  Function(NativeFunction),
}

impl Value {
  /// Builds a string value.
  pub fn string(value: impl AsRef<str>) -> Self {
    Value::String(Rc::from(value.as_ref()))
  }

  /// Builds an array value from evaluated elements.
  pub fn array(elements: impl IntoIterator<Item = Value>) -> Self {
    Value::Array(Rc::new(elements.into_iter().collect()))
  }

  /// Builds an object value from key/value pairs.
  pub fn object(properties: impl IntoIterator<Item = (String, Value)>) -> Self {
    Value::Object(Rc::new(properties.into_iter().collect()))
  }

  /// Converts a JSON value into a context value.
  ///
  /// JSON has no `undefined` and no functions, so the conversion is total: `null` maps to
  /// [`Value::Null`], objects to [`Value::Object`], arrays to [`Value::Array`]. Callers wanting
  /// callable context entries insert [`NativeFunction`] values after conversion.
  pub fn from_json(json: &serde_json::Value) -> Self {
    match json {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(*b),
      // `as_f64` is only `None` for non-finite `serde_json` numbers, which the JSON grammar
      // cannot produce.
      serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
      serde_json::Value::String(s) => Value::string(s),
      serde_json::Value::Array(elements) => Value::array(elements.iter().map(Value::from_json)),
      serde_json::Value::Object(properties) => Value::Object(Rc::new(
        properties
          .iter()
          .map(|(k, v)| (k.clone(), Value::from_json(v)))
          .collect(),
      )),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Self::string(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Self::String(Rc::from(value))
  }
}

impl From<Vec<Value>> for Value {
  fn from(value: Vec<Value>) -> Self {
    Self::Array(Rc::new(value))
  }
}

impl From<AHashMap<String, Value>> for Value {
  fn from(value: AHashMap<String, Value>) -> Self {
    Self::Object(Rc::new(value))
  }
}

impl From<NativeFunction> for Value {
  fn from(value: NativeFunction) -> Self {
    Self::Function(value)
  }
}
