//! Abstract operations backing expression evaluation.
//!
//! These follow the source language's coercion rules (ToBoolean, ToNumber, ToString, abstract and
//! strict equality, ToInt32/ToUint32) for the value shapes this crate models. Objects convert to
//! primitives the way plain data objects do: arrays join their elements, everything else becomes
//! `"[object Object]"`.

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::EvalError;
use crate::value::Value;
use itertools::Itertools;
use std::cmp::Ordering;
use std::rc::Rc;

/// ToBoolean: the truthiness test used by every guard the compiler emits.
pub fn to_boolean(value: &Value) -> bool {
  match value {
    Value::Undefined | Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => *n != 0.0 && !n.is_nan(),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
  }
}

/// ToNumber for the supported value types.
pub fn to_number(value: &Value) -> f64 {
  match value {
    Value::Undefined => f64::NAN,
    Value::Null => 0.0,
    Value::Bool(b) => {
      if *b {
        1.0
      } else {
        0.0
      }
    }
    Value::Number(n) => *n,
    Value::String(s) => string_to_number(s),
    // ToPrimitive, then ToNumber. Arrays therefore parse their joined form: `[]` is 0, `[7]` is
    // 7, `[1,2]` is NaN.
    Value::Array(_) | Value::Object(_) | Value::Function(_) => string_to_number(&to_string(value)),
  }
}

/// ToPrimitive with the default (string-preferring) hint for this value model.
///
/// Primitives pass through unchanged; arrays, objects, and functions convert to their string
/// form.
pub fn to_primitive(value: &Value) -> Value {
  match value {
    Value::Array(_) | Value::Object(_) | Value::Function(_) => {
      Value::String(Rc::from(to_string(value)))
    }
    other => other.clone(),
  }
}

/// ToString for numbers.
///
/// Integer-valued finite numbers print without a decimal point; `-0` prints as `"0"`. Other
/// finite numbers use the shortest round-trip form, which matches the source language in the
/// common range but not its exponent-notation thresholds.
pub fn number_to_string(n: f64) -> String {
  if n.is_nan() {
    return "NaN".to_string();
  }
  if n == f64::INFINITY {
    return "Infinity".to_string();
  }
  if n == f64::NEG_INFINITY {
    return "-Infinity".to_string();
  }
  if n == 0.0 {
    return "0".to_string();
  }
  if n.fract() == 0.0 && n.abs() < 1e21 {
    format!("{:.0}", n)
  } else {
    format!("{}", n)
  }
}

/// ToString for the supported value types.
pub fn to_string(value: &Value) -> String {
  match value {
    Value::Undefined => "undefined".to_string(),
    Value::Null => "null".to_string(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => number_to_string(*n),
    Value::String(s) => s.to_string(),
    // Array.prototype.toString: elements joined by commas, holes/undefined/null as empty.
    Value::Array(elements) => elements
      .iter()
      .map(|el| match el {
        Value::Undefined | Value::Null => String::new(),
        other => to_string(other),
      })
      .join(","),
    Value::Object(_) => "[object Object]".to_string(),
    Value::Function(f) => format!("function {}() {{ [native code] }}", f.name()),
  }
}

/// ToPropertyKey: property keys are strings; numbers use their canonical string form.
pub fn to_property_key(value: &Value) -> String {
  to_string(value)
}

/// Strict Equality Comparison (`===`).
///
/// Arrays, objects, and functions compare by identity, not structure.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Undefined, Value::Undefined) => true,
    (Value::Null, Value::Null) => true,
    (Value::Bool(x), Value::Bool(y)) => x == y,
    (Value::Number(x), Value::Number(y)) => x == y,
    (Value::String(x), Value::String(y)) => x == y,
    (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
    (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
    (Value::Function(x), Value::Function(y)) => x == y,
    _ => false,
  }
}

/// Abstract Equality Comparison (`==`) for the supported value types.
pub fn abstract_equals(a: &Value, b: &Value) -> bool {
  use Value::*;

  let mut a = a.clone();
  let mut b = b.clone();

  loop {
    match (&a, &b) {
      // Same-type comparisons use Strict Equality Comparison. Arrays, objects, and functions
      // are all object-typed, so any pairing of them compares by identity with no coercion.
      (Undefined, Undefined) | (Null, Null) => return true,
      (Bool(x), Bool(y)) => return x == y,
      (Number(x), Number(y)) => return x == y,
      (String(x), String(y)) => return x == y,
      (
        Array(_) | Object(_) | Function(_),
        Array(_) | Object(_) | Function(_),
      ) => return strict_equals(&a, &b),

      // `null == undefined`
      (Undefined, Null) | (Null, Undefined) => return true,

      // Number/string conversions.
      (Number(_), String(_)) => b = Number(to_number(&b)),
      (String(_), Number(_)) => a = Number(to_number(&a)),

      // Boolean conversions.
      (Bool(_), _) => a = Number(to_number(&a)),
      (_, Bool(_)) => b = Number(to_number(&b)),

      // Object-to-primitive conversions.
      (Array(_) | Object(_) | Function(_), String(_) | Number(_)) => a = to_primitive(&a),
      (String(_) | Number(_), Array(_) | Object(_) | Function(_)) => b = to_primitive(&b),

      _ => return false,
    }
  }
}

/// ToInt32: modular conversion into the signed 32-bit range.
pub fn to_int32(n: f64) -> i32 {
  if !n.is_finite() || n == 0.0 {
    return 0;
  }
  let modulus = n.trunc().rem_euclid(4294967296.0);
  if modulus >= 2147483648.0 {
    (modulus - 4294967296.0) as i32
  } else {
    modulus as i32
  }
}

/// ToUint32: modular conversion into the unsigned 32-bit range.
pub fn to_uint32(n: f64) -> u32 {
  if !n.is_finite() || n == 0.0 {
    return 0;
  }
  n.trunc().rem_euclid(4294967296.0) as u32
}

/// `typeof`.
pub fn type_of(value: &Value) -> &'static str {
  match value {
    Value::Undefined => "undefined",
    // `typeof null` is "object".
    Value::Null => "object",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) | Value::Object(_) => "object",
    Value::Function(_) => "function",
  }
}

/// Property lookup on an already-guarded base.
///
/// The compiler only dereferences truthy bases, so `base` is never null/undefined here. Objects
/// look up their map; arrays support `length` and index keys; strings support `length` and
/// index keys (yielding one-code-unit strings); functions expose `name`. Every other base yields
/// undefined.
pub fn get_property(base: &Value, key: &str) -> Value {
  match base {
    Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Undefined),
    Value::Array(elements) => match key {
      "length" => Value::Number(elements.len() as f64),
      _ => key
        .parse::<usize>()
        .ok()
        .and_then(|i| elements.get(i).cloned())
        .unwrap_or(Value::Undefined),
    },
    Value::String(s) => match key {
      // String length and indexing are defined over UTF-16 code units.
      "length" => Value::Number(s.encode_utf16().count() as f64),
      _ => key
        .parse::<usize>()
        .ok()
        .and_then(|i| s.encode_utf16().nth(i))
        .map(|unit| Value::String(Rc::from(String::from_utf16_lossy(&[unit]))))
        .unwrap_or(Value::Undefined),
    },
    Value::Function(f) => match key {
      "name" => Value::string(f.name()),
      _ => Value::Undefined,
    },
    _ => Value::Undefined,
  }
}

/// The `in` operator's membership test. Only objects and arrays are searchable.
pub fn has_property(base: &Value, key: &str) -> Result<bool, EvalError> {
  match base {
    Value::Object(map) => Ok(map.contains_key(key)),
    Value::Array(elements) => Ok(
      key == "length"
        || key
          .parse::<usize>()
          .map(|i| i < elements.len())
          .unwrap_or(false),
    ),
    _ => Err(EvalError::TypeError(
      "cannot use 'in' operator to search in a non-object",
    )),
  }
}

/// Applies a unary operator.
pub fn apply_unary(op: UnaryOp, operand: &Value) -> Value {
  match op {
    UnaryOp::UnaryNegation => Value::Number(-to_number(operand)),
    UnaryOp::UnaryPlus => Value::Number(to_number(operand)),
    UnaryOp::LogicalNot => Value::Bool(!to_boolean(operand)),
    UnaryOp::BitwiseNot => Value::Number(!to_int32(to_number(operand)) as f64),
    UnaryOp::Typeof => Value::string(type_of(operand)),
    UnaryOp::Void => Value::Undefined,
  }
}

/// Applies a binary operator.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
  Ok(match op {
    BinaryOp::Addition => add(left, right),
    BinaryOp::Subtraction => Value::Number(to_number(left) - to_number(right)),
    BinaryOp::Multiplication => Value::Number(to_number(left) * to_number(right)),
    BinaryOp::Division => Value::Number(to_number(left) / to_number(right)),
    BinaryOp::Remainder => Value::Number(to_number(left) % to_number(right)),
    BinaryOp::LessThan => Value::Bool(matches!(relational(left, right), Some(Ordering::Less))),
    BinaryOp::LessThanOrEqual => Value::Bool(matches!(
      relational(left, right),
      Some(Ordering::Less | Ordering::Equal)
    )),
    BinaryOp::GreaterThan => {
      Value::Bool(matches!(relational(left, right), Some(Ordering::Greater)))
    }
    BinaryOp::GreaterThanOrEqual => Value::Bool(matches!(
      relational(left, right),
      Some(Ordering::Greater | Ordering::Equal)
    )),
    BinaryOp::Equality => Value::Bool(abstract_equals(left, right)),
    BinaryOp::Inequality => Value::Bool(!abstract_equals(left, right)),
    BinaryOp::StrictEquality => Value::Bool(strict_equals(left, right)),
    BinaryOp::StrictInequality => Value::Bool(!strict_equals(left, right)),
    BinaryOp::BitwiseAnd => {
      Value::Number((to_int32(to_number(left)) & to_int32(to_number(right))) as f64)
    }
    BinaryOp::BitwiseOr => {
      Value::Number((to_int32(to_number(left)) | to_int32(to_number(right))) as f64)
    }
    BinaryOp::BitwiseXor => {
      Value::Number((to_int32(to_number(left)) ^ to_int32(to_number(right))) as f64)
    }
    BinaryOp::BitwiseLeftShift => Value::Number(
      (to_int32(to_number(left)) << (to_uint32(to_number(right)) & 31)) as f64,
    ),
    BinaryOp::BitwiseRightShift => Value::Number(
      (to_int32(to_number(left)) >> (to_uint32(to_number(right)) & 31)) as f64,
    ),
    BinaryOp::BitwiseUnsignedRightShift => Value::Number(
      (to_uint32(to_number(left)) >> (to_uint32(to_number(right)) & 31)) as f64,
    ),
    BinaryOp::In => Value::Bool(has_property(right, &to_property_key(left))?),
  })
}

/// `+`: string concatenation when either primitive form is a string, numeric addition otherwise.
fn add(left: &Value, right: &Value) -> Value {
  let a = to_primitive(left);
  let b = to_primitive(right);
  if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
    let mut s = to_string(&a);
    s.push_str(&to_string(&b));
    Value::String(Rc::from(s))
  } else {
    Value::Number(to_number(&a) + to_number(&b))
  }
}

/// Abstract Relational Comparison. `None` means "undefined" (a NaN operand), which makes every
/// relational operator false.
fn relational(left: &Value, right: &Value) -> Option<Ordering> {
  let a = to_primitive(left);
  let b = to_primitive(right);
  match (&a, &b) {
    // Two strings compare lexicographically by UTF-16 code unit.
    (Value::String(x), Value::String(y)) => Some(x.encode_utf16().cmp(y.encode_utf16())),
    _ => {
      let x = to_number(&a);
      let y = to_number(&b);
      x.partial_cmp(&y)
    }
  }
}

/// StringToNumber: the string numeric literal grammar.
fn string_to_number(raw: &str) -> f64 {
  let trimmed = raw.trim_matches(is_ecma_whitespace);

  if trimmed.is_empty() {
    return 0.0;
  }

  // Infinity is case-sensitive in string numeric literals.
  match trimmed {
    "Infinity" | "+Infinity" => return f64::INFINITY,
    "-Infinity" => return f64::NEG_INFINITY,
    _ => {}
  }

  // Guard against Rust accepting "inf"/"infinity" case-insensitively.
  let rest = trimmed
    .strip_prefix('+')
    .or_else(|| trimmed.strip_prefix('-'))
    .unwrap_or(trimmed);
  if rest.eq_ignore_ascii_case("inf") || rest.eq_ignore_ascii_case("infinity") {
    // Only the exact "Infinity" spelling is accepted above.
    return f64::NAN;
  }

  if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
    return parse_ascii_int_radix(hex, 16).unwrap_or(f64::NAN);
  }
  if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
    return parse_ascii_int_radix(bin, 2).unwrap_or(f64::NAN);
  }
  if let Some(oct) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
    return parse_ascii_int_radix(oct, 8).unwrap_or(f64::NAN);
  }

  trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_ascii_int_radix(s: &str, radix: u32) -> Option<f64> {
  if s.is_empty() {
    return None;
  }
  let radix_f = radix as f64;
  let mut value = 0.0f64;
  for b in s.bytes() {
    let digit = match b {
      b'0'..=b'9' => (b - b'0') as u32,
      b'a'..=b'f' => (b - b'a' + 10) as u32,
      b'A'..=b'F' => (b - b'A' + 10) as u32,
      _ => return None,
    };
    if digit >= radix {
      return None;
    }
    value = value * radix_f + digit as f64;
  }
  Some(value)
}

fn is_ecma_whitespace(c: char) -> bool {
  // WhiteSpace + LineTerminator (used by TrimString / StringToNumber).
  matches!(
    c,
    '\u{0009}' // Tab
    | '\u{000A}' // LF
    | '\u{000B}' // VT
    | '\u{000C}' // FF
    | '\u{000D}' // CR
    | '\u{0020}' // Space
    | '\u{00A0}' // No-break space
    | '\u{1680}' // Ogham space mark
    | '\u{2000}'..='\u{200A}' // En quad..hair space
    | '\u{2028}' // Line separator
    | '\u{2029}' // Paragraph separator
    | '\u{202F}' // Narrow no-break space
    | '\u{205F}' // Medium mathematical space
    | '\u{3000}' // Ideographic space
    | '\u{FEFF}' // BOM
  )
}
