//! The compiled form of an expression: temp slots, emitted steps, and the final value operand.
//!
//! The lowering engine builds this directly in memory instead of generating source text for a
//! host evaluator (the target language has no safe runtime-compiled callables), but the shape is
//! the same flat, sequential, side-effect-ordered program: a batched slot declaration, guarded
//! load/call statements, conditional blocks for short-circuiting, and a trailing return. The
//! [`std::fmt::Display`] impl renders exactly that pseudo-source, with the context parameter
//! named `ctx`.

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::EvalError;
use crate::exec;
use crate::ops;
use crate::value::Value;
use itertools::Itertools;
use std::fmt;
use std::fmt::Display;
use std::fmt::Write;

/// A compiler-generated temp slot name. Renders as `v0`, `v1`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotId(pub(crate) u32);

impl SlotId {
  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for SlotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v{}", self.0)
  }
}

/// A property key in a member access or object literal: a static name, or a lowered key
/// expression evaluated at run time.
#[derive(Clone, Debug)]
pub enum Key {
  Named(String),
  Computed(Operand),
}

/// An inline, context-independent expression fragment.
///
/// Operands never read the context and never carry side effects; everything effectful (variable
/// loads, member dereferences, calls) is a [`Step`] writing into a slot first.
#[derive(Clone, Debug)]
pub enum Operand {
  Const(Value),
  Slot(SlotId),
  Unary {
    op: UnaryOp,
    operand: Box<Operand>,
  },
  Binary {
    op: BinaryOp,
    left: Box<Operand>,
    right: Box<Operand>,
  },
  /// An array literal; `None` elements are holes.
  Array(Vec<Option<Operand>>),
  Object(Vec<(Key, Operand)>),
}

/// The guard condition of an [`Step::If`] block.
#[derive(Clone, Copy, Debug)]
pub enum Cond {
  Truthy,
  Falsy,
  Nullish,
}

/// One emitted statement. Concatenation order is execution order.
#[derive(Clone, Debug)]
pub enum Step {
  /// If the context is non-null, `slot = context[name]`.
  LoadVar { slot: SlotId, name: String },
  /// If `object` is truthy, `slot = object[key]`.
  LoadMember {
    slot: SlotId,
    object: Operand,
    key: Key,
  },
  Assign { slot: SlotId, value: Operand },
  /// Runs `body` only when `test` satisfies `cond`.
  If {
    test: SlotId,
    cond: Cond,
    body: Vec<Step>,
  },
  /// guard(callee); if callee is truthy, `slot = callee.call(receiver, args...)`.
  ///
  /// A `None` receiver means the context itself.
  Call {
    slot: SlotId,
    callee: Operand,
    receiver: Option<Operand>,
    args: Vec<Operand>,
  },
  /// A bare expression statement: evaluate, discard.
  Eval { value: Operand },
}

/// A compiled expression: the reusable executable unit.
///
/// Constructed once by [`crate::compile`], then callable indefinitely with different contexts.
/// It closes over nothing except its own program; the compiler state that produced it is gone.
pub struct CompiledExpr {
  pub(crate) slots: Vec<SlotId>,
  pub(crate) steps: Vec<Step>,
  pub(crate) ret: Operand,
}

impl CompiledExpr {
  /// Evaluates the expression against `context`.
  ///
  /// A null/undefined context is legal: every guarded identifier/member read short-circuits to
  /// undefined instead of faulting.
  pub fn call(&self, context: &Value) -> Result<Value, EvalError> {
    exec::run(self, context)
  }
}

impl fmt::Display for CompiledExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !self.slots.is_empty() {
      writeln!(f, "var {};", self.slots.iter().map(|s| s.to_string()).join(","))?;
    }
    for step in &self.steps {
      step.fmt(f)?;
      writeln!(f)?;
    }
    write!(f, "return {};", self.ret)
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::LoadVar { slot, name } => {
        write!(f, "if(ctx){{{slot}=ctx")?;
        write_key_access(f, name)?;
        write!(f, ";}}")
      }
      Step::LoadMember { slot, object, key } => {
        write!(f, "if({object}){{{slot}={object}")?;
        key.fmt(f)?;
        write!(f, ";}}")
      }
      Step::Assign { slot, value } => write!(f, "{slot}={value};"),
      Step::If { test, cond, body } => {
        match cond {
          Cond::Truthy => write!(f, "if({test})")?,
          Cond::Falsy => write!(f, "if(!{test})")?,
          Cond::Nullish => write!(f, "if({test}==null)")?,
        }
        f.write_char('{')?;
        for step in body {
          step.fmt(f)?;
        }
        f.write_char('}')
      }
      Step::Call {
        slot,
        callee,
        receiver,
        args,
      } => {
        write!(f, "guard({callee});if({callee}){{{slot}={callee}.call(")?;
        match receiver {
          Some(receiver) => receiver.fmt(f)?,
          None => f.write_str("ctx")?,
        }
        for arg in args {
          write!(f, ",{arg}")?;
        }
        write!(f, ");}}")
      }
      Step::Eval { value } => write!(f, "{value};"),
    }
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Const(value) => write_const(f, value),
      Operand::Slot(slot) => slot.fmt(f),
      Operand::Unary { op, operand } => write!(f, "{}({})", op.token(), operand),
      Operand::Binary { op, left, right } => {
        // Both sides parenthesized so the rendering preserves precedence regardless of the
        // sub-expression's textual shape. Word operators need surrounding spaces.
        if op.token().chars().all(|c| c.is_ascii_alphabetic()) {
          write!(f, "({}) {} ({})", left, op.token(), right)
        } else {
          write!(f, "({}){}({})", left, op.token(), right)
        }
      }
      Operand::Array(elements) => {
        f.write_char('[')?;
        let mut first = true;
        for element in elements {
          if !first {
            f.write_char(',')?;
          }
          first = false;
          if let Some(element) = element {
            element.fmt(f)?;
          }
        }
        f.write_char(']')
      }
      Operand::Object(properties) => {
        f.write_char('{')?;
        let mut first = true;
        for (key, value) in properties {
          if !first {
            f.write_char(',')?;
          }
          first = false;
          match key {
            Key::Named(name) if is_identifier(name) => f.write_str(name)?,
            Key::Named(name) => write_string_literal(f, name)?,
            Key::Computed(operand) => write!(f, "[{operand}]")?,
          }
          f.write_char(':')?;
          value.fmt(f)?;
        }
        f.write_char('}')
      }
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Named(name) => write_key_access(f, name),
      Key::Computed(operand) => write!(f, "[{operand}]"),
    }
  }
}

fn write_key_access(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
  if is_identifier(name) {
    write!(f, ".{name}")
  } else {
    f.write_char('[')?;
    write_string_literal(f, name)?;
    f.write_char(']')
  }
}

fn write_const(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
  match value {
    Value::Undefined => f.write_str("undefined"),
    Value::Null => f.write_str("null"),
    Value::Bool(b) => write!(f, "{b}"),
    Value::Number(n) => f.write_str(&ops::number_to_string(*n)),
    Value::String(s) => write_string_literal(f, s),
    // Only literals reach Const; composite values cannot.
    _ => f.write_str("<value>"),
  }
}

fn is_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Writes a double-quoted string literal, escaping characters that would otherwise terminate or
/// change the meaning of the literal. Non-ASCII characters pass through except the Unicode line
/// separators U+2028/U+2029, which must always be escaped.
fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
  f.write_char('"')?;
  for ch in value.chars() {
    match ch {
      '\\' => f.write_str("\\\\")?,
      '"' => f.write_str("\\\"")?,
      '\n' => f.write_str("\\n")?,
      '\r' => f.write_str("\\r")?,
      '\t' => f.write_str("\\t")?,
      '\u{2028}' => f.write_str("\\u2028")?,
      '\u{2029}' => f.write_str("\\u2029")?,
      ch if ch < '\u{20}' => write!(f, "\\x{:02X}", ch as u32)?,
      ch => f.write_char(ch)?,
    }
  }
  f.write_char('"')
}
