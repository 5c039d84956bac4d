//! Execution of compiled step programs.
//!
//! A [`Frame`] is one evaluation: the slot file (all slots start undefined; guarded loads write
//! before anything reads) and the borrowed context. Steps run in emission order; operands are
//! pure and read only slots and constants.

use crate::code::{CompiledExpr, Cond, Key, Operand, Step};
use crate::error::EvalError;
use crate::function::ensure_safe_function;
use crate::ops;
use crate::value::Value;
use ahash::AHashMap;
use std::rc::Rc;

pub(crate) fn run(unit: &CompiledExpr, context: &Value) -> Result<Value, EvalError> {
  let mut frame = Frame {
    slots: vec![Value::Undefined; unit.slots.len()],
    context,
  };
  frame.run_steps(&unit.steps)?;
  frame.eval(&unit.ret)
}

struct Frame<'a> {
  slots: Vec<Value>,
  context: &'a Value,
}

impl Frame<'_> {
  fn run_steps(&mut self, steps: &[Step]) -> Result<(), EvalError> {
    for step in steps {
      self.run_step(step)?;
    }
    Ok(())
  }

  fn run_step(&mut self, step: &Step) -> Result<(), EvalError> {
    match step {
      Step::LoadVar { slot, name } => {
        if !matches!(self.context, Value::Undefined | Value::Null) {
          self.slots[slot.index()] = ops::get_property(self.context, name);
        }
      }
      Step::LoadMember { slot, object, key } => {
        let base = self.eval(object)?;
        if ops::to_boolean(&base) {
          let key = self.eval_key(key)?;
          self.slots[slot.index()] = ops::get_property(&base, &key);
        }
      }
      Step::Assign { slot, value } => {
        let value = self.eval(value)?;
        self.slots[slot.index()] = value;
      }
      Step::If { test, cond, body } => {
        let test = &self.slots[test.index()];
        let selected = match cond {
          Cond::Truthy => ops::to_boolean(test),
          Cond::Falsy => !ops::to_boolean(test),
          Cond::Nullish => matches!(test, Value::Undefined | Value::Null),
        };
        if selected {
          self.run_steps(body)?;
        }
      }
      Step::Call {
        slot,
        callee,
        receiver,
        args,
      } => {
        let callee = self.eval(callee)?;
        ensure_safe_function(&callee)?;
        if ops::to_boolean(&callee) {
          let Value::Function(function) = &callee else {
            return Err(EvalError::NotCallable);
          };
          let this = match receiver {
            Some(receiver) => self.eval(receiver)?,
            None => self.context.clone(),
          };
          let args = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>, _>>()?;
          self.slots[slot.index()] = function.call(&this, &args)?;
        }
      }
      Step::Eval { value } => {
        self.eval(value)?;
      }
    }
    Ok(())
  }

  fn eval(&self, operand: &Operand) -> Result<Value, EvalError> {
    match operand {
      Operand::Const(value) => Ok(value.clone()),
      Operand::Slot(slot) => Ok(self.slots[slot.index()].clone()),
      Operand::Unary { op, operand } => Ok(ops::apply_unary(*op, &self.eval(operand)?)),
      Operand::Binary { op, left, right } => {
        ops::apply_binary(*op, &self.eval(left)?, &self.eval(right)?)
      }
      Operand::Array(elements) => {
        let elements = elements
          .iter()
          .map(|element| match element {
            Some(element) => self.eval(element),
            // A hole materializes as undefined; the value model has no hole distinction.
            None => Ok(Value::Undefined),
          })
          .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(Rc::new(elements)))
      }
      Operand::Object(properties) => {
        let mut map = AHashMap::with_capacity(properties.len());
        for (key, value) in properties {
          let key = self.eval_key(key)?;
          map.insert(key, self.eval(value)?);
        }
        Ok(Value::Object(Rc::new(map)))
      }
    }
  }

  fn eval_key(&self, key: &Key) -> Result<String, EvalError> {
    match key {
      Key::Named(name) => Ok(name.clone()),
      Key::Computed(operand) => Ok(ops::to_property_key(&self.eval(operand)?)),
    }
  }
}
