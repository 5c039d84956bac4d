//! Lowering from the expression AST to the compiled step program.
//!
//! One [`Compiler`] value exists per [`compile`] call and owns all compilation state: the slot
//! counter, the declared-slot list, and the emitted steps. The walk returns, for each
//! sub-expression, either an inline operand or the slot holding its value, plus the receiver a
//! member access would bind if a call consumes it. The compiler preserves the source
//! expression's exact evaluation order and short-circuit semantics while emitting flat,
//! sequential statements.

use crate::ast::{
  ArrayExpr, BinaryExpr, CallExpr, CondExpr, Expr, IdExpr, LitExpr, Literal, LogicalExpr,
  LogicalOp, MemberExpr, ObjectExpr, Program, UnaryExpr,
};
use crate::code::{CompiledExpr, Cond, Key, Operand, SlotId, Step};
use crate::value::Value;

/// Compiles an expression tree into a reusable executable unit.
///
/// The root is usually a [`Program`]; any other node compiles as a single-expression program.
/// The input must be well-formed: a `Program` nested in expression position is a parser bug and
/// panics.
pub fn compile(expr: &Expr) -> CompiledExpr {
  let mut compiler = Compiler::new();
  let ret = match expr {
    Expr::Program(program) => compiler.lower_program(program),
    other => compiler.lower(other).value,
  };
  CompiledExpr {
    slots: compiler.slots,
    steps: compiler.steps,
    ret,
  }
}

/// The result of lowering one sub-expression.
///
/// `receiver` is populated by member-access lowering: the object sub-expression's operand,
/// recorded before the guarded access is assembled so a consuming call can invoke the method
/// with the correct `this` binding (`obj.method()` must call with `this = obj`, not the result
/// of the guarded access).
struct Lowered {
  value: Operand,
  receiver: Option<Operand>,
}

impl Lowered {
  fn plain(value: Operand) -> Self {
    Self {
      value,
      receiver: None,
    }
  }
}

struct Compiler {
  next_slot: u32,
  slots: Vec<SlotId>,
  steps: Vec<Step>,
}

impl Compiler {
  fn new() -> Self {
    Self {
      next_slot: 0,
      slots: Vec::new(),
      steps: Vec::new(),
    }
  }

  /// Declares a fresh, never-reused temp slot.
  ///
  /// Declaration order is insertion order; the assembled unit declares every slot up front.
  fn declare(&mut self) -> SlotId {
    let slot = SlotId(self.next_slot);
    self.next_slot += 1;
    self.slots.push(slot);
    slot
  }

  fn emit(&mut self, step: Step) {
    self.steps.push(step);
  }

  /// Collects the steps emitted by `f` into a detached block instead of the main stream.
  ///
  /// Slots declared inside still land in the shared declaration list; only statement placement
  /// is scoped. This is how short-circuit and branch bodies capture the statements that must
  /// not run unless selected.
  fn in_block(&mut self, f: impl FnOnce(&mut Self) -> Operand) -> (Vec<Step>, Operand) {
    let outer = std::mem::take(&mut self.steps);
    let value = f(self);
    let body = std::mem::replace(&mut self.steps, outer);
    (body, value)
  }

  fn lower(&mut self, expr: &Expr) -> Lowered {
    match expr {
      Expr::Lit(lit) => Lowered::plain(Self::lower_literal(lit)),
      Expr::Id(id) => self.lower_id(id),
      Expr::Member(member) => self.lower_member(member),
      Expr::Array(array) => self.lower_array(array),
      Expr::Object(object) => self.lower_object(object),
      Expr::Unary(unary) => self.lower_unary(unary),
      Expr::Binary(binary) => self.lower_binary(binary),
      Expr::Logical(logical) => self.lower_logical(logical),
      Expr::Cond(cond) => self.lower_cond(cond),
      Expr::Call(call) => self.lower_call(call),
      Expr::Program(_) => unreachable!("Program only appears at the root of a well-formed tree"),
    }
  }

  /// Literals are side-effect-free and inline anywhere; no slot needed.
  fn lower_literal(expr: &LitExpr) -> Operand {
    Operand::Const(match &expr.value {
      Literal::Null => Value::Null,
      Literal::Bool(b) => Value::Bool(*b),
      Literal::Number(n) => Value::Number(*n),
      Literal::String(s) => Value::string(s),
    })
  }

  /// An identifier reads `context[name]` behind a context-null guard, so an undeclared variable
  /// in a null context yields undefined instead of faulting.
  fn lower_id(&mut self, expr: &IdExpr) -> Lowered {
    let slot = self.declare();
    self.emit(Step::LoadVar {
      slot,
      name: expr.name.clone(),
    });
    Lowered::plain(Operand::Slot(slot))
  }

  /// Every member dereference is guarded on the truthiness of its base, so a null/undefined
  /// anywhere in a chain short-circuits the whole chain to undefined.
  fn lower_member(&mut self, expr: &MemberExpr) -> Lowered {
    let object = self.lower(&expr.object).value;
    // Record the object operand before assembling the guarded access: a consuming call binds
    // it as the receiver, not the access result.
    let receiver = Some(object.clone());
    let key = self.lower_key(&expr.property, expr.computed);
    let slot = self.declare();
    self.emit(Step::LoadMember { slot, object, key });
    Lowered {
      value: Operand::Slot(slot),
      receiver,
    }
  }

  /// Non-computed identifier keys are static names; computed and non-identifier keys are
  /// lowered as key expressions.
  fn lower_key(&mut self, property: &Expr, computed: bool) -> Key {
    if !computed {
      if let Expr::Id(id) = property {
        return Key::Named(id.name.clone());
      }
    }
    Key::Computed(self.lower(property).value)
  }

  /// Constructing a literal cannot fault; elements inline, holes preserved.
  fn lower_array(&mut self, expr: &ArrayExpr) -> Lowered {
    let elements = expr
      .elements
      .iter()
      .map(|element| element.as_ref().map(|e| self.lower(e).value))
      .collect();
    Lowered::plain(Operand::Array(elements))
  }

  fn lower_object(&mut self, expr: &ObjectExpr) -> Lowered {
    let properties = expr
      .properties
      .iter()
      .map(|property| {
        let key = self.lower_key(&property.key, property.computed);
        let value = self.lower(&property.value).value;
        (key, value)
      })
      .collect();
    Lowered::plain(Operand::Object(properties))
  }

  fn lower_unary(&mut self, expr: &UnaryExpr) -> Lowered {
    let operand = self.lower(&expr.argument).value;
    Lowered::plain(Operand::Unary {
      op: expr.operator,
      operand: Box::new(operand),
    })
  }

  fn lower_binary(&mut self, expr: &BinaryExpr) -> Lowered {
    let left = self.lower(&expr.left).value;
    let right = self.lower(&expr.right).value;
    Lowered::plain(Operand::Binary {
      op: expr.operator,
      left: Box::new(left),
      right: Box::new(right),
    })
  }

  /// Short-circuit synthesis: the right operand's statements are collected into a conditional
  /// block, so its side effects run only when the operator requires its value. Inline
  /// concatenation cannot guarantee that once the operands are themselves multi-statement
  /// guarded sequences.
  fn lower_logical(&mut self, expr: &LogicalExpr) -> Lowered {
    let slot = self.declare();
    let left = self.lower(&expr.left).value;
    self.emit(Step::Assign { slot, value: left });

    let (mut body, right) = self.in_block(|c| c.lower(&expr.right).value);
    body.push(Step::Assign { slot, value: right });

    let cond = match expr.operator {
      LogicalOp::LogicalAnd => Cond::Truthy,
      LogicalOp::LogicalOr => Cond::Falsy,
      LogicalOp::NullishCoalescing => Cond::Nullish,
    };
    self.emit(Step::If {
      test: slot,
      cond,
      body,
    });
    Lowered::plain(Operand::Slot(slot))
  }

  /// Two independent guarded blocks, one per branch, so only the selected branch's statements
  /// execute.
  fn lower_cond(&mut self, expr: &CondExpr) -> Lowered {
    let result = self.declare();
    let test = self.declare();

    let test_value = self.lower(&expr.test).value;
    self.emit(Step::Assign {
      slot: test,
      value: test_value,
    });

    let (mut consequent, value) = self.in_block(|c| c.lower(&expr.consequent).value);
    consequent.push(Step::Assign {
      slot: result,
      value,
    });
    self.emit(Step::If {
      test,
      cond: Cond::Truthy,
      body: consequent,
    });

    let (mut alternate, value) = self.in_block(|c| c.lower(&expr.alternate).value);
    alternate.push(Step::Assign {
      slot: result,
      value,
    });
    self.emit(Step::If {
      test,
      cond: Cond::Falsy,
      body: alternate,
    });

    Lowered::plain(Operand::Slot(result))
  }

  /// The callee's receiver comes from member lowering when present and defaults to the context
  /// itself otherwise. The emitted step guards the callee before the call and only invokes a
  /// truthy callee, so calling an absent function property produces undefined instead of
  /// faulting.
  fn lower_call(&mut self, expr: &CallExpr) -> Lowered {
    let callee = self.lower(&expr.callee);
    let args = expr
      .arguments
      .iter()
      .map(|argument| self.lower(argument).value)
      .collect();
    let slot = self.declare();
    self.emit(Step::Call {
      slot,
      callee: callee.value,
      receiver: callee.receiver,
      args,
    });
    Lowered::plain(Operand::Slot(slot))
  }

  /// All but the last expression are bare statements; the last is the program's value.
  fn lower_program(&mut self, program: &Program) -> Operand {
    let mut ret = Operand::Const(Value::Undefined);
    let last = program.body.len().checked_sub(1);
    for (i, expr) in program.body.iter().enumerate() {
      let value = self.lower(expr).value;
      if Some(i) == last {
        ret = value;
      } else {
        self.emit(Step::Eval { value });
      }
    }
    ret
  }
}
