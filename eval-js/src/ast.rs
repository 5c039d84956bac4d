//! The expression AST consumed by the compiler.
//!
//! This is the input boundary: a parser collaborator produces these nodes, either natively in
//! Rust or as ESTree-style JSON handed across via serde (the enum is internally tagged on
//! `type` with ESTree names). The tree is immutable input; the compiler never mutates it.
//!
//! An unknown `type` tag fails deserialization, and a well-formed [`Expr`] value cannot contain
//! an unsupported kind, so "unsupported node kind" is caught either at the serde boundary or by
//! the compiler's exhaustive match at build time.

use derive_more::From;
use serde::Deserialize;
use serde::Serialize;

/// An expression node, polymorphic over the supported node kinds.
#[derive(Clone, Debug, From, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
  #[serde(rename = "Program")]
  Program(Program),
  #[serde(rename = "ConditionalExpression")]
  Cond(CondExpr),
  #[serde(rename = "LogicalExpression")]
  Logical(LogicalExpr),
  #[serde(rename = "BinaryExpression")]
  Binary(BinaryExpr),
  #[serde(rename = "UnaryExpression")]
  Unary(UnaryExpr),
  #[serde(rename = "CallExpression")]
  Call(CallExpr),
  #[serde(rename = "MemberExpression")]
  Member(MemberExpr),
  #[serde(rename = "ArrayExpression")]
  Array(ArrayExpr),
  #[serde(rename = "ObjectExpression")]
  Object(ObjectExpr),
  #[serde(rename = "Identifier")]
  Id(IdExpr),
  #[serde(rename = "Literal")]
  Lit(LitExpr),
}

/// A sequence of top-level expression statements.
///
/// The expression language has no other statement kind, so the body is the expressions
/// themselves rather than `ExpressionStatement` wrapper nodes. All but the last evaluate for
/// side effect only; the last produces the program's value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub body: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CondExpr {
  pub test: Box<Expr>,
  pub consequent: Box<Expr>,
  pub alternate: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpr {
  pub operator: LogicalOp,
  pub left: Box<Expr>,
  pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
  pub operator: BinaryOp,
  pub left: Box<Expr>,
  pub right: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
  pub operator: UnaryOp,
  pub argument: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
  pub callee: Box<Expr>,
  pub arguments: Vec<Expr>,
}

/// `object.property` or, when `computed`, `object[property]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberExpr {
  pub object: Box<Expr>,
  pub property: Box<Expr>,
  #[serde(default)]
  pub computed: bool,
}

/// An array literal. `None` elements are holes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpr {
  pub elements: Vec<Option<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpr {
  pub properties: Vec<Property>,
}

/// One object-literal property. Non-computed identifier keys are static names; everything else
/// is lowered as a key expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
  pub key: Expr,
  pub value: Expr,
  #[serde(default)]
  pub computed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdExpr {
  pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LitExpr {
  pub value: Literal,
}

/// A literal value: null, boolean, number, or string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
  Null,
  Bool(bool),
  Number(f64),
  String(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
  #[serde(rename = "&&")]
  LogicalAnd,
  #[serde(rename = "||")]
  LogicalOr,
  #[serde(rename = "??")]
  NullishCoalescing,
}

impl LogicalOp {
  pub fn token(self) -> &'static str {
    match self {
      LogicalOp::LogicalAnd => "&&",
      LogicalOp::LogicalOr => "||",
      LogicalOp::NullishCoalescing => "??",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
  #[serde(rename = "+")]
  Addition,
  #[serde(rename = "-")]
  Subtraction,
  #[serde(rename = "*")]
  Multiplication,
  #[serde(rename = "/")]
  Division,
  #[serde(rename = "%")]
  Remainder,
  #[serde(rename = "<")]
  LessThan,
  #[serde(rename = "<=")]
  LessThanOrEqual,
  #[serde(rename = ">")]
  GreaterThan,
  #[serde(rename = ">=")]
  GreaterThanOrEqual,
  #[serde(rename = "==")]
  Equality,
  #[serde(rename = "!=")]
  Inequality,
  #[serde(rename = "===")]
  StrictEquality,
  #[serde(rename = "!==")]
  StrictInequality,
  #[serde(rename = "&")]
  BitwiseAnd,
  #[serde(rename = "|")]
  BitwiseOr,
  #[serde(rename = "^")]
  BitwiseXor,
  #[serde(rename = "<<")]
  BitwiseLeftShift,
  #[serde(rename = ">>")]
  BitwiseRightShift,
  #[serde(rename = ">>>")]
  BitwiseUnsignedRightShift,
  #[serde(rename = "in")]
  In,
}

impl BinaryOp {
  pub fn token(self) -> &'static str {
    match self {
      BinaryOp::Addition => "+",
      BinaryOp::Subtraction => "-",
      BinaryOp::Multiplication => "*",
      BinaryOp::Division => "/",
      BinaryOp::Remainder => "%",
      BinaryOp::LessThan => "<",
      BinaryOp::LessThanOrEqual => "<=",
      BinaryOp::GreaterThan => ">",
      BinaryOp::GreaterThanOrEqual => ">=",
      BinaryOp::Equality => "==",
      BinaryOp::Inequality => "!=",
      BinaryOp::StrictEquality => "===",
      BinaryOp::StrictInequality => "!==",
      BinaryOp::BitwiseAnd => "&",
      BinaryOp::BitwiseOr => "|",
      BinaryOp::BitwiseXor => "^",
      BinaryOp::BitwiseLeftShift => "<<",
      BinaryOp::BitwiseRightShift => ">>",
      BinaryOp::BitwiseUnsignedRightShift => ">>>",
      BinaryOp::In => "in",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
  #[serde(rename = "-")]
  UnaryNegation,
  #[serde(rename = "+")]
  UnaryPlus,
  #[serde(rename = "!")]
  LogicalNot,
  #[serde(rename = "~")]
  BitwiseNot,
  #[serde(rename = "typeof")]
  Typeof,
  #[serde(rename = "void")]
  Void,
}

impl UnaryOp {
  pub fn token(self) -> &'static str {
    match self {
      UnaryOp::UnaryNegation => "-",
      UnaryOp::UnaryPlus => "+",
      UnaryOp::LogicalNot => "!",
      UnaryOp::BitwiseNot => "~",
      UnaryOp::Typeof => "typeof",
      UnaryOp::Void => "void",
    }
  }
}
