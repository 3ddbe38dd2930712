pub mod symtab;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use self::symtab::{FunSymbol, SymbolTable};

/// A fully annotated program, as handed over by semantic analysis.
///
/// `declarations` holds the top-level function definitions in source order.
/// Global variables only exist in `globals`; they produce no code of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
  pub globals: SymbolTable,
  pub functions: BTreeMap<String, FunSymbol>,
  pub declarations: Vec<Node>,
}

impl Program {
  pub fn new(globals: SymbolTable) -> Self {
    Program {
      globals,
      functions: BTreeMap::new(),
      declarations: Vec::new(),
    }
  }

  pub fn function(&self, name: &str) -> Option<&FunSymbol> {
    self.functions.get(name)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
  Int,
  Array,
  Void,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
  pub name: String,
  pub return_type: Type,
  pub body: Box<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
  FunctionDecl(FunctionDecl),
  Compound(Option<SymbolTable>, Vec<Node>),
  If(Box<Node>, Box<Node>, Option<Box<Node>>),
  While(Box<Node>, Box<Node>),
  /// Carries the declared return type of the enclosing function.
  Return(Type, Option<Box<Node>>),
  Number(i32),
  Var(String),
  ArrayElement(String, Box<Node>),
  Assign(Box<Node>, Box<Node>),
  Binary(BinaryOp, Box<Node>, Box<Node>),
  Call(String, Vec<Node>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Equal,
  NotEqual,
  LessThan,
  GreaterThan,
  LessOrEqual,
  GreaterOrEqual,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::Equal => "==",
      BinaryOp::NotEqual => "!=",
      BinaryOp::LessThan => "<",
      BinaryOp::GreaterThan => ">",
      BinaryOp::LessOrEqual => "<=",
      BinaryOp::GreaterOrEqual => ">=",
    }
  }
}

// Shorthand constructors, mostly for producers building trees by hand.
impl Node {
  pub fn function(name: &str, return_type: Type, body: Node) -> Node {
    Node::FunctionDecl(FunctionDecl {
      name: name.to_string(),
      return_type,
      body: Box::new(body),
    })
  }

  pub fn block(scope: Option<SymbolTable>, statements: Vec<Node>) -> Node {
    Node::Compound(scope, statements)
  }

  pub fn if_else(test: Node, then_branch: Node, else_branch: Option<Node>) -> Node {
    Node::If(
      Box::new(test),
      Box::new(then_branch),
      else_branch.map(Box::new),
    )
  }

  pub fn while_loop(test: Node, body: Node) -> Node {
    Node::While(Box::new(test), Box::new(body))
  }

  pub fn ret(return_type: Type, value: Option<Node>) -> Node {
    Node::Return(return_type, value.map(Box::new))
  }

  pub fn num(value: i32) -> Node {
    Node::Number(value)
  }

  pub fn var(name: &str) -> Node {
    Node::Var(name.to_string())
  }

  pub fn index(name: &str, index: Node) -> Node {
    Node::ArrayElement(name.to_string(), Box::new(index))
  }

  pub fn assign(target: Node, value: Node) -> Node {
    Node::Assign(Box::new(target), Box::new(value))
  }

  pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    Node::Binary(op, Box::new(left), Box::new(right))
  }

  pub fn call(name: &str, args: Vec<Node>) -> Node {
    Node::Call(name.to_string(), args)
  }

  /// Variant name, used in diagnostics.
  pub fn kind(&self) -> &'static str {
    match self {
      Node::FunctionDecl(_) => "function declaration",
      Node::Compound(_, _) => "compound statement",
      Node::If(_, _, _) => "if statement",
      Node::While(_, _) => "while statement",
      Node::Return(_, _) => "return statement",
      Node::Number(_) => "number",
      Node::Var(_) => "variable",
      Node::ArrayElement(_, _) => "array element",
      Node::Assign(_, _) => "assignment",
      Node::Binary(_, _, _) => "binary expression",
      Node::Call(_, _) => "call",
    }
  }
}

impl FromIterator<Node> for Program {
  fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
    Program {
      globals: SymbolTable::new(symtab::VarScope::Global),
      functions: BTreeMap::new(),
      declarations: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn operator_symbols() {
    assert_eq!(BinaryOp::LessOrEqual.symbol(), "<=");
    assert_eq!(BinaryOp::NotEqual.symbol(), "!=");
    assert_eq!(BinaryOp::Div.symbol(), "/");
  }

  #[test]
  fn program_survives_json() {
    let mut program: Program = vec![Node::function(
      "main",
      Type::Void,
      Node::block(None, vec![Node::call("output", vec![Node::num(7)])]),
    )]
    .into_iter()
    .collect();
    program.functions.insert(
      "main".to_string(),
      FunSymbol::new(Type::Void, SymbolTable::new(symtab::VarScope::Param)),
    );

    let json = serde_json::to_string(&program).unwrap();
    let back: Program = serde_json::from_str(&json).unwrap();
    assert_eq!(back.declarations.len(), 1);
    assert_eq!(back.declarations[0].kind(), "function declaration");
    assert!(back.function("main").is_some());
  }

  #[test]
  fn unknown_node_kind_is_rejected() {
    let err = serde_json::from_str::<Node>(r#"{"Goto": "label"}"#);
    assert!(err.is_err());
  }
}
