//! Program construction helpers shared by the code generator tests.

use frontend::ast::symtab::{FunSymbol, SymbolTable, VarScope, VarType};
use frontend::ast::{Node, Program, Type};

use crate::tm::machine::{self, Halted};
use crate::{generate_tm, CodegenOptions};

pub(crate) struct ProgramBuilder {
  program: Program,
}

impl ProgramBuilder {
  pub(crate) fn new() -> Self {
    ProgramBuilder {
      program: Program::new(SymbolTable::new(VarScope::Global)),
    }
  }

  pub(crate) fn global_int(mut self, name: &str) -> Self {
    self.program.globals.declare_int(name).unwrap();
    self
  }

  pub(crate) fn global_array(mut self, name: &str, len: usize) -> Self {
    self.program.globals.declare_array(name, len).unwrap();
    self
  }

  pub(crate) fn function(
    mut self,
    name: &str,
    return_type: Type,
    params: SymbolTable,
    body: Node,
  ) -> Self {
    self
      .program
      .functions
      .insert(name.to_string(), FunSymbol::new(return_type, params));
    self
      .program
      .declarations
      .push(Node::function(name, return_type, body));
    self
  }

  pub(crate) fn build(self) -> Program {
    self.program
  }
}

pub(crate) fn params(list: &[(&str, VarType)]) -> SymbolTable {
  let mut table = SymbolTable::new(VarScope::Param);
  for (name, ty) in list {
    table.declare_param(name, *ty).unwrap();
  }
  table
}

pub(crate) fn locals(names: &[&str]) -> SymbolTable {
  let mut table = SymbolTable::new(VarScope::Local);
  for name in names {
    table.declare_int(name).unwrap();
  }
  table
}

pub(crate) fn run(program: &Program, input: &[i32]) -> Halted {
  let code = generate_tm(program, &CodegenOptions::default()).unwrap();
  machine::run(&code, input).unwrap_or_else(|e| panic!("TM error: {}\n{}", e, code))
}
