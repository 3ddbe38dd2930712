use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarScope {
  Global,
  Local,
  Param,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
  Int,
  Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarSymbol {
  pub scope: VarScope,
  pub ty: VarType,
  pub offset: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
  #[error("`{0}` is already declared in this scope")]
  Duplicate(String),
}

/// One lexical scope.
///
/// `size` counts the memory cells the scope occupies below its base register
/// (for parameters: above it). Scalars live at `base - 1 - offset`, array
/// elements at `base - offset - i`, parameters at `base + 2 + offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
  pub scope: VarScope,
  pub size: usize,
  pub vars: BTreeMap<String, VarSymbol>,
}

impl SymbolTable {
  pub fn new(scope: VarScope) -> Self {
    SymbolTable {
      scope,
      size: 0,
      vars: BTreeMap::new(),
    }
  }

  /// A nested local block. Its storage starts where `parent` ends.
  pub fn block(parent: &SymbolTable) -> Self {
    SymbolTable {
      scope: VarScope::Local,
      size: parent.size,
      vars: BTreeMap::new(),
    }
  }

  pub fn declare_int(&mut self, name: &str) -> Result<VarSymbol, SymbolError> {
    if self.scope == VarScope::Param {
      return self.declare_param(name, VarType::Int);
    }
    let offset = self.size;
    self.insert(name, VarType::Int, offset, 1)
  }

  pub fn declare_array(&mut self, name: &str, len: usize) -> Result<VarSymbol, SymbolError> {
    if self.scope == VarScope::Param {
      return self.declare_param(name, VarType::Array);
    }
    let offset = self.size + 1;
    self.insert(name, VarType::Array, offset, len)
  }

  /// Parameters take one cell each; an array parameter holds a reference.
  pub fn declare_param(&mut self, name: &str, ty: VarType) -> Result<VarSymbol, SymbolError> {
    let offset = self.size;
    self.insert(name, ty, offset, 1)
  }

  pub fn get(&self, name: &str) -> Option<&VarSymbol> {
    self.vars.get(name)
  }

  fn insert(
    &mut self,
    name: &str,
    ty: VarType,
    offset: usize,
    cells: usize,
  ) -> Result<VarSymbol, SymbolError> {
    if self.vars.contains_key(name) {
      return Err(SymbolError::Duplicate(name.to_string()));
    }
    let symbol = VarSymbol {
      scope: self.scope,
      ty,
      offset,
    };
    self.vars.insert(name.to_string(), symbol);
    self.size += cells;
    Ok(symbol)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunSymbol {
  pub return_type: Type,
  pub params: SymbolTable,
}

impl FunSymbol {
  pub fn new(return_type: Type, params: SymbolTable) -> Self {
    FunSymbol {
      return_type,
      params,
    }
  }

  pub fn param_count(&self) -> usize {
    self.params.size
  }
}

/// The stack of scopes visible at the current point of a traversal.
#[derive(Debug, Default)]
pub struct Scopes<'a> {
  tables: Vec<&'a SymbolTable>,
}

impl<'a> Scopes<'a> {
  pub fn new() -> Self {
    Scopes { tables: Vec::new() }
  }

  pub fn push(&mut self, table: &'a SymbolTable) {
    self.tables.push(table);
  }

  pub fn pop(&mut self) -> Option<&'a SymbolTable> {
    self.tables.pop()
  }

  /// Innermost declaration wins.
  pub fn lookup_var(&self, name: &str) -> Option<&'a VarSymbol> {
    self.tables.iter().rev().find_map(|table| table.get(name))
  }
}
