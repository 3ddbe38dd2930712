use frontend::ast::symtab::{VarScope, VarSymbol, VarType};

use super::CodeGenerator;
use crate::error::{CodegenError, CodegenResult};
use crate::tm::instruction::Register::{self, *};
use crate::tm::instruction::Opcode;

/// How a variable's address is formed: `opcode bx, displacement(base)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Location {
  pub opcode: Opcode,
  pub displacement: i32,
  pub base: Register,
}

/// Globals and locals grow down from their base register; the cell at the
/// base itself is reserved, hence the `-1` for scalars. Parameters sit above
/// the saved frame base and return address.
pub(crate) fn locate(var: &VarSymbol) -> Location {
  let offset = var.offset as i32;
  let (opcode, displacement, base) = match (var.scope, var.ty) {
    (VarScope::Global, VarType::Array) => (Opcode::Lda, -offset, Gp),
    (VarScope::Global, VarType::Int) => (Opcode::Lda, -1 - offset, Gp),
    (VarScope::Local, VarType::Array) => (Opcode::Lda, -offset, Bp),
    (VarScope::Local, VarType::Int) => (Opcode::Lda, -1 - offset, Bp),
    // The slot holds a reference to the caller's array.
    (VarScope::Param, VarType::Array) => (Opcode::Ld, 2 + offset, Bp),
    (VarScope::Param, VarType::Int) => (Opcode::Lda, 2 + offset, Bp),
  };
  Location {
    opcode,
    displacement,
    base,
  }
}

fn describe(var: &VarSymbol) -> &'static str {
  match (var.scope, var.ty) {
    (VarScope::Global, VarType::Array) => "get global array address",
    (VarScope::Global, VarType::Int) => "get global address",
    (VarScope::Local, VarType::Array) => "get local array address",
    (VarScope::Local, VarType::Int) => "get local address",
    (VarScope::Param, VarType::Array) => "get param array address",
    (VarScope::Param, VarType::Int) => "get param variable address",
  }
}

impl<'a> CodeGenerator<'a> {
  /// Leaves the address of `name` in `bx`.
  pub(crate) fn build_address(&mut self, name: &str) -> CodegenResult<VarSymbol> {
    let var = *self
      .scopes
      .lookup_var(name)
      .ok_or_else(|| CodegenError::UnknownVariable(name.to_string()))?;
    let location = locate(&var);
    self.stream.emit_rm(
      location.opcode,
      Bx,
      location.displacement,
      location.base,
      describe(&var),
    );
    Ok(var)
  }

  /// Loads the variable whose address is in `bx` into `ax`. An array's value
  /// is its base address.
  pub(crate) fn build_load(&mut self, var: &VarSymbol) {
    match var.ty {
      VarType::Array => {
        self
          .stream
          .emit_rm(
            Opcode::Lda,
            Ax,
            0,
            Bx,
            "get array variable value( == address)",
          )
      }
      VarType::Int => self.stream.emit_rm(Opcode::Ld, Ax, 0, Bx, "get variable value"),
    }
  }
}
