use frontend::ast::Node;

use super::{CodeGenerator, FunctionEntry};
use crate::error::CodegenResult;
use crate::tm::instruction::Opcode;
use crate::tm::instruction::Register::{self, *};

/// Instructions in a call site. The return address computed by the first one
/// points at the last one, which releases the arguments.
pub(crate) const CALL_SEQUENCE_LEN: usize = 5;

/// Cells a function body needs below its frame base: the largest extent of
/// its own scope and of any block nested in it.
pub(crate) fn frame_size(node: &Node) -> usize {
  match node {
    Node::Compound(scope, statements) => statements
      .iter()
      .map(frame_size)
      .chain(scope.as_ref().map(|table| table.size))
      .max()
      .unwrap_or(0),
    Node::If(_, then_branch, else_branch) => {
      let else_size = else_branch.as_deref().map_or(0, frame_size);
      frame_size(then_branch).max(else_size)
    }
    Node::While(_, body) => frame_size(body),
    _ => 0,
  }
}

impl<'a> CodeGenerator<'a> {
  pub(crate) fn push(&mut self, register: Register, comment: &str) {
    self.stream.emit_rm(Opcode::Lda, Sp, -1, Sp, "push prepare");
    self.stream.emit_rm(Opcode::St, register, 0, Sp, comment);
  }

  pub(crate) fn pop(&mut self, register: Register, comment: &str) {
    self.stream.emit_rm(Opcode::Lda, Sp, 1, Sp, "pop prepare");
    self.stream.emit_rm(Opcode::Ld, register, -1, Sp, comment);
  }

  pub(crate) fn emit_prologue(&mut self, locals: usize) {
    self.push(Bp, "push old bp");
    self.stream.emit_rm(Opcode::Lda, Bp, 0, Sp, "let bp == sp");
    self.stream.emit_rm(
      Opcode::Lda,
      Sp,
      -(locals as i32),
      Sp,
      "allocate for local variables",
    );
  }

  /// Drops the frame, restores the caller's `bp` and jumps to the return
  /// address the call site pushed.
  pub(crate) fn emit_epilogue(&mut self) {
    self.stream.emit_rm(Opcode::Lda, Sp, 0, Bp, "let sp == bp");
    self.stream.emit_rm(Opcode::Lda, Sp, 2, Sp, "pop prepare");
    self.stream.emit_rm(Opcode::Ld, Bp, -2, Sp, "pop old bp");
    self.stream.emit_rm(Opcode::Ld, Pc, -1, Sp, "pop return addr");
  }

  pub(crate) fn emit_call(&mut self, callee: FunctionEntry) {
    // pc already points past this instruction.
    let return_offset = (CALL_SEQUENCE_LEN - 2) as i32;
    self.stream.emit_rm(Opcode::Lda, Ax, return_offset, Pc, "store returned PC");
    self.push(Ax, "push returned PC");
    self.stream.emit_rm(
      Opcode::Ldc,
      Pc,
      callee.address as i32,
      Ax,
      "jump to function",
    );
    self.stream.emit_rm(
      Opcode::Lda,
      Sp,
      callee.param_count as i32,
      Sp,
      "release parameters",
    );
  }

  /// Pushes the arguments right to left, so the first one ends up nearest the
  /// callee's frame base, then calls.
  pub(crate) fn build_call(&mut self, name: &str, args: &'a [Node]) -> CodegenResult<()> {
    let callee = self.resolve_function(name)?;
    for arg in args.iter().rev() {
      self.build_expression(arg, super::translate::Access::Value)?;
      self.push(Ax, "push parameters");
    }
    self.emit_call(callee);
    Ok(())
  }
}
