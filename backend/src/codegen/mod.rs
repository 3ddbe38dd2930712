mod address;
mod call;
#[cfg(test)]
pub(crate) mod fixtures;
mod translate;

use std::collections::HashMap;

use frontend::ast::symtab::Scopes;
use frontend::ast::Program;
use tracing::debug;

use crate::error::{CodegenError, CodegenResult};
use crate::tm::instruction::Opcode;
use crate::tm::instruction::Register::*;
use crate::tm::{Code, InstructionStream};
use crate::CodegenOptions;

/// Call sequence into `main` plus the final `HALT`.
const ENTRY_SEQUENCE_LEN: usize = call::CALL_SEQUENCE_LEN + 1;

const INPUT: &str = "input";
const OUTPUT: &str = "output";

/// Resolved machine entry of a function whose body has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FunctionEntry {
  pub address: usize,
  pub param_count: usize,
}

/// All state of one compilation: the instruction stream, the scope stack and
/// the entry addresses resolved so far.
pub struct CodeGenerator<'a> {
  program: &'a Program,
  stream: InstructionStream,
  scopes: Scopes<'a>,
  entries: HashMap<String, FunctionEntry>,
}

impl<'a> CodeGenerator<'a> {
  pub fn new(program: &'a Program, options: &CodegenOptions) -> Self {
    CodeGenerator {
      program,
      stream: InstructionStream::new(options.trace),
      scopes: Scopes::new(),
      entries: HashMap::new(),
    }
  }

  pub fn generate(mut self) -> CodegenResult<Code> {
    let program = self.program;

    self.emit_prelude();

    self.stream.comment("Jump to main()");
    let entry = self.stream.reserve(ENTRY_SEQUENCE_LEN);

    self.emit_input()?;
    self.emit_output()?;

    self.scopes.push(&program.globals);
    for declaration in &program.declarations {
      self.build_declaration(declaration)?;
    }
    self.scopes.pop();

    self.stream.rewind(entry)?;
    let main = self.resolve_function("main")?;
    self.emit_call(main);
    self.stream.emit_ro(Opcode::Halt, Ax, Ax, Ax, "END OF PROGRAM");
    self.stream.resume();

    debug!(
      instructions = self.stream.high_water(),
      functions = self.entries.len(),
      "code generation finished"
    );
    Ok(self.stream.finish())
  }

  fn emit_prelude(&mut self) {
    let globals = self.program.globals.size as i32;

    self.stream.comment("Begin prelude");
    self.stream.emit_rm(Opcode::Ld, Gp, 0, Zero, "load from location 0");
    self.stream.emit_rm(Opcode::St, Zero, 0, Zero, "clear location 0");
    self.stream.emit_rm(
      Opcode::Lda,
      Sp,
      -globals,
      Gp,
      "allocate for global variables",
    );
    self.stream.comment("End of prelude");
  }

  // The intrinsics run without a frame: sp points at the return address.
  fn emit_input(&mut self) -> CodegenResult<()> {
    self.stream.comment("Begin input()");
    self.define_entry(INPUT, 0)?;
    self.stream.emit_ro(Opcode::In, Ax, Ax, Ax, "read input into ax");
    self.stream.emit_rm(Opcode::Lda, Sp, 1, Sp, "pop prepare");
    self.stream.emit_rm(Opcode::Ld, Pc, -1, Sp, "pop return addr");
    self.stream.comment("End input()");
    Ok(())
  }

  fn emit_output(&mut self) -> CodegenResult<()> {
    self.stream.comment("Begin output()");
    self.define_entry(OUTPUT, 1)?;
    self.stream.emit_rm(Opcode::Ld, Ax, 1, Sp, "load param into ax");
    self.stream.emit_ro(Opcode::Out, Ax, Ax, Ax, "output using ax");
    self.stream.emit_rm(Opcode::Lda, Sp, 1, Sp, "pop prepare");
    self.stream.emit_rm(Opcode::Ld, Pc, -1, Sp, "pop return addr");
    self.stream.comment("End output()");
    Ok(())
  }

  /// Fixes `name` at the current location.
  fn define_entry(&mut self, name: &str, param_count: usize) -> CodegenResult<FunctionEntry> {
    if self.entries.contains_key(name) {
      return Err(CodegenError::DuplicateFunction(name.to_string()));
    }
    let entry = FunctionEntry {
      address: self.stream.reserve(0),
      param_count,
    };
    debug!(name, address = entry.address, param_count, "function entry");
    self.entries.insert(name.to_string(), entry);
    self.stream.set_entry_point(name, entry.address);
    Ok(entry)
  }

  fn resolve_function(&self, name: &str) -> CodegenResult<FunctionEntry> {
    match self.entries.get(name) {
      Some(entry) => Ok(*entry),
      None if self.program.function(name).is_some() => {
        Err(CodegenError::UnresolvedFunction(name.to_string()))
      }
      None => Err(CodegenError::UnknownFunction(name.to_string())),
    }
  }
}
