use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::instruction::{rm, ro, Form, Instruction, Opcode, Operands, Register};
use crate::error::{CodegenError, CodegenResult};

/// A trace comment anchored before the instruction at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
  pub address: usize,
  pub text: String,
}

/// Address-assigning instruction sink with reserve/backpatch support.
///
/// Slots are indexed by address. `reserve` leaves `None` holes that a later
/// `rewind` .. `emit` .. `resume` sequence fills in place.
#[derive(Debug)]
pub struct InstructionStream {
  slots: Vec<Option<Instruction>>,
  comments: Vec<Comment>,
  entry_points: BTreeMap<String, usize>,
  cursor: usize,
  high_water: usize,
  trace: bool,
}

impl InstructionStream {
  pub fn new(trace: bool) -> Self {
    InstructionStream {
      slots: Vec::new(),
      comments: Vec::new(),
      entry_points: BTreeMap::new(),
      cursor: 0,
      high_water: 0,
      trace,
    }
  }

  pub fn emit(&mut self, opcode: Opcode, operands: Operands, comment: &str) {
    debug_assert_eq!(
      opcode.form() == Form::RegisterOnly,
      matches!(operands, Operands::Register { .. }),
      "operand form does not match {}",
      opcode.mnemonic()
    );

    let address = self.cursor;
    let instruction = Instruction {
      address,
      opcode,
      operands,
      comment: self.trace.then(|| comment.to_string()),
    };
    trace!(address, opcode = opcode.mnemonic(), comment, "emit");

    if address >= self.slots.len() {
      self.slots.resize(address + 1, None);
    }
    self.slots[address] = Some(instruction);

    self.cursor += 1;
    if self.high_water < self.cursor {
      self.high_water = self.cursor;
    }
  }

  pub fn emit_ro(&mut self, opcode: Opcode, r: Register, s: Register, t: Register, comment: &str) {
    self.emit(opcode, ro(r, s, t), comment);
  }

  pub fn emit_rm(&mut self, opcode: Opcode, r: Register, d: i32, s: Register, comment: &str) {
    self.emit(opcode, rm(r, d, s), comment);
  }

  /// Skips `count` slots and returns the first of them.
  pub fn reserve(&mut self, count: usize) -> usize {
    let first = self.cursor;
    self.cursor += count;
    if self.high_water < self.cursor {
      self.high_water = self.cursor;
      self.slots.resize(self.high_water, None);
    }
    first
  }

  /// Current emission address.
  pub fn current(&self) -> usize {
    self.cursor
  }

  pub fn high_water(&self) -> usize {
    self.high_water
  }

  pub fn rewind(&mut self, address: usize) -> CodegenResult<()> {
    if address > self.high_water {
      self.comment(&format!("BUG in rewind to {}", address));
      return Err(CodegenError::Backpatch {
        address,
        high_water: self.high_water,
      });
    }
    debug!(from = self.cursor, to = address, "backpatch");
    self.cursor = address;
    Ok(())
  }

  pub fn resume(&mut self) {
    self.cursor = self.high_water;
  }

  pub fn comment(&mut self, text: &str) {
    if self.trace {
      self.comments.push(Comment {
        address: self.cursor,
        text: text.to_string(),
      });
    }
  }

  pub fn set_entry_point(&mut self, name: &str, address: usize) {
    self.entry_points.insert(name.to_string(), address);
  }

  pub fn finish(mut self) -> Code {
    self.comments.sort_by_key(|comment| comment.address);
    Code {
      slots: self.slots,
      comments: self.comments,
      entry_points: self.entry_points,
    }
  }
}

/// A finished TM program.
#[derive(Debug, Clone)]
pub struct Code {
  pub(crate) slots: Vec<Option<Instruction>>,
  pub(crate) comments: Vec<Comment>,
  entry_points: BTreeMap<String, usize>,
}

impl Code {
  /// Number of addresses in use, reserved holes included.
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  pub fn get(&self, address: usize) -> Option<&Instruction> {
    self.slots.get(address).and_then(Option::as_ref)
  }

  pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
    self.slots.iter().flatten()
  }

  pub fn comments(&self) -> &[Comment] {
    &self.comments
  }

  pub fn entry_point(&self, name: &str) -> Option<usize> {
    self.entry_points.get(name).copied()
  }
}
