use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
  /// Value register.
  Ax,
  /// Address register.
  Bx,
  /// Never written, always 0.
  Zero,
  /// Global frame base.
  Gp,
  /// Frame base of the running function.
  Bp,
  Sp,
  Pc,
}

impl Register {
  pub fn number(self) -> u8 {
    match self {
      Register::Ax => 0,
      Register::Bx => 1,
      Register::Zero => 2,
      Register::Gp => 4,
      Register::Bp => 5,
      Register::Sp => 6,
      Register::Pc => 7,
    }
  }
}

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.number())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
  RegisterOnly,
  RegisterMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  Halt,
  In,
  Out,
  Add,
  Sub,
  Mul,
  Div,
  Ld,
  St,
  Lda,
  Ldc,
  Jlt,
  Jle,
  Jgt,
  Jge,
  Jeq,
  Jne,
}

impl Opcode {
  pub fn form(self) -> Form {
    match self {
      Opcode::Halt
      | Opcode::In
      | Opcode::Out
      | Opcode::Add
      | Opcode::Sub
      | Opcode::Mul
      | Opcode::Div => Form::RegisterOnly,
      _ => Form::RegisterMemory,
    }
  }

  pub fn mnemonic(self) -> &'static str {
    match self {
      Opcode::Halt => "HALT",
      Opcode::In => "IN",
      Opcode::Out => "OUT",
      Opcode::Add => "ADD",
      Opcode::Sub => "SUB",
      Opcode::Mul => "MUL",
      Opcode::Div => "DIV",
      Opcode::Ld => "LD",
      Opcode::St => "ST",
      Opcode::Lda => "LDA",
      Opcode::Ldc => "LDC",
      Opcode::Jlt => "JLT",
      Opcode::Jle => "JLE",
      Opcode::Jgt => "JGT",
      Opcode::Jge => "JGE",
      Opcode::Jeq => "JEQ",
      Opcode::Jne => "JNE",
    }
  }
}

impl fmt::Display for Opcode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(self.mnemonic())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
  /// `r, s, t`
  Register { r: Register, s: Register, t: Register },
  /// `r, d(s)`
  Memory { r: Register, d: i32, s: Register },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
  pub address: usize,
  pub opcode: Opcode,
  pub operands: Operands,
  pub comment: Option<String>,
}

impl Instruction {
  /// Displacement of a register-memory instruction.
  pub fn displacement(&self) -> Option<i32> {
    match self.operands {
      Operands::Memory { d, .. } => Some(d),
      Operands::Register { .. } => None,
    }
  }

  pub fn is(&self, opcode: Opcode, operands: Operands) -> bool {
    self.opcode == opcode && self.operands == operands
  }
}

pub fn rm(r: Register, d: i32, s: Register) -> Operands {
  Operands::Memory { r, d, s }
}

pub fn ro(r: Register, s: Register, t: Register) -> Operands {
  Operands::Register { r, s, t }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn opcode_forms() {
    assert_eq!(Opcode::Halt.form(), Form::RegisterOnly);
    assert_eq!(Opcode::Sub.form(), Form::RegisterOnly);
    assert_eq!(Opcode::Ldc.form(), Form::RegisterMemory);
    assert_eq!(Opcode::Jge.form(), Form::RegisterMemory);
  }

  #[test]
  fn mnemonics_pad() {
    assert_eq!(format!("{:>5}", Opcode::Ld), "   LD");
    assert_eq!(format!("{:>5}", Opcode::Halt), " HALT");
  }
}
