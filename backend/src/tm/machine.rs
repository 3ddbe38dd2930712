//! Minimal TM interpreter used to run generated programs in tests.

use std::collections::VecDeque;

use super::instruction::{Opcode, Operands, Register};
use super::stream::Code;

const DATA_SIZE: usize = 1024;
const STEP_LIMIT: usize = 200_000;

/// State of the machine after `HALT`.
pub(crate) struct Halted {
  pub output: Vec<i32>,
  reg: [i32; 8],
}

impl Halted {
  pub(crate) fn register(&self, register: Register) -> i32 {
    self.reg[register.number() as usize]
  }
}

pub(crate) struct Machine<'a> {
  code: &'a Code,
  reg: [i32; 8],
  data: Vec<i32>,
  input: VecDeque<i32>,
  output: Vec<i32>,
}

impl<'a> Machine<'a> {
  pub(crate) fn new(code: &'a Code, input: &[i32]) -> Self {
    let mut data = vec![0; DATA_SIZE];
    data[0] = (DATA_SIZE - 1) as i32;
    Machine {
      code,
      reg: [0; 8],
      data,
      input: input.iter().copied().collect(),
      output: Vec::new(),
    }
  }

  pub(crate) fn run(mut self) -> Result<Halted, String> {
    let code = self.code;
    for _ in 0..STEP_LIMIT {
      let pc = self.get(Register::Pc);
      let instruction = usize::try_from(pc)
        .ok()
        .and_then(|pc| code.get(pc))
        .ok_or_else(|| format!("no instruction at {}", pc))?;
      self.set(Register::Pc, pc + 1);

      match (instruction.opcode, instruction.operands) {
        (Opcode::Halt, _) => {
          return Ok(Halted {
            output: self.output,
            reg: self.reg,
          })
        }
        (op, Operands::Register { r, s, t }) => {
          let (a, b) = (self.get(s), self.get(t));
          let value = match op {
            Opcode::In => self.input.pop_front().ok_or("input exhausted")?,
            Opcode::Out => {
              let value = self.get(r);
              self.output.push(value);
              continue;
            }
            Opcode::Add => a.wrapping_add(b),
            Opcode::Sub => a.wrapping_sub(b),
            Opcode::Mul => a.wrapping_mul(b),
            Opcode::Div if b == 0 => return Err(format!("division by zero at {}", pc)),
            Opcode::Div => a / b,
            _ => return Err(format!("{} has register operands", op.mnemonic())),
          };
          self.set(r, value);
        }
        (op, Operands::Memory { r, d, s }) => {
          let ea = d + self.get(s);
          match op {
            Opcode::Ld => {
              let value = self.load(ea)?;
              self.set(r, value);
            }
            Opcode::St => {
              let value = self.get(r);
              self.store(ea, value)?;
            }
            Opcode::Lda => self.set(r, ea),
            Opcode::Ldc => self.set(r, d),
            _ => {
              let v = self.get(r);
              let taken = match op {
                Opcode::Jlt => v < 0,
                Opcode::Jle => v <= 0,
                Opcode::Jgt => v > 0,
                Opcode::Jge => v >= 0,
                Opcode::Jeq => v == 0,
                Opcode::Jne => v != 0,
                _ => return Err(format!("{} has memory operands", op.mnemonic())),
              };
              if taken {
                self.set(Register::Pc, ea);
              }
            }
          }
        }
      }
    }
    Err("step limit exceeded".to_string())
  }

  fn get(&self, register: Register) -> i32 {
    self.reg[register.number() as usize]
  }

  fn set(&mut self, register: Register, value: i32) {
    self.reg[register.number() as usize] = value;
  }

  fn cell(&self, address: i32) -> Result<usize, String> {
    usize::try_from(address)
      .ok()
      .filter(|a| *a < DATA_SIZE)
      .ok_or_else(|| format!("data address {} out of range", address))
  }

  fn load(&self, address: i32) -> Result<i32, String> {
    Ok(self.data[self.cell(address)?])
  }

  fn store(&mut self, address: i32, value: i32) -> Result<(), String> {
    let cell = self.cell(address)?;
    self.data[cell] = value;
    Ok(())
  }
}

/// Runs `code` to `HALT`.
pub(crate) fn run(code: &Code, input: &[i32]) -> Result<Halted, String> {
  Machine::new(code, input).run()
}
