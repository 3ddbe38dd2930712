//! The TM target machine: instruction model, emission stream and listing.
pub mod instruction;
mod listing;
#[cfg(test)]
pub(crate) mod machine;
pub mod stream;

pub use self::instruction::{Instruction, Opcode, Operands, Register};
pub use self::stream::{Code, Comment, InstructionStream};
