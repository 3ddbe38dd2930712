use std::fmt;

use super::instruction::{Instruction, Operands};
use super::stream::Code;

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.operands {
      Operands::Register { r, s, t } => {
        write!(
          f,
          "{:3}:  {:>5}  {},{},{} ",
          self.address,
          self.opcode,
          r,
          s,
          t
        )?
      }
      Operands::Memory { r, d, s } => {
        write!(
          f,
          "{:3}:  {:>5}  {},{}({}) ",
          self.address,
          self.opcode,
          r,
          d,
          s
        )?
      }
    }
    if let Some(comment) = &self.comment {
      write!(f, "\t{}", comment)?;
    }
    Ok(())
  }
}

/// TM assembler text, one instruction per line in address order.
impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut comments = self.comments.iter().peekable();

    for (address, slot) in self.slots.iter().enumerate() {
      while let Some(comment) = comments.next_if(|c| c.address <= address) {
        writeln!(f, "* {}", comment.text)?;
      }
      if let Some(instruction) = slot {
        writeln!(f, "{}", instruction)?;
      }
    }
    for comment in comments {
      writeln!(f, "* {}", comment.text)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crate::tm::instruction::Opcode;
  use crate::tm::instruction::Register::*;
  use crate::tm::stream::InstructionStream;

  #[test]
  fn plain_listing() {
    let mut stream = InstructionStream::new(false);
    stream.emit_rm(Opcode::Ld, Gp, 0, Zero, "load from location 0");
    stream.emit_ro(Opcode::Halt, Ax, Ax, Ax, "END OF PROGRAM");

    assert_eq!(
      stream.finish().to_string(),
      "  0:     LD  4,0(2) \n  1:   HALT  0,0,0 \n"
    );
  }

  #[test]
  fn traced_listing_interleaves_comments() {
    let mut stream = InstructionStream::new(true);
    stream.comment("Begin prelude");
    stream.emit_rm(Opcode::Lda, Sp, -3, Gp, "allocate for global variables");
    stream.comment("End of prelude");

    assert_eq!(
      stream.finish().to_string(),
      "* Begin prelude\n  0:    LDA  6,-3(4) \tallocate for global variables\n* End of prelude\n"
    );
  }

  #[test]
  fn comments_are_sorted_into_backpatched_code() {
    let mut stream = InstructionStream::new(true);
    let hole = stream.reserve(1);
    stream.comment("after hole");
    stream.emit_ro(Opcode::Halt, Ax, Ax, Ax, "b");
    stream.rewind(hole).unwrap();
    stream.emit_rm(Opcode::Ldc, Ax, 9, Ax, "a");
    stream.resume();

    let text = stream.finish().to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "  0:    LDC  0,9(0) \ta");
    assert_eq!(lines[1], "* after hole");
    assert!(lines[2].contains("HALT"));
  }
}
