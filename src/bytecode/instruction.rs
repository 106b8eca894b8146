use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use super::Word;

/**
  Opcodes of the virtual machine.

  The discriminants are the byte values that appear in bytecode files, so they must not be
  reordered. The operand that follows each opcode is determined solely by
  `Operation::operand_width()`, which both the decoder and the assembler consult.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,            Hash
)]
#[strum(serialize_all = "shouty_snake_case")]
#[repr(u8)]
pub enum Operation {
  Nop   = 0x00, // nop
  Push  = 0x01, // push( immediate )
  Pop   = 0x02, // pop
  Load  = 0x03, // load( register )
  Store = 0x04, // store( register )
  Jmp   = 0x05, // jmp( address )
  Jz    = 0x06, // jz( address )
  Jnz   = 0x07, // jnz( address )
  Add   = 0x08, // add
  Sub   = 0x09, // sub
  Mul   = 0x0A, // mul
  Div   = 0x0B, // div
  Print = 0x0C, // print
  Stop  = 0x0D, // stop
}

/// The width in bytes of an instruction operand. Only these three widths exist.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Width {
  Byte,
  Half,
  Word,
}

impl Width {
  pub fn bytes(&self) -> usize {
    match self {
      Width::Byte => 1,
      Width::Half => 2,
      Width::Word => 4,
    }
  }
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The width of the operand following this opcode, or `None` if it takes no operand.
  pub fn operand_width(&self) -> Option<Width> {
    match self {
      Operation::Push => Some(Width::Word),

      | Operation::Load
      | Operation::Store => Some(Width::Byte),

      | Operation::Jmp
      | Operation::Jz
      | Operation::Jnz => Some(Width::Half),

      _ => None
    }
  }

  pub fn arity(&self) -> usize {
    match self.operand_width() {
      Some(_) => 1,
      None    => 0
    }
  }

  /// The number of bytes the whole instruction occupies, opcode included.
  pub fn instruction_size(&self) -> usize {
    1 + self.operand_width().map_or(0, |width| width.bytes())
  }
}

/// Holds the decoded components of an instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// [OpCode:8][Operand:8|16|32]
  Unary {
    opcode: Operation,
    operand: Word
  },
  /// [OpCode:8]
  Nullary(Operation),
}

impl Instruction {
  pub fn opcode(&self) -> Operation {
    match self {
      Instruction::Unary { opcode, .. } => *opcode,
      Instruction::Nullary(opcode)      => *opcode,
    }
  }

  pub fn size(&self) -> usize {
    self.opcode().instruction_size()
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::Unary { opcode, operand } => {
        write!(f, "{} {}", opcode, operand)
      }

      Instruction::Nullary(opcode) => {
        write!(f, "{}", opcode)
      }

    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;

  #[test]
  fn byte_values_match_file_format() {
    assert_eq!(Operation::Nop.code(), 0x00);
    assert_eq!(Operation::Push.code(), 0x01);
    assert_eq!(Operation::Jnz.code(), 0x07);
    assert_eq!(Operation::Div.code(), 0x0B);
    assert_eq!(Operation::Stop.code(), 0x0D);
    assert_eq!(Operation::try_from(0x0Cu8).ok(), Some(Operation::Print));
    assert!(Operation::try_from(0x0Eu8).is_err());
    assert!(Operation::try_from(0xFFu8).is_err());
  }

  #[test]
  fn operand_widths() {
    assert_eq!(Operation::Push.instruction_size(), 5);
    assert_eq!(Operation::Load.instruction_size(), 2);
    assert_eq!(Operation::Store.instruction_size(), 2);
    assert_eq!(Operation::Jz.instruction_size(), 3);
    assert_eq!(Operation::Add.instruction_size(), 1);
    assert_eq!(Operation::Stop.arity(), 0);
    assert_eq!(Operation::Jmp.arity(), 1);
  }

  #[test]
  fn mnemonics() {
    assert_eq!(Operation::from_str("PRINT").ok(), Some(Operation::Print));
    assert_eq!(Operation::from_str("JNZ").ok(), Some(Operation::Jnz));
    assert!(Operation::from_str("HALT").is_err());
    assert_eq!(format!("{}", Instruction::Nullary(Operation::Add)), "ADD");
    assert_eq!(
      format!("{}", Instruction::Unary { opcode: Operation::Push, operand: -7 }),
      "PUSH -7"
    );
  }
}
