/*!
  This module is responsible for the encoding and decoding of binary instructions.

*/
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use super::{Operation, Instruction, Width};
use crate::symboltable::SymbolTable;

// If you change this you must also change `read_operand` and `encode_instruction`.
pub type Word = i32;

/**
  Reads a little-endian integer of the given width from `memory` starting at `*ip`, and advances
  `*ip` past the consumed bytes. The bytes are assembled as an unsigned integer and then
  reinterpreted as a `Word`, so only a four byte operand can be negative.

  Bytes past the end of `memory` read as zero, the same as unloaded instruction memory.
*/
pub fn read_operand(memory: &[u8], ip: &mut usize, width: Width) -> Word {
  let mut value: u32 = 0;
  for i in 0..width.bytes() {
    let byte = memory.get(*ip + i).copied().unwrap_or(0);
    value |= (byte as u32) << (8 * i);
  }
  *ip += width.bytes();
  value as Word
}

/**
  Fetches the opcode at `*ip` and the operand that follows it, advancing `*ip` past both. If the
  byte at `*ip` is not an opcode, `*ip` is still advanced by one and the offending byte is
  returned as the error.
*/
pub fn try_decode_instruction(memory: &[u8], ip: &mut usize) -> Result<Instruction, u8> {
  let byte = memory.get(*ip).copied().unwrap_or(0);
  *ip += 1;

  let opcode = Operation::try_from(byte).map_err(|_| byte)?;

  let instruction =
    match opcode.operand_width() {
      Some(width) => Instruction::Unary {
        opcode,
        operand: read_operand(memory, ip, width)
      },
      None => Instruction::Nullary(opcode)
    };

  Ok(instruction)
}

/**
  Encodes the instruction into bytecode. Operands are truncated to the width of the opcode; it is
  the caller's responsibility to range check them first.
*/
pub fn encode_instruction(instruction: &Instruction) -> Vec<u8> {
  let mut bytes = Vec::with_capacity(instruction.size());
  bytes.push(instruction.opcode().code());

  if let Instruction::Unary { opcode, operand } = instruction {
    // A `Unary` built for an opcode without an operand encodes as the bare opcode.
    if let Some(width) = opcode.operand_width() {
      bytes.extend_from_slice(&operand.to_le_bytes()[..width.bytes()]);
    }
  }

  bytes
}


/// One line of a disassembly listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Listing {
  Decoded {
    offset: usize,
    instruction: Instruction
  },
  Unknown {
    offset: usize,
    byte: u8
  }
}

impl Display for Listing {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Listing::Decoded { offset, instruction } => {
        write!(f, "{:<6}{}", offset, instruction)
      }

      Listing::Unknown { offset, byte } => {
        write!(f, "# {}: unknown opcode 0x{:02x}", offset, byte)
      }

    }
  }
}

impl Listing {
  /**
    Renders the line with the labels of an assembled program in place of offsets: the label of the
    instruction's own offset (if any) leads the line, and a jump operand names its target's label.
  */
  pub fn annotate(&self, symbols: &SymbolTable) -> String {
    match self {

      Listing::Decoded { offset, instruction } => {
        let label = symbols.get_label(*offset).map_or(String::new(), |label| label.to_string());
        match instruction {
          Instruction::Unary { opcode, operand } if opcode.operand_width() == Some(Width::Half) => {
            let target = symbols.get_label(*operand as usize)
                                .map_or(operand.to_string(), |label| label.to_string());
            format!("{:<6}{} {}", label, opcode, target)
          }
          _ => format!("{:<6}{}", label, instruction)
        }
      }

      Listing::Unknown { .. } => self.to_string()

    }
  }
}

/**
  Decodes a whole program image. Every decoded line starts with its own offset, which the
  assembler reads as a numeric label, so jump operands in the listing refer to those labels.
*/
pub fn disassemble(bytes: &[u8]) -> Vec<Listing> {
  let mut listing = Vec::new();
  let mut ip = 0;

  while ip < bytes.len() {
    let offset = ip;
    match try_decode_instruction(bytes, &mut ip) {
      Ok(instruction) => listing.push(Listing::Decoded { offset, instruction }),
      Err(byte)       => listing.push(Listing::Unknown { offset, byte }),
    }
  }

  listing
}
