/*!

  Bytecode is a flat stream of bytes with no header. Each instruction is a one byte opcode
  followed by a little-endian operand whose width is fixed by the opcode:

    Width 0: NOP POP ADD SUB MUL DIV PRINT STOP
    Width 1: LOAD STORE       (register index)
    Width 2: JMP JZ JNZ       (absolute byte offset)
    Width 4: PUSH             (signed immediate)

  The table lives in `Operation::operand_width()`, and the decoder, the encoder, and the
  assembler all consult it. Operands are decoded as unsigned integers and then widened, so only
  the four byte `PUSH` immediate can be negative.

  Rather than carrying one enum variant per opcode, a decoded `Instruction` is either `Nullary`
  or `Unary` with a single operand. The opcode itself is an enum that inhabits a single byte.

*/

mod binary;
mod instruction;
mod assembly;

pub use binary::{read_operand, try_decode_instruction, encode_instruction, disassemble,
                 Listing, Word};
pub use instruction::{Instruction, Operation, Width};
pub use assembly::{assemble, Assembled};
