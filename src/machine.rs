/*!
  The state of the virtual machine: the operand stack, the register file, instruction memory, and
  the instruction pointer. Each store has a fixed capacity and checks its own bounds, so the
  operations in `crate::vm` never index outside of a buffer.
*/

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::{read_operand, Width, Word};

/// Number of slots in the operand stack. The last slot is never filled.
pub const STACK_CAPACITY: usize = 1000;
/// Number of registers in the register file.
pub const N_REG: usize = 16;
/// Size in bytes of instruction memory.
pub const MAX_INST: usize = 65536;


/**
  A fixed-capacity stack of words. `sp` is the number of live entries, so the top of the stack
  is at `sp - 1`. A push into the second to last slot is the last one that succeeds.
*/
pub struct Stack {
  slots : Box<[Word]>,
  sp    : usize
}

impl Stack {

  pub fn new() -> Stack {
    Stack {
      slots : vec![0; STACK_CAPACITY].into_boxed_slice(),
      sp    : 0
    }
  }

  pub fn sp(&self) -> usize {
    self.sp
  }

  pub fn is_empty(&self) -> bool {
    self.sp == 0
  }

  pub fn is_full(&self) -> bool {
    self.sp >= STACK_CAPACITY - 1
  }

  pub fn top(&self) -> Option<Word> {
    self.live().last().copied()
  }

  /// The live entries, bottom first.
  pub fn live(&self) -> &[Word] {
    &self.slots[..self.sp]
  }

  /// Returns the value back if the stack is full.
  pub fn push(&mut self, value: Word) -> Result<(), Word> {
    if self.is_full() {
      return Err(value);
    }
    self.slots[self.sp] = value;
    self.sp += 1;
    Ok(())
  }

  /// Removes the top entry, zeroing its slot.
  pub fn pop(&mut self) -> Option<Word> {
    if self.is_empty() {
      return None;
    }
    self.sp -= 1;
    let value = self.slots[self.sp];
    self.slots[self.sp] = 0;
    Some(value)
  }

  pub fn clear(&mut self) {
    for slot in self.slots.iter_mut() {
      *slot = 0;
    }
    self.sp = 0;
  }
}


/// The machine state of a single program run.
pub struct Machine {
  pub stack        : Stack,
  pub registers    : [Word; N_REG],
  pub instructions : Box<[u8]>,
  /// Offset of the next opcode to fetch.
  pub ip           : usize,
}

impl Machine {

  // region Display methods

  fn make_register_table<T>(name: &str, registers: &[T], highlight: Option<usize>) -> Table
    where T: Display
  {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in registers.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  /// A zero-initialized machine.
  pub fn new() -> Machine {
    Machine {
      stack        : Stack::new(),
      registers    : [0; N_REG],
      instructions : vec![0u8; MAX_INST].into_boxed_slice(),
      ip           : 0,
    }
  }

  /// Resets the stack, the registers, instruction memory, and both pointers to zero.
  pub fn initialize(&mut self) {
    self.stack.clear();
    self.registers = [0; N_REG];
    for byte in self.instructions.iter_mut() {
      *byte = 0;
    }
    self.ip = 0;
  }

  pub fn sp(&self) -> usize {
    self.stack.sp()
  }

  /// Reads an operand at `ip`, advancing `ip` past it.
  pub fn read_operand(&mut self, width: Width) -> Word {
    read_operand(&self.instructions, &mut self.ip, width)
  }

  pub fn register(&self, index: Word) -> Option<Word> {
    register_index(index).map(|i| self.registers[i])
  }
}

/// Converts a register operand to an index into the register file, if it names a register.
pub fn register_index(index: Word) -> Option<usize> {
  match index >= 0 && (index as usize) < N_REG {
    true  => Some(index as usize),
    false => None
  }
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let live    = self.stack.live();
    let s_table = Machine::make_register_table("S", live, live.len().checked_sub(1));
    let r_table = Machine::make_register_table("R", &self.registers, None);

    let mut combined_table = table!([s_table, r_table]);

    combined_table.set_titles(row![ub->"Stack", ub->"Registers"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let next_byte = self.instructions.get(self.ip).copied().unwrap_or(0);

    write!(
      f,
      "ip: {} (next byte 0x{:02x})\tsp: {}\n{}",
      self.ip, next_byte, self.stack.sp(), combined_table
    )
  }
}
