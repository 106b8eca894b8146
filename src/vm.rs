//! The bytecode virtual machine: the program loader, the machine operations, and the
//! fetch-decode-execute loop.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::bytecode::*;
use crate::error::{Abort, Fault, LoadError, Trap};
use crate::machine::{register_index, Machine, MAX_INST};

/// What the dispatcher does after an instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
  Continue,
  Halt
}

/// The four binary operations on the top two stack entries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arithmetic {
  Add,
  Sub,
  Mul,
  Div
}

impl Arithmetic {
  pub fn operation(&self) -> Operation {
    match self {
      Arithmetic::Add => Operation::Add,
      Arithmetic::Sub => Operation::Sub,
      Arithmetic::Mul => Operation::Mul,
      Arithmetic::Div => Operation::Div,
    }
  }
}

pub struct VM {
  pub machine : Machine,
  /// Every recoverable fault reported during the run, in order.
  pub faults  : Vec<Fault>,
  /// Number of instructions executed, including the terminating one.
  pub steps   : u64,
  /// Optional ceiling on `steps`.
  max_steps   : Option<u64>,
  /// Offset of the instruction being executed.
  fetched     : usize,
}

impl VM {

  // region Low-level utility methods

  pub fn new() -> VM {
    VM {
      machine   : Machine::new(),
      faults    : vec![],
      steps     : 0,
      max_steps : None,
      fetched   : 0,
    }
  }

  pub fn with_step_limit(max_steps: Option<u64>) -> VM {
    let mut vm = VM::new();
    vm.max_steps = max_steps;
    vm
  }

  /// Writes a recoverable fault to the error stream and records it.
  fn report(&mut self, fault: Fault) {
    eprintln!("{}", fault);
    self.faults.push(fault);
  }

  // endregion

  // region Program loading

  /**
    Copies `source` into instruction memory starting at offset zero, returning the number of bytes
    copied. At most `MAX_INST` bytes are read; anything after that is silently ignored. Memory past
    the copied bytes stays zero, i.e. `NOP`.
  */
  pub fn load<R: Read>(&mut self, source: R) -> std::io::Result<usize> {
    let mut limited = source.take(MAX_INST as u64);
    let mut loaded  = 0;

    while loaded < MAX_INST {
      match limited.read(&mut self.machine.instructions[loaded..]) {
        Ok(0)  => break,
        Ok(n)  => loaded += n,
        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
        Err(e) => return Err(e),
      }
    }

    Ok(loaded)
  }

  /// Opens the file at `path` and loads it. The file is closed before this returns.
  pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let unavailable = |source| LoadError::FileUnavailable { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(unavailable)?;
    self.load(file).map_err(unavailable)
  }

  /// Copies a byte image into instruction memory, as `load` does.
  pub fn load_bytes(&mut self, bytes: &[u8]) -> usize {
    let count = bytes.len().min(MAX_INST);
    self.machine.instructions[..count].copy_from_slice(&bytes[..count]);
    count
  }

  // endregion

  // region VM instruction methods

  /// Pushes `value` onto the stack.
  pub fn push(&mut self, value: Word) -> Result<(), Fault> {
    self.machine.stack.push(value).map_err(|_| Fault::StackOverflow)
  }

  /// Removes the top entry of the stack.
  pub fn pop(&mut self) -> Result<(), Fault> {
    self.pop_value(Operation::Pop).map(|_| ())
  }

  fn pop_value(&mut self, operation: Operation) -> Result<Word, Fault> {
    self.machine.stack.pop().ok_or(Fault::StackUnderflow {
      operation,
      needed    : 1,
      available : 0
    })
  }

  /// Pushes the value of register `index`.
  pub fn load_register(&mut self, index: Word) -> Result<(), Fault> {
    if self.machine.stack.is_full() {
      return Err(Fault::StackOverflow);
    }
    let value = self.machine.register(index).ok_or(Fault::InvalidRegister(index))?;
    self.push(value)
  }

  /// Pops the top of the stack into register `index`.
  pub fn store_register(&mut self, index: Word) -> Result<(), Fault> {
    let register = register_index(index).ok_or(Fault::InvalidRegister(index))?;
    let value    = self.pop_value(Operation::Store)?;
    self.machine.registers[register] = value;
    Ok(())
  }

  /// Sets `ip` to `target`.
  pub fn jump(&mut self, target: Word) -> Result<(), Fault> {
    match target >= 0 && (target as usize) < MAX_INST {
      true  => {
        self.machine.ip = target as usize;
        Ok(())
      }
      false => Err(Fault::InvalidTarget(target))
    }
  }

  /**
    Pops the top of the stack and jumps to `target` if `jump_on_zero` agrees with whether the popped
    value was zero. The value is popped whether or not the jump is taken.
  */
  fn jump_if(&mut self, operation: Operation, target: Word, jump_on_zero: bool) -> Result<(), Fault> {
    let value = self.pop_value(operation)?;
    match (value == 0) == jump_on_zero {
      true  => self.jump(target),
      false => Ok(())
    }
  }

  pub fn jz(&mut self, target: Word) -> Result<(), Fault> {
    self.jump_if(Operation::Jz, target, true)
  }

  pub fn jnz(&mut self, target: Word) -> Result<(), Fault> {
    self.jump_if(Operation::Jnz, target, false)
  }

  /**
    Replaces the top two entries with `left OP right`, where `right` is the top of the stack.
    Addition, subtraction, and multiplication wrap. Division truncates toward zero, and a zero
    divisor is fatal; the stack is left untouched in that case.
  */
  pub fn arithmetic(&mut self, arithmetic: Arithmetic) -> Result<(), Trap> {
    let live = self.machine.stack.live();
    if live.len() < 2 {
      return Err(Trap::Fault(Fault::StackUnderflow {
        operation : arithmetic.operation(),
        needed    : 2,
        available : live.len()
      }));
    }
    let right = live[live.len() - 1];
    let left  = live[live.len() - 2];

    let result =
      match arithmetic {
        Arithmetic::Add => left.wrapping_add(right),
        Arithmetic::Sub => left.wrapping_sub(right),
        Arithmetic::Mul => left.wrapping_mul(right),
        Arithmetic::Div => {
          if right == 0 {
            return Err(Trap::Abort(Abort::DivideByZero { offset: self.fetched }));
          }
          left.wrapping_div(right)
        }
      };

    self.machine.stack.pop();
    self.machine.stack.pop();
    self.push(result)?;
    Ok(())
  }

  /// Writes the top of the stack to `out` as a decimal line and pops it.
  pub fn print<W: Write>(&mut self, out: &mut W) -> Result<(), Trap> {
    let value = self.machine.stack.top().ok_or(Fault::StackUnderflow {
      operation : Operation::Print,
      needed    : 1,
      available : 0
    })?;
    writeln!(out, "{}", value).map_err(Abort::Output)?;
    self.machine.stack.pop();
    Ok(())
  }

  // endregion

  // region Execution

  /**
    Fetches, decodes, and executes one instruction. Recoverable faults are reported and execution
    continues at the next instruction; fatal conditions are returned.
  */
  pub fn step<W: Write>(&mut self, out: &mut W) -> Result<Step, Abort> {
    if self.machine.ip >= MAX_INST {
      return Err(Abort::EndOfMemory);
    }
    if let Some(limit) = self.max_steps {
      if self.steps >= limit {
        return Err(Abort::StepLimitExceeded(limit));
      }
    }

    let offset      = self.machine.ip;
    self.fetched    = offset;
    let instruction =
      try_decode_instruction(&self.machine.instructions, &mut self.machine.ip)
        .map_err(|opcode| Abort::InvalidOpcode { opcode, offset })?;
    self.steps += 1;

    #[cfg(feature = "trace_computation")] eprintln!("{:>5}: {}", offset, instruction);

    let result: Result<(), Trap> =
      match instruction {

        Instruction::Nullary(Operation::Stop) => return Ok(Step::Halt),

        Instruction::Nullary(Operation::Nop) => Ok(()),

        Instruction::Nullary(Operation::Pop) => self.pop().map_err(Trap::from),

        Instruction::Nullary(Operation::Print) => self.print(out),

        Instruction::Nullary(Operation::Add) => self.arithmetic(Arithmetic::Add),
        Instruction::Nullary(Operation::Sub) => self.arithmetic(Arithmetic::Sub),
        Instruction::Nullary(Operation::Mul) => self.arithmetic(Arithmetic::Mul),
        Instruction::Nullary(Operation::Div) => self.arithmetic(Arithmetic::Div),

        Instruction::Unary { opcode, operand } => {
          let outcome =
            match opcode {
              Operation::Push  => self.push(operand),
              Operation::Load  => self.load_register(operand),
              Operation::Store => self.store_register(operand),
              Operation::Jmp   => self.jump(operand),
              Operation::Jz    => self.jz(operand),
              Operation::Jnz   => self.jnz(operand),
              _ => unreachable!("Unreachable: {} was decoded with an operand.", opcode)
            };
          outcome.map_err(Trap::from)
        }

        Instruction::Nullary(opcode) => {
          unreachable!("Unreachable: {} was decoded without its operand.", opcode)
        }

      };

    match result {
      Ok(())                  => {}
      Err(Trap::Fault(fault)) => self.report(fault),
      Err(Trap::Abort(abort)) => return Err(abort),
    }

    #[cfg(feature = "trace_computation")] eprintln!("{}", self.machine);

    Ok(Step::Continue)
  }

  /// Runs from `ip` until a `STOP` instruction or a fatal condition.
  pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), Abort> {
    while let Step::Continue = self.step(out)? {}
    Ok(())
  }

  /// Resets the stack and instruction pointer and runs the loaded program from offset zero.
  pub fn execute<W: Write>(&mut self, out: &mut W) -> Result<(), Abort> {
    self.machine.ip = 0;
    self.machine.stack.clear();
    self.run(out)
  }

  // endregion

}
