//! The error taxonomy of the interpreter and the assembler.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bytecode::Operation;
use crate::machine::{N_REG, STACK_CAPACITY};

/// Conditions an operation reports before becoming a no-op. Execution continues afterward.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Fault {
  #[error("STACK OVERFLOW: Stack is full ({n} slots)", n = STACK_CAPACITY - 1)]
  StackOverflow,
  #[error("STACK UNDERFLOW: {operation} needs {needed} value(s) but the stack holds {available}")]
  StackUnderflow {
    operation: Operation,
    needed: usize,
    available: usize
  },
  #[error("ERROR: Invalid register {0}; only {n} registers are available", n = N_REG)]
  InvalidRegister(i32),
  #[error("ERROR: Invalid jump target {0}")]
  InvalidTarget(i32),
}

/// Conditions that end execution.
#[derive(Error, Debug)]
pub enum Abort {
  #[error("invalid instruction 0x{opcode:02x} at offset {offset}; aborting program!")]
  InvalidOpcode {
    opcode: u8,
    offset: usize
  },
  #[error("division by zero at offset {offset}; aborting program!")]
  DivideByZero {
    offset: usize
  },
  #[error("instruction pointer ran past the end of instruction memory; aborting program!")]
  EndOfMemory,
  #[error("instruction limit of {0} exceeded; aborting program!")]
  StepLimitExceeded(u64),
  #[error("cannot write program output: {0}")]
  Output(#[from] io::Error),
}

/// The failure of a single operation, either recoverable or fatal.
#[derive(Error, Debug)]
pub enum Trap {
  #[error(transparent)]
  Fault(#[from] Fault),
  #[error(transparent)]
  Abort(#[from] Abort),
}

#[derive(Error, Debug)]
pub enum LoadError {
  #[error("error opening file {}: {source}", .path.display())]
  FileUnavailable {
    path: PathBuf,
    source: io::Error
  },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("line {line}: {name} is not an operation")]
  NotAnOperation {
    line: usize,
    name: String
  },
  #[error("line {line}: {operation} takes {expected} argument(s) but was given {given}")]
  WrongArity {
    line: usize,
    operation: Operation,
    expected: usize,
    given: usize
  },
  #[error("line {line}: {text} is not a valid integer")]
  InvalidInteger {
    line: usize,
    text: String
  },
  #[error("line {line}: register {register} is invalid")]
  InvalidRegister {
    line: usize,
    register: i64
  },
  #[error("line {line}: undefined label {label}")]
  UndefinedLabel {
    line: usize,
    label: String
  },
  #[error("line {line}: label {label} is already defined")]
  DuplicateLabel {
    line: usize,
    label: String
  },
  #[error("line {line}: address {address} does not fit in a jump operand")]
  AddressOutOfRange {
    line: usize,
    address: usize
  },
  #[error("line {line}: invalid line: {text}")]
  MalformedLine {
    line: usize,
    text: String
  },
}

#[derive(Error, Debug)]
pub enum UsageError {
  /// Rejected by the argument parser, or a request for help or version text.
  #[error(transparent)]
  Command(#[from] clap::Error),
  #[error("invalid value {value} for {flag}")]
  InvalidValue {
    flag: String,
    value: String
  },
}
