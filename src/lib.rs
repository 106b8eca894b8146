//! A stack-based bytecode interpreter (`bci`) and the assembler (`bca`) that produces its input.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;

pub mod bytecode;
pub mod config;
pub mod error;
pub mod machine;
pub mod symboltable;
pub mod vm;

pub use crate::vm::VM;
