//! Runs a bytecode file produced by `bca`.

use std::io::{self, Write};
use std::process;

use bci::config::Config;
use bci::error::UsageError;
use bci::VM;

fn main() {
  let config =
    match Config::from_args(std::env::args().skip(1)) {
      Ok(config) => config,
      // Help and version requests exit with 0, malformed arguments with 1.
      Err(UsageError::Command(e)) => e.exit(),
      Err(e) => {
        eprintln!("bci: {}", e);
        process::exit(1);
      }
    };

  #[cfg(feature = "trace_computation")]
  eprintln!("Computation Tracing ENABLED");

  let mut vm = VM::with_step_limit(config.max_steps);
  vm.machine.initialize();

  if let Err(e) = vm.load_file(&config.path) {
    eprintln!("bci: {}; aborting.", e);
    process::exit(1);
  }

  let stdout = io::stdout();
  let mut out = stdout.lock();

  // Every way a loaded program can end counts as having run.
  if let Err(abort) = vm.execute(&mut out) {
    eprintln!("bci: {}", abort);
  }
  if let Err(e) = out.flush() {
    eprintln!("bci: cannot write program output: {}", e);
  }

  if config.dump {
    eprintln!("{}", vm.machine);
  }
}
