//! bca: an assembler for the VM bytecode. It converts files written in the VM assembly language
//! (which end in .bca) to files in the VM machine language (which end in .bcm). With `-d` it
//! prints the assembly listing of a machine language file instead, and with `-l` it also prints
//! the listing of the file it just assembled, labels included.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{App, Arg, ArgMatches};

use bci::bytecode::{assemble, disassemble};

fn app() -> App<'static, 'static> {
  App::new("bca")
    .about("Assembles VM assembly language into VM bytecode")
    .arg(
      Arg::with_name("disassemble")
        .short("d")
        .long("disassemble")
        .help("Print the assembly listing of a bytecode file")
    )
    .arg(
      Arg::with_name("listing")
        .short("l")
        .long("listing")
        .conflicts_with("disassemble")
        .help("Print the labelled listing of the assembled program")
    )
    .arg(Arg::with_name("FILE").index(1).required(true))
}

/// The output path is the input path with a trailing `.bca` replaced by `.bcm`.
fn output_path(input: &Path) -> PathBuf {
  match input.extension() {
    Some(extension) if extension == "bca" => input.with_extension("bcm"),
    _ => {
      let mut name = input.as_os_str().to_os_string();
      name.push(".bcm");
      PathBuf::from(name)
    }
  }
}

fn fail(message: String) -> ! {
  eprintln!("bca: {}", message);
  process::exit(1);
}

fn run_assembler(input: &Path, listing: bool) {
  let text = fs::read_to_string(input)
    .unwrap_or_else(|e| fail(format!("cannot read {}: {}", input.display(), e)));

  let assembled = assemble(&text).unwrap_or_else(|e| fail(e.to_string()));

  let output = output_path(input);
  if let Err(e) = fs::write(&output, &assembled.bytes) {
    fail(format!("cannot write {}: {}", output.display(), e));
  }

  if listing {
    for line in disassemble(&assembled.bytes) {
      println!("{}", line.annotate(&assembled.symbols));
    }
  }
}

fn run_disassembler(input: &Path) {
  let bytes = fs::read(input)
    .unwrap_or_else(|e| fail(format!("cannot read {}: {}", input.display(), e)));

  for line in disassemble(&bytes) {
    println!("{}", line);
  }
}

fn run(matches: &ArgMatches) {
  // `FILE` is required, so clap has already rejected its absence.
  let input = Path::new(matches.value_of_os("FILE").unwrap_or_default());

  match matches.is_present("disassemble") {
    true  => run_disassembler(input),
    false => run_assembler(input, matches.is_present("listing"))
  }
}

fn main() {
  match app().get_matches_safe() {
    Ok(matches) => run(&matches),
    Err(e)      => e.exit()
  }
}
