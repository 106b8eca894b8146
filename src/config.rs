//! Command-line configuration of the interpreter.

use std::path::PathBuf;

use clap::{App, Arg};

use crate::error::UsageError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
  /// The bytecode file to run.
  pub path      : PathBuf,
  /// Ceiling on the number of instructions executed. `None` means unlimited.
  pub max_steps : Option<u64>,
  /// Print the final machine state to the error stream.
  pub dump      : bool,
}

fn app() -> App<'static, 'static> {
  App::new("bci")
    .about("Runs a bytecode file produced by bca")
    .arg(
      Arg::with_name("max-steps")
        .long("max-steps")
        .value_name("N")
        .takes_value(true)
        .help("Abort after executing N instructions")
    )
    .arg(
      Arg::with_name("dump")
        .long("dump")
        .help("Print the final machine state to stderr")
    )
    .arg(Arg::with_name("FILE").index(1).required(true))
}

impl Config {

  /// Parses the arguments following the program name.
  pub fn from_args<I>(args: I) -> Result<Config, UsageError>
    where I: IntoIterator<Item = String>
  {
    let matches = app().get_matches_from_safe(std::iter::once("bci".to_string()).chain(args))?;

    let max_steps =
      match matches.value_of("max-steps") {
        Some(value) => Some(value.parse::<u64>().map_err(|_| UsageError::InvalidValue {
          flag: "--max-steps".to_string(),
          value: value.to_string()
        })?),
        None => None
      };

    Ok(Config {
      // `FILE` is required, so clap has already rejected its absence.
      path: PathBuf::from(matches.value_of_os("FILE").unwrap_or_default()),
      max_steps,
      dump: matches.is_present("dump")
    })
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use clap::ErrorKind;

  fn args(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
  }

  fn rejected(text: &str) -> Option<ErrorKind> {
    match Config::from_args(args(text)) {
      Err(UsageError::Command(e)) => Some(e.kind),
      _ => None
    }
  }

  #[test]
  fn file_only() {
    let config = Config::from_args(args("prog.bcm")).unwrap();
    assert_eq!(config.path, PathBuf::from("prog.bcm"));
    assert_eq!(config.max_steps, None);
    assert!(!config.dump);
  }

  #[test]
  fn all_options() {
    let config = Config::from_args(args("--max-steps 1000 prog.bcm --dump")).unwrap();
    assert_eq!(config.path, PathBuf::from("prog.bcm"));
    assert_eq!(config.max_steps, Some(1000));
    assert!(config.dump);
  }

  #[test]
  fn usage_errors() {
    assert_eq!(rejected(""), Some(ErrorKind::MissingRequiredArgument));
    assert_eq!(rejected("--verbose a.bcm"), Some(ErrorKind::UnknownArgument));
    assert!(rejected("a.bcm b.bcm").is_some());
    assert!(rejected("a.bcm --max-steps").is_some());
    assert_eq!(rejected("--help"), Some(ErrorKind::HelpDisplayed));
  }

  #[test]
  fn step_limit_must_be_a_number() {
    match Config::from_args(args("--max-steps lots a.bcm")) {
      Err(UsageError::InvalidValue { flag, value }) => {
        assert_eq!(flag, "--max-steps");
        assert_eq!(value, "lots");
      }
      other => panic!("expected an invalid value, got {:?}", other),
    }
  }
}
