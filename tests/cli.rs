//! Drives the `bci` and `bca` binaries end to end.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

/// A scratch file under the system temp directory, unique to this test process.
fn scratch(name: &str) -> PathBuf {
  let mut path = std::env::temp_dir();
  path.push(format!("bci-cli-{}-{}", std::process::id(), name));
  path
}

fn bci(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_bci"))
    .args(args)
    .output()
    .expect("failed to run bci")
}

fn bca(args: &[&str]) -> Output {
  Command::new(env!("CARGO_BIN_EXE_bca"))
    .args(args)
    .output()
    .expect("failed to run bca")
}

fn run_image(name: &str, bytes: &[u8]) -> Output {
  let path = scratch(name);
  fs::write(&path, bytes).unwrap();
  let output = bci(&[path.to_str().unwrap()]);
  fs::remove_file(&path).ok();
  output
}

fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn prints_a_sum() {
  let output = run_image(
    "sum.bcm",
    &[0x01, 0x02, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x08, 0x0C, 0x0D]
  );
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "5\n");
  assert_eq!(stderr(&output), "");
}

#[test]
fn divide_by_zero_prints_nothing() {
  let output = run_image(
    "div.bcm",
    &[0x01, 0x0A, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x0B, 0x0C, 0x0D]
  );
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "");
  assert!(stderr(&output).contains("division by zero"));
}

#[test]
fn underflow_then_stop() {
  let output = run_image("pop.bcm", &[0x02, 0x0D]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "");
  assert_eq!(stderr(&output).lines().count(), 1);
  assert!(stderr(&output).contains("STACK UNDERFLOW"));
}

#[test]
fn invalid_opcode_exits_cleanly() {
  let output = run_image("bad.bcm", &[0x01, 0x07, 0x00, 0x00, 0x00, 0x0C, 0xFF, 0x0C]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "7\n");
  assert!(stderr(&output).contains("invalid instruction 0xff at offset 6"));
}

#[test]
fn missing_file_fails() {
  let path = scratch("does-not-exist.bcm");
  let output = bci(&[path.to_str().unwrap()]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("error opening file"));
}

#[test]
fn missing_argument_fails() {
  let output = bci(&[]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).to_lowercase().contains("usage"));
}

#[test]
fn step_limit_ends_a_loop() {
  let path = scratch("loop.bcm");
  fs::write(&path, [0x05u8, 0x00, 0x00]).unwrap();
  let output = bci(&["--max-steps", "10", path.to_str().unwrap()]);
  fs::remove_file(&path).ok();
  assert_eq!(output.status.code(), Some(0));
  assert!(stderr(&output).contains("instruction limit of 10 exceeded"));
}

#[test]
fn assemble_then_run() {
  let source = scratch("count.bca");
  fs::write(
    &source,
    "# print 3, 2, 1\n\
         PUSH 3\n\
         STORE 0\n\
     top LOAD 0\n\
         PRINT\n\
         LOAD 0\n\
         PUSH 1\n\
         SUB\n\
         STORE 0\n\
         LOAD 0\n\
         JNZ top\n\
         STOP\n"
  ).unwrap();

  let assembled = bca(&[source.to_str().unwrap()]);
  assert_eq!(assembled.status.code(), Some(0), "{}", stderr(&assembled));

  let image = source.with_extension("bcm");
  let output = bci(&["--dump", image.to_str().unwrap()]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "3\n2\n1\n");
  assert!(stderr(&output).contains("Registers"));

  let listing = bca(&["-d", image.to_str().unwrap()]);
  assert_eq!(listing.status.code(), Some(0));
  assert!(stdout(&listing).contains("JNZ 7"));

  fs::remove_file(&source).ok();
  fs::remove_file(&image).ok();
}

#[test]
fn labelled_listing() {
  let source = scratch("labels.bca");
  fs::write(&source, "     PUSH 1\nspin JNZ spin\ndone STOP\n").unwrap();
  let output = bca(&["--listing", source.to_str().unwrap()]);
  let image = source.with_extension("bcm");
  fs::remove_file(&source).ok();
  fs::remove_file(&image).ok();
  assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
  assert_eq!(stdout(&output), "      PUSH 1\nspin  JNZ spin\ndone  STOP\n");
}

#[test]
fn assembler_usage_errors() {
  let output = bca(&[]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).to_lowercase().contains("usage"));

  let output = bca(&["-d", "--listing", "prog.bcm"]);
  assert_eq!(output.status.code(), Some(1));
}

#[test]
fn assembler_reports_errors() {
  let source = scratch("broken.bca");
  fs::write(&source, "PUSH 1\nLOAD 99\n").unwrap();
  let output = bca(&[source.to_str().unwrap()]);
  fs::remove_file(&source).ok();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("line 2: register 99 is invalid"));
}
