/*!
  The human readable textual form of bytecode is called assembly. This module leverages the
  `strum` derives of `Operation` to read mnemonics and assembles text into a bytecode image.

  Each line has the form

    ```text
    [label] operation [argument]   # comment
    ```

  Labels name the byte offset of the instruction on their line and are either integers or
  identifiers. When a line has exactly two fields, it is `operation argument` if the first field
  is a mnemonic and `label operation` otherwise. Mnemonics are case insensitive. The argument is a
  register index for `LOAD`/`STORE`, a label for the jumps, and a signed integer for `PUSH`.
*/

use std::str::FromStr;

use nom::{
  bytes::complete::{is_not, take_while1},
  character::complete::{char as one_char, digit1, space0, space1},
  combinator::{all_consuming, map_res, opt, recognize},
  multi::separated_list,
  sequence::{delimited, pair},
  IResult
};

use crate::bytecode::{encode_instruction, Instruction, Operation, Width, Word};
use crate::error::AssemblyError;
use crate::machine::N_REG;
use crate::symboltable::{Label, SymbolTable};

/// The output of the assembler: the bytecode image and the labels it defines.
#[derive(Debug)]
pub struct Assembled {
  pub bytes   : Vec<u8>,
  pub symbols : SymbolTable
}

/// One instruction line after the first pass.
struct Statement<'a> {
  line      : usize,
  operation : Operation,
  argument  : Option<&'a str>
}

// region Parsers

fn field(input: &str) -> IResult<&str, &str> {
  is_not(" \t")(input)
}

/// Splits a line (with its comment already removed) into whitespace separated fields.
fn fields(input: &str) -> IResult<&str, Vec<&str>> {
  all_consuming(delimited(space0, separated_list(space1, field), space0))(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
  all_consuming(
    map_res(
      recognize(pair(opt(one_char('-')), digit1)),
      |text: &str| text.parse::<i64>()
    )
  )(input)
}

fn label(input: &str) -> IResult<&str, Label> {
  let (rest, text) = all_consuming(
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')
  )(input)?;
  Ok((rest, Label::new(text)))
}

// endregion

fn strip_comment(text: &str) -> &str {
  match text.find('#') {
    Some(start) => &text[..start],
    None        => text
  }
}

fn parse_operation(line: usize, name: &str) -> Result<Operation, AssemblyError> {
  Operation::from_str(&name.to_ascii_uppercase()).map_err(|_| AssemblyError::NotAnOperation {
    line,
    name: name.to_string()
  })
}

fn parse_label(line: usize, text: &str) -> Result<Label, AssemblyError> {
  label(text)
    .map(|(_, label)| label)
    .map_err(|_| AssemblyError::MalformedLine { line, text: text.to_string() })
}

fn parse_integer(line: usize, text: &str) -> Result<i64, AssemblyError> {
  integer(text)
    .map(|(_, value)| value)
    .map_err(|_| AssemblyError::InvalidInteger { line, text: text.to_string() })
}

/**
  Converts the textual argument to an operand. Register indices and integers are range checked
  here; labels are resolved against the completed symbol table.
*/
fn resolve_argument(
  statement : &Statement,
  width     : Width,
  text      : &str,
  symbols   : &SymbolTable
) -> Result<Word, AssemblyError> {
  let line = statement.line;

  match width {

    Width::Byte => {
      let register = parse_integer(line, text)?;
      match register >= 0 && (register as usize) < N_REG {
        true  => Ok(register as Word),
        false => Err(AssemblyError::InvalidRegister { line, register })
      }
    }

    Width::Half => {
      let target  = parse_label(line, text)?;
      let address = symbols.get_address(&target).ok_or(AssemblyError::UndefinedLabel {
        line,
        label: target.to_string()
      })?;
      match address <= u16::max_value() as usize {
        true  => Ok(address as Word),
        false => Err(AssemblyError::AddressOutOfRange { line, address })
      }
    }

    Width::Word => {
      let value = parse_integer(line, text)?;
      match value >= Word::min_value() as i64 && value <= Word::max_value() as i64 {
        true  => Ok(value as Word),
        false => Err(AssemblyError::InvalidInteger { line, text: text.to_string() })
      }
    }

  }
}

/**
  Assembles `text` into a bytecode image in two passes. The first pass parses every line, assigns
  each instruction its byte offset, and records labels. The second encodes the instructions with
  their arguments, resolving jump targets to offsets. Assembly stops at the first error.
*/
pub fn assemble(text: &str) -> Result<Assembled, AssemblyError> {
  let mut symbols    = SymbolTable::new();
  let mut statements = Vec::new();
  let mut offset     = 0usize;

  for (index, raw_line) in text.lines().enumerate() {
    let line = index + 1;
    let body = strip_comment(raw_line);

    let words =
      match fields(body) {
        Ok((_, words)) => words,
        Err(_)         => return Err(AssemblyError::MalformedLine { line, text: body.trim().to_string() })
      };

    let (label_text, name, argument) =
      match words.as_slice() {
        []                    => continue,
        [name]                => (None, *name, None),
        [first, second]       => {
          match parse_operation(line, first) {
            Ok(_)  => (None, *first, Some(*second)),
            Err(_) => (Some(*first), *second, None)
          }
        }
        [label, name, arg]    => (Some(*label), *name, Some(*arg)),
        _                     => {
          return Err(AssemblyError::MalformedLine { line, text: body.trim().to_string() });
        }
      };

    let operation = parse_operation(line, name)?;

    let given = argument.map_or(0, |_| 1);
    if given != operation.arity() {
      return Err(AssemblyError::WrongArity {
        line,
        operation,
        expected: operation.arity(),
        given
      });
    }

    if let Some(label_text) = label_text {
      let label = parse_label(line, label_text)?;
      if let Err((label, _)) = symbols.insert(label, offset) {
        return Err(AssemblyError::DuplicateLabel { line, label: label.to_string() });
      }
    }

    statements.push(Statement { line, operation, argument });
    offset += operation.instruction_size();
  }

  let mut bytes = Vec::with_capacity(offset);
  for statement in statements.iter() {
    let instruction =
      match (statement.operation.operand_width(), statement.argument) {
        (Some(width), Some(text)) => Instruction::Unary {
          opcode  : statement.operation,
          operand : resolve_argument(statement, width, text, &symbols)?
        },
        _ => Instruction::Nullary(statement.operation)
      };
    bytes.extend(encode_instruction(&instruction));
  }

  Ok(Assembled { bytes, symbols })
}
