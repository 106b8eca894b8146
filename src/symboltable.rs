use std::fmt::{Display, Formatter};

use bimap::BiMap;
use string_cache::DefaultAtom;

/**
  A label naming a location in code memory. Numeric labels compare by value, so `007` and `7` are
  the same label. As with all strings in this codebase, label names are interned.
*/
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Label {
  Number(i64),
  Name(DefaultAtom)
}

impl Label {
  pub fn new(text: &str) -> Label {
    match text.parse::<i64>() {
      Ok(number) => Label::Number(number),
      Err(_)     => Label::Name(DefaultAtom::from(text))
    }
  }
}

impl Display for Label {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Label::Number(number) => write!(f, "{}", number),
      Label::Name(name)     => write!(f, "{}", name),
    }
  }
}

/**
  A symbol table is a mapping between labels and the byte offset of the instruction they label.
  It is really just a convenience wrapper around a BiMap. An offset carries at most one label.
*/
#[derive(Debug)]
pub struct SymbolTable {
  table: BiMap<Label, usize>
}

impl SymbolTable {

  pub fn new() -> SymbolTable {
    SymbolTable {
      table: BiMap::new()
    }
  }

  pub fn get_label(&self, address: usize) -> Option<Label> {
    self.table.get_by_right(&address).cloned()
  }

  pub fn get_address(&self, label: &Label) -> Option<usize> {
    self.table.get_by_left(label).copied()
  }

  /// Fails without modifying the table if either the label or the address is already present.
  pub fn insert(&mut self, label: Label, address: usize) -> Result<(), (Label, usize)> {
    self.table.insert_no_overwrite(label, address)
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
}
