//! Emitter contracts (spec §4.7): what the resolved core hands to the
//! external Makefile/header writer (`src/gen.rs`). This module defines the
//! contract only — no file formatting lives here.

use crate::session::{Session, VariableLists};
use crate::symtab::Symbol;

/// One symbol's resolved emission shape, already classified per the table
/// in spec §4.7 so `gen.rs` does not need to re-inspect the raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum EmitValue<'a> {
    /// `value == " "` — not set.
    NotSet,
    /// `value == "y"`.
    Enabled,
    /// `value == "'n'"` — the literal string "n" chosen as a value.
    LiteralN,
    /// `value == "n"` — disabled.
    Disabled,
    /// Any other resolved value.
    Other(&'a str),
}

pub fn classify(symbol: &Symbol) -> Option<EmitValue<'_>> {
    let value = symbol.value.as_deref()?;
    Some(match value {
        " " => EmitValue::NotSet,
        "y" => EmitValue::Enabled,
        "'n'" => EmitValue::LiteralN,
        "n" => EmitValue::Disabled,
        other => EmitValue::Other(other),
    })
}

/// Read-only view of a fully resolved session, as handed to the writer.
pub struct ResolvedModel<'a> {
    pub session: &'a Session,
}

impl<'a> ResolvedModel<'a> {
    pub fn new(session: &'a Session) -> Self {
        ResolvedModel { session }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &'a Symbol> {
        self.session.d.iterate()
    }

    pub fn lists(&self) -> &'a VariableLists {
        &self.session.lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::Symbol;

    #[test]
    fn classify_matches_spec_table() {
        let mut s = Symbol::new("X", 1);
        s.value = Some(" ".to_string());
        assert_eq!(classify(&s), Some(EmitValue::NotSet));
        s.value = Some("y".to_string());
        assert_eq!(classify(&s), Some(EmitValue::Enabled));
        s.value = Some("'n'".to_string());
        assert_eq!(classify(&s), Some(EmitValue::LiteralN));
        s.value = Some("n".to_string());
        assert_eq!(classify(&s), Some(EmitValue::Disabled));
        s.value = Some("256".to_string());
        assert_eq!(classify(&s), Some(EmitValue::Other("256")));
        s.value = None;
        assert_eq!(classify(&s), None);
    }
}
