//! User-config loader (spec §4.3): reads `NAME = VALUE` lines into a
//! standalone "user overrides" symbol table U. Entries carry only a name and
//! a value — no type, choices, or dependency.

use std::path::{Path, PathBuf};

use crate::error::{LmError, LmResult};
use crate::lex::{is_block_terminator, trim_head_tail};
use crate::symtab::{Symbol, SymbolTable};

/// Loads `path` into a fresh user-override table. A missing file is only an
/// error when `required` is true (spec §4.3: "Missing file is NOT an error
/// when its path was not explicitly requested").
pub fn load(path: &Path, required: bool) -> LmResult<SymbolTable> {
    let mut table = SymbolTable::new();

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                return Err(LmError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
            log::info!("user config {} not present, starting empty", path.display());
            return Ok(table);
        }
        Err(e) => return Err(LmError::Io(e)),
    };

    for (lineno, raw_line) in text.lines().enumerate() {
        let line_no = lineno + 1;
        if is_block_terminator(raw_line) {
            continue;
        }
        let Some(eq_pos) = raw_line.find('=') else {
            return Err(syntax_err(path, line_no, "expected 'NAME = VALUE'"));
        };
        let name = trim_head_tail(&raw_line[..eq_pos]);
        if name.is_empty() {
            return Err(syntax_err(path, line_no, "empty symbol name"));
        }
        let raw_value = &raw_line[eq_pos + 1..];
        let value = if raw_value.trim().is_empty() {
            " ".to_string()
        } else {
            trim_head_tail(raw_value).to_string()
        };

        let mut symbol = Symbol::new(name, line_no);
        symbol.value = Some(value);
        table.insert(symbol);
    }

    Ok(table)
}

fn syntax_err(path: &Path, line: usize, message: &str) -> LmError {
    LmError::Syntax {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}

/// Path-typed wrapper retained for callers that need the canonical default
/// (`--projcfg` default is `.config`, spec §6).
pub fn default_path() -> PathBuf {
    PathBuf::from(".config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_name_value_lines() {
        let f = write_tmp("FOO = bar\n# a comment\n\nBAZ=256\n");
        let mut table = load(f.path(), true).unwrap();
        let foo = table.find("FOO").unwrap();
        assert_eq!(table.get(foo).value.as_deref(), Some("bar"));
        let baz = table.find("BAZ").unwrap();
        assert_eq!(table.get(baz).value.as_deref(), Some("256"));
    }

    #[test]
    fn all_whitespace_value_becomes_single_space() {
        let f = write_tmp("FOO =   \n");
        let mut table = load(f.path(), true).unwrap();
        let foo = table.find("FOO").unwrap();
        assert_eq!(table.get(foo).value.as_deref(), Some(" "));
    }

    #[test]
    fn missing_optional_file_is_empty_table() {
        let table = load(Path::new("/nonexistent/path/.config"), false).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn missing_required_file_errors() {
        let err = load(Path::new("/nonexistent/path/.config"), true).unwrap_err();
        assert!(matches!(err, LmError::MissingFile { .. }));
    }

    #[test]
    fn line_without_equals_is_syntax_error() {
        let f = write_tmp("not-an-assignment\n");
        let err = load(f.path(), true).unwrap_err();
        assert!(matches!(err, LmError::Syntax { .. }));
    }
}
