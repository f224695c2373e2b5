//! Dependency-expression evaluator (spec §4.4): a recursive-descent
//! evaluator over `!`, `&`, `|`, `( )` with classic precedence `!` > `&` >
//! `|`, operating on a string in which every symbol name has already been
//! substituted for `0` or `1`.

use std::path::Path;

use crate::error::{LmError, LmResult};
use crate::symtab::SymbolTable;

/// Substitutes every symbol name in `expr` with `1`/`0` per its resolved
/// truthiness in `table`, or fails with `UndefinedSymbol` if some name is
/// not yet declared (spec §4.4's preprocessing rule).
pub fn preprocess(expr: &str, table: &mut SymbolTable, path: &Path, line: usize) -> LmResult<String> {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == '!' || c == '&' || c == '|' || c == '(' || c == ')' {
            out.push(c);
            chars.next();
        } else if c.is_whitespace() {
            out.push(c);
            chars.next();
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '!' || c == '&' || c == '|' || c == '(' || c == ')' || c.is_whitespace() {
                    break;
                }
                name.push(c);
                chars.next();
            }
            match table.find(&name) {
                Some(idx) => out.push(if table.get(idx).is_truthy() { '1' } else { '0' }),
                None => {
                    return Err(LmError::UndefinedSymbol {
                        path: path.to_path_buf(),
                        line,
                        symbol: name,
                    });
                }
            }
        }
    }
    Ok(out)
}

/// Evaluates a preprocessed `0`/`1` boolean expression, returning `true`/
/// `false`. A trailing-junk parse error is reported as `InvalidDepend`.
pub fn evaluate(expr: &str, path: &Path, line: usize, symbol: &str) -> LmResult<bool> {
    let mut parser = ExprParser {
        bytes: expr.as_bytes(),
        pos: 0,
    };
    let result = parser.parse_expr(path, line, symbol)?;
    parser.skip_ws();
    if parser.pos != parser.bytes.len() {
        return Err(invalid_depend(path, line, symbol, "unexpected trailing characters"));
    }
    Ok(result)
}

/// Convenience: evaluate a raw `depends` string end to end. An absent
/// `depends` is equivalent to the constant `1` and is handled by the caller,
/// not here.
pub fn evaluate_depends(
    expr: &str,
    table: &mut SymbolTable,
    path: &Path,
    line: usize,
    symbol: &str,
) -> LmResult<bool> {
    let preprocessed = preprocess(expr, table, path, line)?;
    evaluate(&preprocessed, path, line, symbol)
}

fn invalid_depend(path: &Path, line: usize, symbol: &str, message: &str) -> LmError {
    LmError::InvalidDepend {
        path: path.to_path_buf(),
        line,
        symbol: symbol.to_string(),
        message: message.to_string(),
    }
}

struct ExprParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    // expr := term ( '|' term )*
    fn parse_expr(&mut self, path: &Path, line: usize, symbol: &str) -> LmResult<bool> {
        let mut value = self.parse_term(path, line, symbol)?;
        while self.peek() == Some(b'|') {
            self.pos += 1;
            let rhs = self.parse_term(path, line, symbol)?;
            value = value || rhs;
        }
        Ok(value)
    }

    // term := factor ( '&' factor )*
    fn parse_term(&mut self, path: &Path, line: usize, symbol: &str) -> LmResult<bool> {
        let mut value = self.parse_factor(path, line, symbol)?;
        while self.peek() == Some(b'&') {
            self.pos += 1;
            let rhs = self.parse_factor(path, line, symbol)?;
            value = value && rhs;
        }
        Ok(value)
    }

    // factor := '!' factor | '(' expr ')' | '0' | '1'
    fn parse_factor(&mut self, path: &Path, line: usize, symbol: &str) -> LmResult<bool> {
        match self.peek() {
            Some(b'!') => {
                self.pos += 1;
                Ok(!self.parse_factor(path, line, symbol)?)
            }
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_expr(path, line, symbol)?;
                if self.peek() != Some(b')') {
                    return Err(invalid_depend(path, line, symbol, "expected ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(invalid_depend(path, line, symbol, "expected '0', '1', '!' or '('")),
        }
    }
}

/// A key-string dependency (spec §4.4 / GLOSSARY): the single-term `MACRO`
/// or `MACRO==VALUE` condition attached to `include-$(COND)` and
/// `<KEY>-$(COND) +=` directives. Distinct from the boolean grammar above.
pub fn evaluate_keystring(
    cond: &str,
    table: &mut SymbolTable,
    path: &Path,
    line: usize,
) -> LmResult<bool> {
    if let Some((name, value)) = cond.split_once("==") {
        let name = name.trim();
        let value = value.trim();
        let idx = table.find(name).ok_or_else(|| LmError::UndefinedSymbol {
            path: path.to_path_buf(),
            line,
            symbol: name.to_string(),
        })?;
        Ok(table.get(idx).value.as_deref() == Some(value))
    } else {
        let name = cond.trim();
        let idx = table.find(name).ok_or_else(|| LmError::UndefinedSymbol {
            path: path.to_path_buf(),
            line,
            symbol: name.to_string(),
        })?;
        Ok(table.get(idx).is_truthy())
    }
}
