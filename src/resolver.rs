//! Resolver (spec §4.6): computes each symbol's final value by combining
//! `depends`, user override, default, and first-choice fallback, validating
//! against the declared choice set or numeric range.

use std::path::Path;

use crate::depend;
use crate::error::{ChoiceHelp, LmError, LmResult};
use crate::symtab::{format_number, Symbol, SymbolType, SymbolTable};

/// Resolves the symbol at `idx` in `d` against overrides in `u`. `path` is
/// the file the symbol was declared in, used for error locations.
pub fn resolve(idx: usize, d: &mut SymbolTable, u: &mut SymbolTable, path: &Path) -> LmResult<()> {
    let (name, line, depends) = {
        let s = d.get(idx);
        (s.name.clone(), s.line, s.depends.clone())
    };

    if let Some(expr) = depends {
        let truthy = depend::evaluate_depends(&expr, d, path, line, &name)?;
        if !truthy {
            d.get_mut(idx).value = Some("n".to_string());
            return Ok(());
        }
    }

    let user_value = u.find(&name).map(|uidx| u.get(uidx).value.clone()).flatten();

    match user_value {
        None => {
            let s = d.get(idx);
            if let Some(default) = default_literal(s) {
                validate(d.get(idx), &default, path)?;
                d.get_mut(idx).value = Some(default);
            } else {
                let first = s
                    .choices
                    .first()
                    .cloned()
                    .expect("resolve is only called once choices are populated");
                d.get_mut(idx).value = Some(first);
            }
        }
        Some(ref v) if v == "n" => {
            d.get_mut(idx).value = Some("n".to_string());
        }
        Some(ref v) if v == "'n'" => {
            let s = d.get(idx);
            if !s.choices.iter().any(|c| c == "n") {
                return Err(LmError::InvalidValue {
                    path: path.to_path_buf(),
                    line,
                    symbol: name,
                    help: choice_help(s),
                });
            }
            d.get_mut(idx).value = Some("'n'".to_string());
        }
        Some(v) => {
            validate(d.get(idx), &v, path)?;
            d.get_mut(idx).value = Some(v);
        }
    }

    Ok(())
}

fn default_literal(s: &Symbol) -> Option<String> {
    match s.ty {
        SymbolType::String => s.default_str.clone(),
        SymbolType::Number => s.default_num.map(format_number),
    }
}

/// Validates `value` against `s`'s choices (String: exact match) or range
/// (Number: numeric comparison, per the resolved Open Question that numeric
/// values always compare as parsed floats).
fn validate(s: &Symbol, value: &str, path: &Path) -> LmResult<()> {
    let ok = match s.ty {
        SymbolType::String => s.choices.iter().any(|c| c == value),
        SymbolType::Number => {
            let (min, max) = s.range.expect("Number symbol always has a range");
            match value.parse::<f64>() {
                Ok(x) => x >= min && x <= max,
                Err(_) => false,
            }
        }
    };
    if ok {
        Ok(())
    } else {
        Err(LmError::InvalidValue {
            path: path.to_path_buf(),
            line: s.line,
            symbol: s.name.clone(),
            help: choice_help(s),
        })
    }
}

fn choice_help(s: &Symbol) -> ChoiceHelp {
    match s.ty {
        SymbolType::Number => {
            let (min, max) = s.range.unwrap_or((0.0, 0.0));
            ChoiceHelp::Range(min, max)
        }
        SymbolType::String => ChoiceHelp::List(s.choices.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::Symbol;
    use std::path::Path;

    fn string_symbol(name: &str, choices: &[&str]) -> Symbol {
        let mut s = Symbol::new(name, 1);
        s.ty = SymbolType::String;
        s.choices = choices.iter().map(|c| c.to_string()).collect();
        s
    }

    fn number_symbol(name: &str, min: f64, max: f64) -> Symbol {
        let mut s = Symbol::new(name, 1);
        s.ty = SymbolType::Number;
        s.range = Some((min, max));
        s.choices = vec![min.to_string(), max.to_string()];
        s
    }

    #[test]
    fn first_choice_fallback() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let idx = d.insert(string_symbol("FOO", &["y", "n"]));
        let mut u = SymbolTable::new();
        resolve(idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(idx).value.as_deref(), Some("y"));
    }

    #[test]
    fn disabled_dependency_forces_n() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let foo_idx = d.insert(string_symbol("FOO", &["y", "n"]));
        d.get_mut(foo_idx).value = Some("n".to_string());
        let mut bar = string_symbol("BAR", &["x1", "x2"]);
        bar.depends = Some("FOO".to_string());
        let bar_idx = d.insert(bar);
        let mut u = SymbolTable::new();
        resolve(bar_idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(bar_idx).value.as_deref(), Some("n"));
    }

    #[test]
    fn numeric_default_in_range() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let mut size = number_symbol("SIZE", 1.0, 1024.0);
        size.default_num = Some(256.0);
        let idx = d.insert(size);
        let mut u = SymbolTable::new();
        resolve(idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(idx).value.as_deref(), Some("256"));
    }

    #[test]
    fn numeric_override_out_of_range_is_invalid() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let mut size = number_symbol("SIZE", 1.0, 1024.0);
        size.default_num = Some(256.0);
        let idx = d.insert(size);
        let mut u = SymbolTable::new();
        let mut over = Symbol::new("SIZE", 1);
        over.value = Some("2048".to_string());
        u.insert(over);
        let err = resolve(idx, &mut d, &mut u, path).unwrap_err();
        match err {
            LmError::InvalidValue { help, .. } => {
                assert_eq!(help, ChoiceHelp::Range(1.0, 1024.0));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn numeric_override_fractional_equality() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let idx = d.insert(number_symbol("SIZE", 1.0, 1024.0));
        let mut u = SymbolTable::new();
        let mut over = Symbol::new("SIZE", 1);
        over.value = Some("256.0".to_string());
        u.insert(over);
        resolve(idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(idx).value.as_deref(), Some("256.0"));
    }

    #[test]
    fn user_n_disables_without_validation() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let idx = d.insert(string_symbol("FOO", &["y", "x"]));
        let mut u = SymbolTable::new();
        let mut over = Symbol::new("FOO", 1);
        over.value = Some("n".to_string());
        u.insert(over);
        resolve(idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(idx).value.as_deref(), Some("n"));
    }

    #[test]
    fn user_literal_n_escape() {
        let path = Path::new("lm.cfg");
        let mut d = SymbolTable::new();
        let idx = d.insert(string_symbol("FOO", &["y", "n"]));
        let mut u = SymbolTable::new();
        let mut over = Symbol::new("FOO", 1);
        over.value = Some("'n'".to_string());
        u.insert(over);
        resolve(idx, &mut d, &mut u, path).unwrap();
        assert_eq!(d.get(idx).value.as_deref(), Some("'n'"));
    }
}
