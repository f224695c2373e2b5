//! Declaration parser (spec §4.5): reads the `lm.cfg` tree, recognizing
//! `include` directives, build-variable directives, and symbol blocks with
//! `choices`/`default`/`depends` attributes. Each symbol is resolved (§4.6)
//! the moment its block closes.
//!
//! Architecturally this plays the role the teacher's `parser.rs` plays for
//! Kconfig: a hand-written recursive-descent reader driven line-by-line with
//! an explicit "current open block" state machine. The grammar recognized
//! here has nothing in common with Kconfig's `config`/`menu`/`if` keywords —
//! see SPEC_FULL.md §4.5 for the grounding note on why include recursion is
//! expressed by loading whole files into memory rather than reopening a
//! stream handle mid-iteration.

use std::path::{Path, PathBuf};

use crate::depend;
use crate::error::{LmError, LmResult};
use crate::fs::{self, Fs};
use crate::lex::{self, head_is_four_space, is_block_terminator, trim_head_tail};
use crate::resolver;
use crate::session::Session;
use crate::symtab::{format_number, Symbol, SymbolType};

/// Parses `rel_path` (joined to `base`) into `session`, recursing into
/// `include`d files. This is the entry point for both the top `lm.cfg` and
/// every included file.
pub fn parse_file(session: &mut Session, fs: &impl Fs, base: &Path, rel_path: &str) -> LmResult<()> {
    let full_path = fs::join(base, rel_path);
    let text = fs.read_to_string(&full_path)?;
    let raw_lines: Vec<&str> = text.lines().collect();

    let new_base = full_path
        .parent()
        .map(|p| if p.as_os_str().is_empty() { PathBuf::from(".") } else { p.to_path_buf() })
        .unwrap_or_else(|| PathBuf::from("."));

    let mut i = 0usize;
    let mut open_symbol: Option<usize> = None;

    while i < raw_lines.len() {
        let (logical_line, consumed) = join_continuation(&raw_lines, i);
        let lineno = i + 1;
        i += consumed;

        if is_block_terminator(&logical_line) {
            if let Some(idx) = open_symbol.take() {
                close_symbol(session, &full_path, idx)?;
            }
            continue;
        }

        if head_is_four_space(&logical_line) {
            if let Some(idx) = open_symbol {
                apply_attribute(session, &full_path, idx, &logical_line[4..])?;
                continue;
            }
        }

        // A non-attribute line at column 0 terminates whatever block was
        // open (choices must already be present or it's a hard error).
        if let Some(idx) = open_symbol.take() {
            close_symbol(session, &full_path, idx)?;
        }

        if let Some((cond, inc_path)) = parse_include(&full_path, lineno, &logical_line)? {
            let gated = match cond {
                Some(cond) => depend::evaluate_keystring(&cond, &mut session.d, &full_path, lineno)?,
                None => true,
            };
            if gated {
                parse_file(session, fs, &new_base, &inc_path)?;
            }
            continue;
        }

        if let Some((key, cond, rhs)) = parse_directive(&full_path, lineno, &logical_line)? {
            let gated = match cond {
                Some(cond) => depend::evaluate_keystring(&cond, &mut session.d, &full_path, lineno)?,
                None => true,
            };
            if gated {
                apply_directive(session, fs, &full_path, lineno, &new_base, key, rhs)?;
            }
            continue;
        }

        // Otherwise this must be a bare symbol-opening token.
        let tokens = lex::tokenize(&logical_line);
        if tokens.len() != 1 || tokens[0].contains('=') || tokens[0] == "include" {
            return Err(syntax(&full_path, lineno, "unrecognized line"));
        }
        open_symbol = Some(session.d.insert(Symbol::new(tokens[0].clone(), lineno)));
    }

    if let Some(idx) = open_symbol.take() {
        close_symbol(session, &full_path, idx)?;
    }

    Ok(())
}

/// Joins a trailing-backslash continued logical line starting at
/// `raw_lines[i]`, returning the joined text and the number of raw lines
/// consumed.
fn join_continuation(raw_lines: &[&str], i: usize) -> (String, usize) {
    let mut out = raw_lines[i].to_string();
    let mut consumed = 1;
    while lex::has_continuation(&out) {
        out = lex::strip_continuation(&out).to_string();
        if i + consumed >= raw_lines.len() {
            break;
        }
        out.push_str(trim_head_tail(raw_lines[i + consumed]));
        consumed += 1;
    }
    (out, consumed)
}

fn close_symbol(session: &mut Session, path: &Path, idx: usize) -> LmResult<()> {
    if session.d.get(idx).choices.is_empty() {
        return Err(LmError::MissingChoice {
            path: path.to_path_buf(),
            line: session.d.get(idx).line,
            symbol: session.d.get(idx).name.clone(),
        });
    }
    resolver::resolve(idx, &mut session.d, &mut session.u, path)
}

fn syntax(path: &Path, line: usize, message: &str) -> LmError {
    LmError::Syntax {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}

/// Recognizes `include "path"` / `include-$(COND) "path"`. Returns
/// `Ok(None)` if the line is not an include directive at all, an error if it
/// looks like one but is malformed.
fn parse_include(path: &Path, line: usize, text: &str) -> LmResult<Option<(Option<String>, String)>> {
    let trimmed = trim_head_tail(text);
    if !trimmed.starts_with("include") {
        return Ok(None);
    }
    let rest = &trimmed["include".len()..];
    let (cond, path_part) = if let Some(rest) = rest.strip_prefix("-$(") {
        let Some(close) = rest.find(')') else {
            return Err(syntax(path, line, "unterminated '-$(' on include directive"));
        };
        (Some(rest[..close].to_string()), &rest[close + 1..])
    } else if rest.starts_with(' ') || rest.is_empty() {
        (None, rest)
    } else {
        // e.g. a symbol literally named "includefoo" — not our keyword.
        return Ok(None);
    };

    if trimmed.matches('"').count() % 2 != 0 {
        return Err(syntax(path, line, "unterminated quote in include directive"));
    }

    // "include \"path\"" is exactly two tokens: the keyword and a double-quoted
    // path. lex::quote_extract pulls the path out directly (double quotes only,
    // matching the grammar); anything other than surrounding whitespace around
    // the quoted region is a malformed directive.
    let Some(quote_start) = path_part.find('"') else {
        return Err(syntax(path, line, "expected 'include \"path\"'"));
    };
    let inc_path = lex::quote_extract(path_part).expect("quote_start implies a matched pair, checked above");
    let after_quote = quote_start + 1 + inc_path.len() + 1;
    if !trim_head_tail(&path_part[..quote_start]).is_empty() || !trim_head_tail(&path_part[after_quote..]).is_empty() {
        return Err(syntax(path, line, "expected 'include \"path\"'"));
    }
    Ok(Some((cond, inc_path.to_string())))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarKey {
    Src,
    Path,
    Define,
    Asm,
    Lds,
    McFlag,
    AsFlag,
    CFlag,
    CppFlag,
    LdFlag,
    Lib,
    LibPath,
}

impl VarKey {
    fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "SRC" => VarKey::Src,
            "PATH" => VarKey::Path,
            "DEFINE" => VarKey::Define,
            "ASM" => VarKey::Asm,
            "LDS" => VarKey::Lds,
            "MCFLAG" => VarKey::McFlag,
            "ASFLAG" => VarKey::AsFlag,
            "CFLAG" => VarKey::CFlag,
            "CPPFLAG" => VarKey::CppFlag,
            "LDFLAG" => VarKey::LdFlag,
            "LIB" => VarKey::Lib,
            "LIBPATH" => VarKey::LibPath,
            _ => return None,
        })
    }

    /// Whether this key's operand is one raw, unsplit string (the flag
    /// keys, spec §4.5 table) rather than a list of whitespace tokens.
    fn is_raw_flag(self) -> bool {
        matches!(
            self,
            VarKey::McFlag | VarKey::AsFlag | VarKey::CFlag | VarKey::CppFlag | VarKey::LdFlag
        )
    }
}

/// Recognizes `<KEY>[-$(COND)] += <values>`. Returns `Ok(None)` if the line
/// is not a directive at all (no recognized key prefix before `+=`).
fn parse_directive(path: &Path, line: usize, text: &str) -> LmResult<Option<(VarKey, Option<String>, String)>> {
    let Some(op_pos) = text.find("+=") else {
        return Ok(None);
    };
    let left = trim_head_tail(&text[..op_pos]);
    let rhs = text[op_pos + 2..].to_string();

    let (key_str, cond) = if let Some(dash) = left.find("-$(") {
        let key_str = &left[..dash];
        let cond_part = &left[dash + 3..];
        let Some(close) = cond_part.find(')') else {
            return Err(syntax(path, line, "unterminated '-$(' on build-variable directive"));
        };
        (key_str, Some(cond_part[..close].to_string()))
    } else {
        (left, None)
    };

    let Some(key) = VarKey::from_str(key_str) else {
        return Ok(None);
    };
    Ok(Some((key, cond, rhs)))
}

fn apply_directive(
    session: &mut Session,
    fs: &impl Fs,
    path: &Path,
    line: usize,
    base: &Path,
    key: VarKey,
    rhs: String,
) -> LmResult<()> {
    if key.is_raw_flag() {
        let value = expand_value(&mut session.d, path, line, trim_head_tail(&rhs))?;
        push_flag(&mut session.lists, key, value);
        return Ok(());
    }

    for raw_token in lex::tokenize(&rhs) {
        let token = expand_value(&mut session.d, path, line, &raw_token)?;
        match key {
            VarKey::Src => {
                if is_wildcard_token(&token) {
                    let dir_part = token.strip_suffix("*.c").unwrap_or("").trim_end_matches('/');
                    let dir = if dir_part.is_empty() {
                        base.to_path_buf()
                    } else {
                        fs::join(base, dir_part)
                    };
                    for name in fs.glob_c_files(&dir)? {
                        let joined = if dir_part.is_empty() {
                            name
                        } else {
                            format!("{dir_part}/{name}")
                        };
                        session.lists.c_source.push(base_join_src(base, &joined));
                    }
                } else if token.contains('*') {
                    return Err(syntax(
                        path,
                        line,
                        &format!("unsupported wildcard '{token}' (only '*.c' and 'dir/*.c' are accepted)"),
                    ));
                } else {
                    session.lists.c_source.push(base_join_src(base, &token));
                }
            }
            VarKey::Path => {
                let flag = if token == "." || token == "./" {
                    format!("-I{}", base.display())
                } else {
                    format!("-I{}", base_join_src(base, &token))
                };
                session.lists.c_path.push(flag);
            }
            VarKey::Define => session.lists.c_define.push(format!("-D{token}")),
            VarKey::Asm => session.lists.asm_source.push(base_join_src(base, &token)),
            VarKey::Lds => session.lists.lds_source.push(base_join_src(base, &token)),
            VarKey::Lib => session.lists.lib_name.push(format!("-l{token}")),
            VarKey::LibPath => session.lists.lib_path.push(format!("-L{}", base_join_src(base, &token))),
            VarKey::McFlag | VarKey::AsFlag | VarKey::CFlag | VarKey::CppFlag | VarKey::LdFlag => {
                unreachable!("raw flag keys are handled above")
            }
        }
    }
    Ok(())
}

fn push_flag(lists: &mut crate::session::VariableLists, key: VarKey, value: String) {
    match key {
        VarKey::McFlag => lists.mc_flag.push(value),
        VarKey::AsFlag => lists.as_flag.push(value),
        VarKey::CFlag => lists.c_flag.push(value),
        VarKey::CppFlag => lists.cpp_flag.push(value),
        VarKey::LdFlag => lists.ld_flag.push(value),
        _ => unreachable!("push_flag only called for flag keys"),
    }
}

/// Expands `$(NAME)` occurrences in a directive's raw string value against
/// the current table D (spec §4.1). An unterminated `$(` is a syntax error
/// at the directive's own line.
fn expand_value(d: &mut crate::symtab::SymbolTable, path: &Path, line: usize, raw: &str) -> LmResult<String> {
    lex::expand_macros(raw, |name| d.find(name).and_then(|idx| d.get(idx).value.clone()))
        .map_err(|message| syntax(path, line, &message))
}

fn is_wildcard_token(token: &str) -> bool {
    token == "*.c" || (token.ends_with("/*.c") && !token.contains("**"))
}

fn base_join_src(base: &Path, token: &str) -> String {
    if base == Path::new(".") {
        token.to_string()
    } else {
        format!("{}/{}", base.display(), token)
    }
}

fn apply_attribute(session: &mut Session, path: &Path, idx: usize, attr_line: &str) -> LmResult<()> {
    let Some(eq_pos) = attr_line.find('=') else {
        return Err(syntax(path, session.d.get(idx).line, "expected 'name = value' attribute"));
    };
    let attr_name = trim_head_tail(&attr_line[..eq_pos]);
    let attr_value = &attr_line[eq_pos + 1..];

    match attr_name {
        "choices" => apply_choices(session, path, idx, attr_value),
        "default" => apply_default(session, path, idx, attr_value),
        "depends" => {
            session.d.get_mut(idx).depends = Some(trim_head_tail(attr_value).to_string());
            Ok(())
        }
        other => Err(syntax(path, session.d.get(idx).line, &format!("unknown attribute '{other}'"))),
    }
}

fn apply_choices(session: &mut Session, path: &Path, idx: usize, raw: &str) -> LmResult<()> {
    let trimmed = trim_head_tail(raw);
    let line = session.d.get(idx).line;

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(syntax(path, line, "range 'choices' must have exactly two endpoints"));
        }
        let min: f64 = parts[0].parse().map_err(|_| syntax(path, line, "invalid range endpoint"))?;
        let max: f64 = parts[1].parse().map_err(|_| syntax(path, line, "invalid range endpoint"))?;
        let symbol = session.d.get_mut(idx);
        symbol.ty = SymbolType::Number;
        symbol.range = Some((min, max));
        symbol.choices = vec![format_number(min), format_number(max)];
        return Ok(());
    }

    let entries = split_top_level(trimmed, ',');
    let mut choices = Vec::with_capacity(entries.len());
    for entry in entries {
        choices.push(unwrap_literal(entry.trim()));
    }
    let symbol = session.d.get_mut(idx);
    symbol.ty = SymbolType::String;
    symbol.choices = choices;
    Ok(())
}

fn apply_default(session: &mut Session, path: &Path, idx: usize, raw: &str) -> LmResult<()> {
    let literal = unwrap_literal(trim_head_tail(raw));
    let line = session.d.get(idx).line;
    let ty = session.d.get(idx).ty;

    match ty {
        SymbolType::Number => {
            let value: f64 = literal
                .parse()
                .map_err(|_| syntax(path, line, "default value is not a number"))?;
            let (min, max) = session
                .d
                .get(idx)
                .range
                .expect("Number symbol has range once choices has been parsed");
            if value < min || value > max {
                return Err(LmError::InvalidValue {
                    path: path.to_path_buf(),
                    line,
                    symbol: session.d.get(idx).name.clone(),
                    help: crate::error::ChoiceHelp::Range(min, max),
                });
            }
            session.d.get_mut(idx).default_num = Some(value);
        }
        SymbolType::String => {
            let valid = session.d.get(idx).choices.iter().any(|c| c == &literal);
            if !valid {
                let choices = session.d.get(idx).choices.clone();
                return Err(LmError::InvalidValue {
                    path: path.to_path_buf(),
                    line,
                    symbol: session.d.get(idx).name.clone(),
                    help: crate::error::ChoiceHelp::List(choices),
                });
            }
            session.d.get_mut(idx).default_str = Some(literal);
        }
    }
    Ok(())
}

/// Strips a single layer of quoting (`"..."`, `'...'`, or `{...}`) from a
/// choice/default literal, leaving bare tokens untouched.
fn unwrap_literal(s: &str) -> String {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') || (first == b'{' && last == b'}') {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

/// Splits `s` on `sep` at top level only — not inside `'...'`, `"..."`, or
/// `{...}` regions — used for comma-separated `choices` lists.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for c in s.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    current.push(c);
                } else if c == '{' {
                    depth += 1;
                    current.push(c);
                } else if c == '}' {
                    depth -= 1;
                    current.push(c);
                } else if c == sep && depth == 0 {
                    out.push(std::mem::take(&mut current));
                } else {
                    current.push(c);
                }
            }
        }
    }
    if !current.is_empty() || !out.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// An in-memory filesystem fake for parser tests, grounded in the
    /// ambient-stack decision to make the parser generic over `Fs`.
    struct FakeFs {
        files: HashMap<PathBuf, String>,
        dirs: HashMap<PathBuf, Vec<String>>,
    }

    impl Fs for FakeFs {
        fn read_to_string(&self, path: &Path) -> LmResult<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| LmError::MissingFile { path: path.to_path_buf() })
        }

        fn glob_c_files(&self, dir: &Path) -> LmResult<Vec<String>> {
            Ok(self.dirs.get(dir).cloned().unwrap_or_default())
        }
    }

    fn fake(files: &[(&str, &str)]) -> FakeFs {
        let mut map = HashMap::new();
        for (path, contents) in files {
            map.insert(PathBuf::from(path), contents.to_string());
        }
        FakeFs { files: map, dirs: HashMap::new() }
    }

    #[test]
    fn disabled_dependency_scenario() {
        let fs = fake(&[(
            "lm.cfg",
            "FOO\n    choices = y, n\nBAR\n    choices = x1, x2\n    depends = FOO\n",
        )]);
        let mut u = crate::symtab::SymbolTable::new();
        let mut foo = Symbol::new("FOO", 1);
        foo.value = Some("n".to_string());
        u.insert(foo);
        let mut session = Session::new(u);
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        let foo = session.d.find("FOO").unwrap();
        let bar = session.d.find("BAR").unwrap();
        assert_eq!(session.d.get(foo).value.as_deref(), Some("n"));
        assert_eq!(session.d.get(bar).value.as_deref(), Some("n"));
    }

    #[test]
    fn first_choice_fallback_scenario() {
        let fs = fake(&[(
            "lm.cfg",
            "FOO\n    choices = y, n\nBAR\n    choices = x1, x2\n    depends = FOO\n",
        )]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        let foo = session.d.find("FOO").unwrap();
        let bar = session.d.find("BAR").unwrap();
        assert_eq!(session.d.get(foo).value.as_deref(), Some("y"));
        assert_eq!(session.d.get(bar).value.as_deref(), Some("x1"));
    }

    #[test]
    fn numeric_range_with_default_scenario() {
        let fs = fake(&[("lm.cfg", "SIZE\n    choices = [1, 1024]\n    default = 256\n")]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        let size = session.d.find("SIZE").unwrap();
        assert_eq!(session.d.get(size).value.as_deref(), Some("256"));
    }

    #[test]
    fn invalid_user_value_scenario() {
        let fs = fake(&[("lm.cfg", "SIZE\n    choices = [1, 1024]\n    default = 256\n")]);
        let mut u = crate::symtab::SymbolTable::new();
        let mut over = Symbol::new("SIZE", 1);
        over.value = Some("2048".to_string());
        u.insert(over);
        let mut session = Session::new(u);
        let err = parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap_err();
        assert!(matches!(err, LmError::InvalidValue { .. }));
    }

    #[test]
    fn conditional_source_list_scenario_enabled() {
        let fs = fake(&[
            ("lm.cfg", "FEAT\n    choices = y, n\ninclude \"sub/lm.cfg\"\n"),
            ("sub/lm.cfg", "SRC-$(FEAT) += impl.c\n"),
        ]);
        let mut u = crate::symtab::SymbolTable::new();
        let mut feat = Symbol::new("FEAT", 1);
        feat.value = Some("y".to_string());
        u.insert(feat);
        let mut session = Session::new(u);
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        assert_eq!(session.lists.c_source, vec!["sub/impl.c".to_string()]);
    }

    #[test]
    fn conditional_source_list_scenario_disabled() {
        let fs = fake(&[
            ("lm.cfg", "FEAT\n    choices = y, n\ninclude \"sub/lm.cfg\"\n"),
            ("sub/lm.cfg", "SRC-$(FEAT) += impl.c\n"),
        ]);
        let mut u = crate::symtab::SymbolTable::new();
        let mut feat = Symbol::new("FEAT", 1);
        feat.value = Some("n".to_string());
        u.insert(feat);
        let mut session = Session::new(u);
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        assert!(session.lists.c_source.is_empty());
    }

    #[test]
    fn undefined_symbol_in_depends_scenario() {
        let fs = fake(&[("lm.cfg", "A\n    choices = y,n\n    depends = ZZ\n")]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        let err = parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap_err();
        match err {
            LmError::UndefinedSymbol { symbol, .. } => assert_eq!(symbol, "ZZ"),
            other => panic!("expected UndefinedSymbol, got {other:?}"),
        }
    }

    #[test]
    fn missing_choice_is_hard_error() {
        let fs = fake(&[("lm.cfg", "A\nB\n    choices = y, n\n")]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        let err = parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap_err();
        assert!(matches!(err, LmError::MissingChoice { .. }));
    }

    #[test]
    fn empty_file_parses_to_nothing() {
        let fs = fake(&[("lm.cfg", "")]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        assert!(session.d.is_empty());
    }

    #[test]
    fn macro_expansion_in_directive_values() {
        let fs = fake(&[(
            "lm.cfg",
            "ARCH\n    choices = arm, x86\n    default = arm\nSRC += $(ARCH)/boot.c\nDEFINE += VER=$(ARCH)\n",
        )]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap();
        assert_eq!(session.lists.c_source, vec!["arm/boot.c".to_string()]);
        assert_eq!(session.lists.c_define, vec!["-DVER=arm".to_string()]);
    }

    #[test]
    fn unterminated_macro_in_directive_is_syntax_error() {
        let fs = fake(&[("lm.cfg", "DEFINE += VER=$(ARCH\n")]);
        let mut session = Session::new(crate::symtab::SymbolTable::new());
        let err = parse_file(&mut session, &fs, Path::new("."), "lm.cfg").unwrap_err();
        assert!(matches!(err, LmError::Syntax { .. }));
    }
}
