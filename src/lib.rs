//! Core library for `lm`, a Kconfig-style build configuration tool for
//! C/C++ projects. `src/main.rs` is a thin CLI driver over this library;
//! everything that matters — the configuration language, the dependency
//! evaluator, the resolver — lives here and is unit/integration tested
//! independent of the CLI surface.

pub mod cli;
pub mod depend;
pub mod emit;
pub mod error;
pub mod fs;
pub mod gen;
pub mod lex;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod symtab;
pub mod userconfig;
