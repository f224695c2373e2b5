//! CLI flag surface (spec §6), declared with `clap`'s derive API. The
//! parsing library is an external collaborator per spec §1, but the flag
//! surface itself — names, defaults, effects — is a required, functional
//! part of this crate, grounded verbatim on
//! `original_source/source/main.c`'s static option defaults and
//! `cmd_long_options` table.

use std::path::PathBuf;

use clap::Parser;

/// Printed by `-V`/`--version`: spec §6 requires the version line to carry
/// the license line alongside it, not just a bare version number.
pub const VERSION_LINE: &str = concat!(env!("CARGO_PKG_VERSION"), "\nMIT License");

#[derive(Debug, Parser)]
#[command(name = "lm", version = VERSION_LINE, about = "Kconfig-style build configuration tool for C/C++ projects")]
pub struct Cli {
    /// Print build-variable syntax reference; exit 0.
    #[arg(long)]
    pub flag: bool,

    /// Top `lm.cfg` file.
    #[arg(long, default_value = "lm.cfg")]
    pub lmcfg: PathBuf,

    /// User config file.
    #[arg(long, default_value = ".config")]
    pub projcfg: PathBuf,

    /// Output header path.
    #[arg(long, default_value = "config.h")]
    pub out: PathBuf,

    /// Output makefile-include path.
    #[arg(long, default_value = ".lm.mk")]
    pub mk: PathBuf,

    /// Pool size in MB. Accepted for CLI compatibility; has no effect —
    /// this crate has no fixed-size allocator pool.
    #[arg(long)]
    pub mem: Option<u64>,

    /// Suppress the final summary table.
    #[arg(long)]
    pub blind: bool,

    /// Emit top `Makefile` to PATH (skips header and `.lm.mk` emission, and
    /// the initial `.config` read — see SPEC_FULL.md's SUPPLEMENTED note).
    #[arg(long)]
    pub gen: Option<PathBuf>,

    /// Project name embedded in the Makefile.
    #[arg(long, default_value = "demo")]
    pub project: String,

    /// Build directory embedded in the Makefile.
    #[arg(long, default_value = "build")]
    pub build: String,

    /// Cross-compiler prefix embedded in the Makefile.
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Delete file or directory non-recursively (one level) and exit.
    #[arg(long)]
    pub rm: Option<PathBuf>,

    /// Copy one file and exit. Takes exactly two positional-like values.
    #[arg(long, num_args = 2, value_names = ["SRC", "DST"])]
    pub cp: Option<Vec<PathBuf>>,
}

/// Printed by `--flag`, grounded on `original_source/source/main.c`'s
/// `show_key_usage`.
pub const FLAG_REFERENCE: &str = "\
Build-variable directives (used inside lm.cfg):
  SRC[-$(COND)]     += file.c ...   C source files (supports *.c, dir/*.c)
  PATH[-$(COND)]     += dir ...      include search paths (-I)
  DEFINE[-$(COND)]   += NAME ...     preprocessor defines (-D)
  ASM[-$(COND)]      += file.S ...   assembly sources
  LDS[-$(COND)]      += file.lds ... linker scripts
  MCFLAG[-$(COND)]   += ...          raw machine-code flags
  ASFLAG[-$(COND)]   += ...          raw assembler flags
  CFLAG[-$(COND)]    += ...          raw C compiler flags
  CPPFLAG[-$(COND)]  += ...          raw C preprocessor flags
  LDFLAG[-$(COND)]   += ...          raw linker flags
  LIB[-$(COND)]      += name ...     libraries to link (-l)
  LIBPATH[-$(COND)]  += dir ...      library search paths (-L)

Symbol blocks:
  NAME
      choices = y, n
      default = y
      depends = OTHER_NAME
";
