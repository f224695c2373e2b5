//! Mechanical text emission of `config.h`, `.lm.mk`, and `Makefile`
//! (spec §1: "Makefile text emission... specified only as a contract the
//! core exposes"). Kept deliberately thin: this is string formatting over
//! `emit::ResolvedModel`, not engineering. The function contracts are
//! grounded in `original_source/source/lm_gen.h` (`lm_gen_header_file`,
//! `lm_gen_lmmk_file`, `lm_gen_projcfg_file`, `lm_gen_mkfile_file`); their
//! C bodies were not present in the retrieved pack, so the bodies here are
//! an original but faithful-to-contract rendition.

use std::io::{self, Write};

use crate::emit::{classify, EmitValue, ResolvedModel};
use crate::session::ProjectMeta;

/// Writes `config.h`: per-symbol `#define` lines inside an include guard.
pub fn write_header(model: &ResolvedModel, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "#ifndef __CONFIG_H__")?;
    writeln!(out, "#define __CONFIG_H__")?;
    writeln!(out)?;
    for symbol in model.symbols() {
        match classify(symbol) {
            Some(EmitValue::NotSet) => writeln!(out, "// {} is not set", symbol.name)?,
            Some(EmitValue::Enabled) => writeln!(out, "#define {} 1", symbol.name)?,
            Some(EmitValue::LiteralN) => writeln!(out, "#define {} n", symbol.name)?,
            Some(EmitValue::Disabled) => {}
            Some(EmitValue::Other(v)) => writeln!(out, "#define {} {v}", symbol.name)?,
            None => {}
        }
    }
    writeln!(out)?;
    writeln!(out, "#endif //__CONFIG_H__")?;
    Ok(())
}

/// Writes `.lm.mk`: symbol definitions followed by non-empty `<VAR> :=
/// <values>` lines.
pub fn write_lmmk(model: &ResolvedModel, out: &mut impl Write) -> io::Result<()> {
    for symbol in model.symbols() {
        match classify(symbol) {
            Some(EmitValue::NotSet) => {}
            Some(EmitValue::Enabled) => writeln!(out, "{} = y", symbol.name)?,
            Some(EmitValue::LiteralN) => writeln!(out, "{} = 'n'", symbol.name)?,
            Some(EmitValue::Disabled) => writeln!(out, "{} = n", symbol.name)?,
            Some(EmitValue::Other(v)) => writeln!(out, "{} = {v}", symbol.name)?,
            None => {}
        }
    }
    for (name, values) in model.lists().named() {
        if !values.is_empty() {
            writeln!(out, "{name} := {}", values.join(" "))?;
        }
    }
    Ok(())
}

/// Writes a top-level `Makefile` wired to the `.lm.mk` variables (spec §6
/// `--gen`). Embeds the project name, build directory, and cross-compiler
/// prefix.
pub fn write_makefile(meta: &ProjectMeta, mk_path: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "# generated by lm --gen; do not edit by hand")?;
    writeln!(out, "PROJECT := {}", meta.project_name)?;
    writeln!(out, "BUILD_DIR := {}", meta.build_dir)?;
    writeln!(out, "CROSS_COMPILE := {}", meta.prefix)?;
    writeln!(out)?;
    writeln!(out, "include {mk_path}")?;
    writeln!(out)?;
    writeln!(out, "CC := $(CROSS_COMPILE)gcc")?;
    writeln!(out, "AS := $(CROSS_COMPILE)as")?;
    writeln!(out, "LD := $(CROSS_COMPILE)ld")?;
    writeln!(out)?;
    writeln!(out, "OBJS := $(C_SOURCE:.c=.o) $(ASM_SOURCE:.S=.o)")?;
    writeln!(out)?;
    writeln!(out, "all: $(BUILD_DIR)/{}", meta.project_name)?;
    writeln!(out)?;
    writeln!(
        out,
        "$(BUILD_DIR)/{}: $(OBJS)\n\t@mkdir -p $(BUILD_DIR)\n\t$(CC) $(LD_FLAG) -o $@ $(OBJS) $(LIB_PATH) $(LIB_NAME)",
        meta.project_name
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "%.o: %.c\n\t$(CC) $(C_FLAG) $(CPP_FLAG) $(C_DEFINE) $(C_PATH) -c -o $@ $<"
    )?;
    Ok(())
}

/// Writes a `.config`-compatible template from a resolved model (used after
/// `--gen`, per `lm_gen_projcfg_file`): one `NAME=VALUE` line per resolved,
/// non-disabled symbol. This also backs the round-trip testable property
/// in spec §8 (emit `.lm.mk`, reparse as `.config`).
pub fn write_projcfg(model: &ResolvedModel, out: &mut impl Write) -> io::Result<()> {
    for symbol in model.symbols() {
        if let Some(value) = &symbol.value {
            writeln!(out, "{}={value}", symbol.name)?;
        }
    }
    Ok(())
}

/// Plain, uncolored `name = value` summary table (spec §6 `--blind`
/// suppresses this). Colored terminal boxes are explicitly out of scope
/// per spec §1; this prints the same information without ANSI sequences.
pub fn write_summary(model: &ResolvedModel, out: &mut impl Write) -> io::Result<()> {
    for symbol in model.symbols() {
        if let Some(value) = &symbol.value {
            writeln!(out, "{} = {value}", symbol.name)?;
        }
    }
    Ok(())
}
