//! The single owned run-context value (spec §9 Design Notes: "Global
//! mutable state... should be encapsulated as a single owned session value
//! threaded through the parser; no process-wide singletons"). Holds both
//! symbol tables and all variable lists for one invocation of the tool.

use crate::symtab::SymbolTable;

/// The fixed set of build-variable lists (spec §3, §4.7). `c_object` is
/// always empty (see SPEC_FULL.md §3 / DESIGN.md): the original's thirteenth
/// list slot has no populating directive, carried here only for structural
/// parity.
#[derive(Debug, Default)]
pub struct VariableLists {
    pub c_source: Vec<String>,
    pub c_object: Vec<String>,
    pub c_path: Vec<String>,
    pub c_define: Vec<String>,
    pub asm_source: Vec<String>,
    pub lds_source: Vec<String>,
    pub mc_flag: Vec<String>,
    pub as_flag: Vec<String>,
    pub c_flag: Vec<String>,
    pub cpp_flag: Vec<String>,
    pub ld_flag: Vec<String>,
    pub lib_name: Vec<String>,
    pub lib_path: Vec<String>,
}

impl VariableLists {
    /// Fixed emitter names paired with their list, in the order `.lm.mk`
    /// emits them (spec §4.7).
    pub fn named(&self) -> [(&'static str, &Vec<String>); 13] {
        [
            ("C_SOURCE", &self.c_source),
            ("C_OBJECT", &self.c_object),
            ("C_PATH", &self.c_path),
            ("C_DEFINE", &self.c_define),
            ("ASM_SOURCE", &self.asm_source),
            ("LDS_SOURCE", &self.lds_source),
            ("MC_FLAG", &self.mc_flag),
            ("AS_FLAG", &self.as_flag),
            ("C_FLAG", &self.c_flag),
            ("CPP_FLAG", &self.cpp_flag),
            ("LD_FLAG", &self.ld_flag),
            ("LIB_NAME", &self.lib_name),
            ("LIB_PATH", &self.lib_path),
        ]
    }
}

/// Project metadata embedded in the generated `Makefile` (spec §6:
/// `--project`, `--build`, `--prefix`).
#[derive(Debug, Clone)]
pub struct ProjectMeta {
    pub project_name: String,
    pub build_dir: String,
    pub prefix: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        ProjectMeta {
            project_name: "demo".to_string(),
            build_dir: "build".to_string(),
            prefix: String::new(),
        }
    }
}

/// Everything a single run of the tool owns: the declared symbol table D,
/// the user-override table U, the variable lists, and the project metadata
/// used only by `--gen`.
#[derive(Debug, Default)]
pub struct Session {
    pub d: SymbolTable,
    pub u: SymbolTable,
    pub lists: VariableLists,
    pub meta: ProjectMeta,
}

impl Session {
    pub fn new(u: SymbolTable) -> Self {
        Session {
            d: SymbolTable::new(),
            u,
            lists: VariableLists::default(),
            meta: ProjectMeta::default(),
        }
    }
}
