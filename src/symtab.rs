//! Symbol table: an insertion-ordered sequence of symbol records plus a
//! small evict-least-used lookup cache (spec §3, §4.2). The cache is a pure
//! speedup — `find` always falls back to a correct linear scan on a miss, so
//! disabling or resizing it can never change a resolved value.

use std::collections::HashMap;

const CACHE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    String,
    Number,
}

/// A declared or user-override symbol record (spec §3).
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: SymbolType,
    pub choices: Vec<String>,
    pub range: Option<(f64, f64)>,
    pub default_str: Option<String>,
    pub default_num: Option<f64>,
    pub depends: Option<String>,
    pub value: Option<String>,
    /// Source location of the declaration, used for error messages.
    pub line: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Symbol {
            name: name.into(),
            ty: SymbolType::String,
            choices: Vec::new(),
            range: None,
            default_str: None,
            default_num: None,
            depends: None,
            value: None,
            line,
        }
    }

    /// A symbol is "truthy" for dependency evaluation when its value is set
    /// and not one of the disabled/blank sentinels (spec §4.4).
    pub fn is_truthy(&self) -> bool {
        matches!(self.value.as_deref(), Some(v) if v != "n" && v != " ")
    }
}

/// Formats a float the way the resolver renders a Number default or choice
/// endpoint: integral values print without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Ordered symbol storage with a small evict-least-used cache over name
/// lookups (spec §4.2).
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
    cache: Vec<CacheSlot>,
}

#[derive(Debug, Clone)]
struct CacheSlot {
    name: String,
    index: usize,
    hits: u64,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: Vec::new(),
            by_name: HashMap::new(),
            cache: Vec::with_capacity(CACHE_SIZE),
        }
    }

    /// Appends a fresh record and returns its stable index handle.
    pub fn insert(&mut self, symbol: Symbol) -> usize {
        let idx = self.symbols.len();
        self.by_name.insert(symbol.name.clone(), idx);
        self.symbols.push(symbol);
        idx
    }

    pub fn get(&self, idx: usize) -> &Symbol {
        &self.symbols[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Symbol {
        &mut self.symbols[idx]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Consults the cache, then falls back to the authoritative `by_name`
    /// map (which is itself a correctness-preserving substitute for the
    /// original's linear scan — see the module doc comment). Promotes the
    /// found slot into the cache on a miss.
    pub fn find(&mut self, name: &str) -> Option<usize> {
        if let Some(slot) = self.cache.iter_mut().find(|s| s.name == name) {
            slot.hits += 1;
            return Some(slot.index);
        }
        let idx = *self.by_name.get(name)?;
        self.update_cache(name, idx);
        Some(idx)
    }

    fn update_cache(&mut self, name: &str, idx: usize) {
        if self.cache.len() < CACHE_SIZE {
            self.cache.push(CacheSlot {
                name: name.to_string(),
                index: idx,
                hits: 1,
            });
            return;
        }
        let victim = self
            .cache
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.hits)
            .map(|(i, _)| i)
            .expect("cache is non-empty");
        self.cache[victim] = CacheSlot {
            name: name.to_string(),
            index: idx,
            hits: 1,
        };
    }

    /// Yields records in insertion order (used by the emitter, spec §4.7).
    pub fn iterate(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::new("A", 1));
        table.insert(Symbol::new("B", 2));
        assert_eq!(table.find("A"), Some(0));
        assert_eq!(table.find("B"), Some(1));
        assert_eq!(table.find("C"), None);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut table = SymbolTable::new();
        for name in ["Z", "A", "M"] {
            table.insert(Symbol::new(name, 0));
        }
        let names: Vec<_> = table.iterate().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A", "M"]);
    }

    #[test]
    fn cache_eviction_never_breaks_lookup() {
        let mut table = SymbolTable::new();
        for i in 0..64 {
            table.insert(Symbol::new(format!("S{i}"), i));
        }
        // Touch every symbol once; this will thrash the 16-slot cache, but
        // every lookup must still resolve to the correct index.
        for i in 0..64 {
            assert_eq!(table.find(&format!("S{i}")), Some(i));
        }
    }

    #[test]
    fn truthy_rules() {
        let mut s = Symbol::new("X", 1);
        assert!(!s.is_truthy());
        s.value = Some("n".to_string());
        assert!(!s.is_truthy());
        s.value = Some(" ".to_string());
        assert!(!s.is_truthy());
        s.value = Some("y".to_string());
        assert!(s.is_truthy());
    }
}
