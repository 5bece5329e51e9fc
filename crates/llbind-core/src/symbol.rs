//! Symbol index and name collision counting.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{ConvertError, Result};

/// Target name and qualified source name of one exported function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub target_name: String,
    /// `ns::Class::display(args)`
    pub qualified_name: String,
}

/// Exported symbols keyed by undecorated mangled name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    symbols: IndexMap<String, SymbolInfo>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `info` under `mangled`, returning the entry it replaced.
    pub fn insert(&mut self, mangled: impl Into<String>, info: SymbolInfo) -> Option<SymbolInfo> {
        self.symbols.insert(mangled.into(), info)
    }

    pub fn get(&self, mangled: &str) -> Option<&SymbolInfo> {
        self.symbols.get(mangled)
    }

    pub fn lookup(&self, mangled: &str) -> Result<&SymbolInfo> {
        self.symbols
            .get(mangled)
            .ok_or_else(|| ConvertError::SymbolLookupFailed(mangled.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolInfo)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Occurrence counts of candidate target names across a run.
///
/// Every returned name is distinct from all names claimed or reserved
/// before it.
#[derive(Debug, Clone, Default)]
pub struct NameCounter {
    counts: FxHashMap<String, usize>,
    taken: FxHashSet<String>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken without counting it; later claims skip it.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Counts `name` and returns it, suffixed `__N` if it was seen N times
    /// before. Suffixes already taken are skipped.
    pub fn claim(&mut self, name: &str) -> String {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        loop {
            let candidate = match *count {
                0 => name.to_string(),
                n => format!("{name}__{n}"),
            };
            *count += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }
}

/// Strips one leading decoration character from a mangled name.
pub fn undecorate(mangled: &str, decoration: Option<char>) -> &str {
    match decoration {
        Some(c) => mangled.strip_prefix(c).unwrap_or(mangled),
        None => mangled,
    }
}

/// A target function name split into receiver and name: `(*Foo).Bar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncName {
    pub receiver: Option<String>,
    pub name: String,
}

impl FuncName {
    pub fn method(receiver: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }

    pub fn free(name: impl Into<String>) -> Self {
        Self {
            receiver: None,
            name: name.into(),
        }
    }

    /// Parses `(*Recv).Name`, `(Recv).Name` or a bare `Name`.
    pub fn parse(full: &str) -> Self {
        if let Some(rest) = full.strip_prefix('(') {
            if let Some((recv, name)) = rest.split_once(").") {
                let recv = recv.trim_start_matches('*');
                return Self::method(recv, name);
            }
        }
        Self::free(full)
    }
}

impl fmt::Display for FuncName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(recv) => write!(f, "(*{recv}).{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_suffixes() {
        let mut counter = NameCounter::new();
        assert_eq!(counter.claim("Foo"), "Foo");
        assert_eq!(counter.claim("Foo"), "Foo__1");
        assert_eq!(counter.claim("Bar"), "Bar");
        assert_eq!(counter.claim("Foo"), "Foo__2");
        assert_eq!(counter.count("Foo"), 3);
        assert_eq!(counter.count("Baz"), 0);
    }

    #[test]
    fn test_reserved_names_are_skipped() {
        let mut counter = NameCounter::new();
        counter.reserve("Foo");
        counter.reserve("Foo__1");
        assert_eq!(counter.claim("Foo"), "Foo__2");
        assert_eq!(counter.claim("Foo"), "Foo__3");

        // a natural candidate that looks like a suffixed name
        assert_eq!(counter.claim("Bar__1"), "Bar__1");
        assert_eq!(counter.claim("Bar"), "Bar");
        assert_eq!(counter.claim("Bar"), "Bar__2");
    }

    #[test]
    fn test_undecorate() {
        assert_eq!(undecorate("_ZN3Foo3barEv", Some('_')), "ZN3Foo3barEv");
        assert_eq!(undecorate("__foo", Some('_')), "_foo");
        assert_eq!(undecorate("foo", Some('_')), "foo");
        assert_eq!(undecorate("_foo", None), "_foo");
    }

    #[test]
    fn test_index_lookup() {
        let mut index = SymbolIndex::new();
        let info = SymbolInfo {
            target_name: "Close".into(),
            qualified_name: "lua_close(lua_State *)".into(),
        };
        assert!(index.insert("lua_close", info.clone()).is_none());
        assert_eq!(index.lookup("lua_close"), Ok(&info));
        assert_eq!(
            index.lookup("lua_open"),
            Err(ConvertError::SymbolLookupFailed("lua_open".into()))
        );
    }

    #[test]
    fn test_func_name_parse() {
        assert_eq!(FuncName::parse("(*Foo).Bar"), FuncName::method("Foo", "Bar"));
        assert_eq!(FuncName::parse("(Foo).Bar"), FuncName::method("Foo", "Bar"));
        assert_eq!(FuncName::parse("Close"), FuncName::free("Close"));
        assert_eq!(FuncName::method("Foo", "Init").to_string(), "(*Foo).Init");
    }
}
