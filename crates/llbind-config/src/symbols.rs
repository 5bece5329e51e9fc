//! Symbol table file (llbind.symb.json).
//!
//! The table records every exported function of a run. Editing the
//! `target` of an entry and running again keeps that name.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// One exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// Undecorated link-time name.
    pub mangle: String,

    /// Qualified source name.
    #[serde(rename = "c++")]
    pub cpp: String,

    /// Target name.
    pub target: String,
}

/// Ordered list of symbol entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the table as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn push(&mut self, entry: SymbolEntry) {
        self.entries.push(entry);
    }

    pub fn lookup(&self, mangle: &str) -> Option<&SymbolEntry> {
        self.entries.iter().find(|e| e.mangle == mangle)
    }

    /// (mangled name, target name) pairs, usable as naming overrides.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.mangle.as_str(), e.target.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SymbolEntry> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = SymbolEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mangle: &str, cpp: &str, target: &str) -> SymbolEntry {
        SymbolEntry {
            mangle: mangle.to_string(),
            cpp: cpp.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_json_format() {
        let json = r#"[
  { "mangle": "ZN3Foo3barEv", "c++": "Foo::bar()", "target": "(*Foo).Bar" },
  { "mangle": "lua_close", "c++": "lua_close(lua_State *)", "target": "Close" }
]"#;
        let table = SymbolTable::from_json(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("lua_close").unwrap().target, "Close");
        assert_eq!(table.lookup("ZN3Foo3barEv").unwrap().cpp, "Foo::bar()");
        assert!(table.lookup("lua_open").is_none());

        let pairs: Vec<_> = table.overrides().collect();
        assert_eq!(pairs[0], ("ZN3Foo3barEv", "(*Foo).Bar"));
    }

    #[test]
    fn test_write_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llbind.symb.json");
        let table: SymbolTable = [entry("cJSON_Parse", "cJSON_Parse(const char *)", "Parse")]
            .into_iter()
            .collect();
        table.write_to(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"c++\": \"cJSON_Parse(const char *)\""));
        assert_eq!(SymbolTable::from_file(&path).unwrap(), table);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SymbolTable::from_json("{"),
            Err(crate::ConfigError::Json(_))
        ));
    }
}
