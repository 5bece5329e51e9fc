//! Binding configuration (llbind.toml format).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::env;
use crate::error::{ConfigError, Result};

/// Root binding configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Package name of the generated bindings.
    pub name: String,

    /// Compiler flags; `-I` entries locate the headers. Expanded with
    /// [`env::expand`] before use.
    pub cflags: String,

    /// Headers to bind, relative to an include directory.
    pub include: Vec<String>,

    /// Linker flags for the bound library.
    pub libs: String,

    /// Prefix candidates (literal or pattern) removed from names.
    pub trim_prefixes: Vec<String>,

    /// Replacements parallel to `trim_prefixes`.
    pub repl_prefixes: Vec<String>,

    /// Parse headers as C++.
    pub cplusplus: bool,

    /// Mangled name -> target name overrides.
    pub symbols: BTreeMap<String, String>,
}

impl BindConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `cflags` with variables and sub-commands expanded.
    pub fn expanded_cflags(&self) -> String {
        env::expand(&self.cflags)
    }

    /// `libs` with variables and sub-commands expanded.
    pub fn expanded_libs(&self) -> String {
        env::expand(&self.libs)
    }

    /// Compiler arguments passed to the parser.
    pub fn clang_args(&self) -> Vec<String> {
        self.expanded_cflags()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Include directories named by `-I` flags.
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        include_dirs(&self.clang_args())
    }

    /// Resolve every header in `include` against the include directories.
    ///
    /// Absolute headers are used as given. All missing headers are reported
    /// together.
    pub fn header_paths(&self) -> Result<Vec<PathBuf>> {
        if self.include.is_empty() {
            return Err(ConfigError::NoHeaders);
        }
        let dirs = self.include_dirs();
        let mut found = Vec::with_capacity(self.include.len());
        let mut missing = Vec::new();
        for header in &self.include {
            match resolve_header(header, &dirs) {
                Some(path) => found.push(path),
                None => missing.push(header.clone()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(ConfigError::HeadersNotFound(missing))
        }
    }

    /// Add a header.
    pub fn with_header(mut self, header: &str) -> Self {
        self.include.push(header.to_string());
        self
    }

    /// Set the compiler flags.
    pub fn with_cflags(mut self, cflags: &str) -> Self {
        self.cflags = cflags.to_string();
        self
    }
}

fn resolve_header(header: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let path = Path::new(header);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    dirs.iter().map(|dir| dir.join(path)).find(|p| p.is_file())
}

/// Extract include directories from compiler arguments.
pub fn include_dirs(args: &[String]) -> Vec<PathBuf> {
    let mut includes = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if (args[i] == "-I" || args[i] == "-isystem") && i + 1 < args.len() {
            includes.push(PathBuf::from(&args[i + 1]));
            i += 2;
        } else if let Some(dir) = args[i].strip_prefix("-I") {
            includes.push(PathBuf::from(dir));
            i += 1;
        } else {
            i += 1;
        }
    }
    includes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
name = "lua"
cflags = "-I/usr/include/lua5.4"
include = ["lua.h", "lauxlib.h"]
libs = "-llua5.4"
trim_prefixes = ["lua_", "luaL_"]
cplusplus = false

[symbols]
lua_close = "Close"
        "#;

        let config = BindConfig::parse(toml).unwrap();

        assert_eq!(config.name, "lua");
        assert_eq!(config.include, vec!["lua.h", "lauxlib.h"]);
        assert_eq!(config.trim_prefixes, vec!["lua_", "luaL_"]);
        assert!(config.repl_prefixes.is_empty());
        assert!(!config.cplusplus);
        assert_eq!(config.symbols.get("lua_close").map(String::as_str), Some("Close"));
        assert_eq!(config.include_dirs(), vec![PathBuf::from("/usr/include/lua5.4")]);
    }

    #[test]
    fn test_defaults() {
        let config = BindConfig::parse("name = \"empty\"").unwrap();
        assert_eq!(config.name, "empty");
        assert!(config.include.is_empty());
        assert!(matches!(config.header_paths(), Err(ConfigError::NoHeaders)));
    }

    #[test]
    fn test_include_dirs() {
        let args: Vec<String> = ["-I", "/a", "-I/b", "-DX", "-isystem", "/c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            include_dirs(&args),
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn test_header_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cJSON.h"), "int cJSON_Version(void);").unwrap();

        let config = BindConfig::default()
            .with_cflags(&format!("-I{}", dir.path().display()))
            .with_header("cJSON.h");
        assert_eq!(config.header_paths().unwrap(), vec![dir.path().join("cJSON.h")]);

        let config = config.with_header("missing.h").with_header("gone.h");
        match config.header_paths() {
            Err(ConfigError::HeadersNotFound(missing)) => {
                assert_eq!(missing, vec!["missing.h", "gone.h"]);
            }
            other => panic!("expected missing headers, got {other:?}"),
        }
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llbind.toml");
        std::fs::write(&path, "name = \"demo\"\ninclude = [\"demo.h\"]\n").unwrap();
        let config = BindConfig::from_file(&path).unwrap();
        assert_eq!(config.name, "demo");

        assert!(matches!(
            BindConfig::from_file(&dir.path().join("nope.toml")),
            Err(ConfigError::Io(_))
        ));
        std::fs::write(&path, "name = [").unwrap();
        assert!(matches!(
            BindConfig::from_file(&path),
            Err(ConfigError::ParseToml(_))
        ));
    }
}
