//! Configuration files for llbind.
//!
//! This crate provides:
//! - Binding configuration format (`llbind.toml`)
//! - Expansion of `$VAR` and `$(pkg-config ...)` in flags
//! - The symbol table file (`llbind.symb.json`)
//!
//! # Example
//!
//! ```toml
//! # llbind.toml
//! name = "lua"
//! cflags = "$(pkg-config --cflags lua)"
//! include = ["lua.h", "lauxlib.h"]
//! libs = "$(pkg-config --libs lua)"
//! trim_prefixes = ["lua_", "luaL_"]
//!
//! [symbols]
//! lua_close = "Close"
//! ```

mod config;
pub mod env;
mod error;
mod symbols;

pub use config::{include_dirs, BindConfig};
pub use error::{ConfigError, Result};
pub use symbols::{SymbolEntry, SymbolTable};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "llbind.toml";

/// Default symbol table file name.
pub const SYMBOL_FILE: &str = "llbind.symb.json";
