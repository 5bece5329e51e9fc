//! One generation run over the headers of a configuration.

use std::path::{Path, PathBuf};

use llbind_clang::{ClangParser, ParseOptions};
use llbind_config::{BindConfig, SymbolEntry, SymbolTable, SYMBOL_FILE};
use llbind_core::{Session, SessionOptions, SessionOutput};
use miette::{miette, Result};
use tracing::{debug, info};

/// Result of processing every configured header.
pub struct Run {
    pub config: BindConfig,
    pub output: SessionOutput,
}

/// Mangled names carry a leading underscore on Mach-O targets only.
fn platform_decoration() -> Option<char> {
    if cfg!(target_os = "macos") {
        Some('_')
    } else {
        None
    }
}

/// The symbol table that sits next to `config_path`.
pub fn symbol_file(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join(SYMBOL_FILE))
        .unwrap_or_else(|| PathBuf::from(SYMBOL_FILE))
}

/// Naming options from the configuration. Targets recorded in an existing
/// symbol table are kept; `[symbols]` entries take precedence over both.
fn session_options(config: &BindConfig, symbols: &Path) -> Result<SessionOptions> {
    let mut options = SessionOptions::new()
        .with_trim_prefixes(config.trim_prefixes.iter().cloned())
        .with_repl_prefixes(config.repl_prefixes.iter().cloned())
        .with_decoration(platform_decoration());
    if symbols.is_file() {
        let table = SymbolTable::from_file(symbols)
            .map_err(|e| miette!("Failed to read {}: {}", symbols.display(), e))?;
        debug!(entries = table.len(), "reusing existing symbol table");
        for (mangled, target) in table.overrides() {
            options = options.with_override(mangled, target);
        }
    }
    for (mangled, target) in &config.symbols {
        options = options.with_override(mangled.clone(), target.clone());
    }
    Ok(options)
}

/// Parses and processes every header named by the configuration at
/// `config_path`, in configuration order.
pub fn generate(config_path: &Path) -> Result<Run> {
    let config = BindConfig::from_file(config_path)
        .map_err(|e| miette!("Failed to load {}: {}", config_path.display(), e))?;
    let headers = config.header_paths().map_err(|e| miette!("{}", e))?;
    let options = session_options(&config, &symbol_file(config_path))?;

    let parser = ClangParser::new()?;
    let parse_options = ParseOptions {
        cplusplus: config.cplusplus,
        args: config.clang_args(),
    };
    let mut session = Session::new(options);
    for header in &headers {
        info!(header = %header.display(), "processing header");
        let unit = parser.parse_file(header, &parse_options)?;
        session.process(&unit);
    }
    Ok(Run {
        config,
        output: session.finish(),
    })
}

/// Reports declarations that were skipped during the run.
pub fn report_diagnostics(output: &SessionOutput) {
    for diagnostic in &output.diagnostics {
        eprintln!("{:?}", miette::Report::new(diagnostic.clone()));
    }
}

/// The symbol table for a run, in indexing order.
pub fn symbol_table(output: &SessionOutput) -> SymbolTable {
    output
        .symbols
        .iter()
        .map(|(mangled, info)| SymbolEntry {
            mangle: mangled.to_string(),
            cpp: info.qualified_name.clone(),
            target: info.target_name.clone(),
        })
        .collect()
}
