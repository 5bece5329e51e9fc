//! Expansion of `$VAR`, `${VAR}` and `$(pkg-config ...)` in config strings.

use std::process::Command;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Tools whose output may be spliced into flags.
const ALLOWED_TOOLS: &[&str] = &["pkg-config", "llvm-config"];

fn subcommand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\(([^)]+)\)").expect("valid pattern"))
}

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("valid pattern")
    })
}

/// Expands sub-commands and environment variables in `input`.
///
/// Sub-commands other than `pkg-config` and `llvm-config` expand to nothing,
/// as do failing commands and unset variables.
pub fn expand(input: &str) -> String {
    expand_with(input, &run_tool, &|name: &str| std::env::var(name).ok())
}

/// [`expand`] with injectable command runner and variable lookup.
pub fn expand_with(
    input: &str,
    run: &dyn Fn(&str, &[&str]) -> Option<String>,
    var: &dyn Fn(&str) -> Option<String>,
) -> String {
    let commands = subcommand_re().replace_all(input, |caps: &Captures<'_>| {
        let line = caps[1].trim();
        let mut args = line.split_whitespace();
        let Some(tool) = args.next() else {
            return String::new();
        };
        if !ALLOWED_TOOLS.contains(&tool) {
            warn!(command = line, "only pkg-config and llvm-config can be expanded");
            return String::new();
        }
        let args: Vec<&str> = args.collect();
        match run(tool, &args) {
            Some(out) => out.split_whitespace().collect::<Vec<_>>().join(" "),
            None => {
                debug!(command = line, "sub-command failed");
                String::new()
            }
        }
    });
    let vars = variable_re().replace_all(&commands, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        var(name).unwrap_or_default()
    });
    vars.trim().to_string()
}

fn run_tool(tool: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(tool).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}
