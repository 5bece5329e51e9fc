//! Identifier renaming: prefix trimming and case conversion.

use regex::Regex;

/// A prefix candidate, compiled once.
#[derive(Debug, Clone)]
enum PrefixRule {
    /// Valid pattern: replaces every match.
    Pattern(Regex),
    /// Not a valid pattern: applies only when the name starts with it.
    Literal(String),
}

impl PrefixRule {
    fn compile(prefix: &str) -> Self {
        match Regex::new(prefix) {
            Ok(re) => PrefixRule::Pattern(re),
            Err(_) => PrefixRule::Literal(prefix.to_string()),
        }
    }

    /// Applies the rule, or `None` if it does not match `name`.
    fn apply(&self, name: &str, repl: &str) -> Option<String> {
        match self {
            PrefixRule::Pattern(re) => {
                if re.is_match(name) {
                    Some(re.replace_all(name, repl).into_owned())
                } else {
                    None
                }
            }
            PrefixRule::Literal(prefix) => {
                if name.starts_with(prefix.as_str()) {
                    Some(name.replace(prefix.as_str(), repl))
                } else {
                    None
                }
            }
        }
    }
}

/// Ordered prefix candidates with parallel replacements.
///
/// Candidates are tried in order and the first one that matches wins. A name
/// no candidate matches comes back unchanged.
#[derive(Debug, Clone, Default)]
pub struct NameTransformer {
    rules: Vec<(PrefixRule, String)>,
}

impl NameTransformer {
    /// Builds a transformer. `repls` may be shorter than `prefixes`; missing
    /// replacements are empty.
    pub fn new<P, R>(prefixes: &[P], repls: &[R]) -> Self
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let rules = prefixes
            .iter()
            .enumerate()
            .map(|(i, prefix)| {
                let repl = repls.get(i).map(|r| r.as_ref()).unwrap_or_default();
                (PrefixRule::compile(prefix.as_ref()), repl.to_string())
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Removes the first matching prefix, ignoring replacements.
    pub fn trim(&self, name: &str) -> String {
        self.first_match(name, |_| "")
    }

    /// Replaces the first matching prefix with its replacement.
    pub fn replace(&self, name: &str) -> String {
        self.first_match(name, |repl| repl)
    }

    /// Target spelling of a source identifier: replaced, then upper camel case.
    pub fn target_name(&self, name: &str) -> String {
        to_upper_camel_case(&self.replace(name))
    }

    fn first_match<'a>(&'a self, name: &str, pick: impl Fn(&'a str) -> &'a str) -> String {
        for (rule, repl) in &self.rules {
            if let Some(out) = rule.apply(name, pick(repl)) {
                return out;
            }
        }
        name.to_string()
    }
}

/// `foo_bar_baz` -> `FooBarBaz`. Only the first letter of each segment changes.
pub fn to_upper_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
