//! Run-scoped generation state.

use llbind_ast::TranslationUnit;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use crate::builtin::BuiltinCatalog;
use crate::convert::TypeConverter;
use crate::error::DeclError;
use crate::name::NameTransformer;
use crate::package::Package;
use crate::process::SymbolProcessor;
use crate::registry::TypeRegistry;
use crate::symbol::{NameCounter, SymbolIndex};

/// Inputs that shape naming for a whole run.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Prefix candidates, literal or pattern, tried in order
    pub trim_prefixes: Vec<String>,
    /// Replacements parallel to `trim_prefixes`; missing entries are empty
    pub repl_prefixes: Vec<String>,
    /// Mangled name -> target name, bypassing automatic naming
    pub overrides: FxHashMap<String, String>,
    /// Decoration stripped from the start of mangled names
    pub decoration: Option<char>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            trim_prefixes: Vec::new(),
            repl_prefixes: Vec::new(),
            overrides: FxHashMap::default(),
            decoration: Some('_'),
        }
    }
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim_prefixes<S: Into<String>>(
        mut self,
        prefixes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.trim_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_repl_prefixes<S: Into<String>>(
        mut self,
        repls: impl IntoIterator<Item = S>,
    ) -> Self {
        self.repl_prefixes = repls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_override(mut self, mangled: impl Into<String>, target: impl Into<String>) -> Self {
        self.overrides.insert(mangled.into(), target.into());
        self
    }

    pub fn with_decoration(mut self, decoration: Option<char>) -> Self {
        self.decoration = decoration;
        self
    }
}

/// State owned by one generation run.
///
/// Files must be processed in a stable order: the first declaration to claim
/// a target name keeps it, later ones get `__N` suffixes.
#[derive(Debug)]
pub struct Session {
    pub(crate) names: NameTransformer,
    pub(crate) catalog: BuiltinCatalog,
    pub(crate) types: TypeRegistry,
    pub(crate) counter: NameCounter,
    pub(crate) symbols: SymbolIndex,
    pub(crate) package: Package,
    pub(crate) diagnostics: Vec<DeclError>,
    pub(crate) overrides: FxHashMap<String, String>,
    pub(crate) decoration: Option<char>,
    /// Type names that already have a binding in the package
    pub(crate) emitted: FxHashSet<String>,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct SessionOutput {
    pub symbols: SymbolIndex,
    pub types: TypeRegistry,
    pub package: Package,
    pub diagnostics: Vec<DeclError>,
}

impl Session {
    /// Override targets are reserved up front, so automatic names never
    /// collide with them.
    pub fn new(options: SessionOptions) -> Self {
        let mut counter = NameCounter::new();
        for target in options.overrides.values() {
            counter.reserve(target);
        }
        Self {
            names: NameTransformer::new(&options.trim_prefixes, &options.repl_prefixes),
            catalog: BuiltinCatalog::new(),
            types: TypeRegistry::new(),
            counter,
            symbols: SymbolIndex::new(),
            package: Package::new(),
            diagnostics: Vec::new(),
            overrides: options.overrides,
            decoration: options.decoration,
            emitted: FxHashSet::default(),
        }
    }

    /// Walks one translation unit. Only functions declared in `unit.path`
    /// are indexed; types from included headers are registered so they
    /// resolve, and get bindings once their own header is processed.
    pub fn process(&mut self, unit: &TranslationUnit) {
        let before = self.symbols.len();
        let failed = self.diagnostics.len();
        SymbolProcessor::new(self, &unit.path).run(&unit.decls);
        info!(
            file = %unit.path,
            symbols = self.symbols.len() - before,
            skipped = self.diagnostics.len() - failed,
            "processed translation unit"
        );
    }

    pub fn converter(&self) -> TypeConverter<'_> {
        TypeConverter::new(&self.catalog, &self.names, &self.types)
    }

    pub fn names(&self) -> &NameTransformer {
        &self.names
    }

    pub fn catalog(&self) -> &BuiltinCatalog {
        &self.catalog
    }

    pub fn symbols(&self) -> &SymbolIndex {
        &self.symbols
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn diagnostics(&self) -> &[DeclError] {
        &self.diagnostics
    }

    pub fn is_header_aliased(&self, header: &str) -> bool {
        self.catalog.is_header_aliased(header)
    }

    pub fn finish(self) -> SessionOutput {
        SessionOutput {
            symbols: self.symbols,
            types: self.types,
            package: self.package,
            diagnostics: self.diagnostics,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}
