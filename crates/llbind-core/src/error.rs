//! Translation errors.

use llbind_ast::BuiltinType;
use miette::Diagnostic;
use thiserror::Error;

/// Failure to translate a type or look up a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConvertError {
    #[error("builtin type `{0}` has no target mapping")]
    #[diagnostic(code(llbind::unresolved_builtin))]
    UnresolvedBuiltin(BuiltinType),

    #[error("type `{0}` not found")]
    #[diagnostic(
        code(llbind::unresolved_alias),
        help("declare the type before its first use, or add a typedef the catalog knows")
    )]
    UnresolvedAlias(String),

    #[error("can't determine the array length `{len}`")]
    #[diagnostic(code(llbind::unresolved_array_length))]
    UnresolvedArrayLength { len: String },

    #[error("unsupported type: {0}")]
    #[diagnostic(code(llbind::unsupported))]
    UnsupportedDescriptor(String),

    #[error("symbol `{0}` not found in the symbol table")]
    #[diagnostic(code(llbind::symbol_lookup))]
    SymbolLookupFailed(String),
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// A declaration that was skipped because one of its types failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("skipped `{decl}` in {file}")]
#[diagnostic(code(llbind::skipped_decl), severity(Warning))]
pub struct DeclError {
    pub decl: String,
    pub file: String,
    #[source]
    #[diagnostic_source]
    pub source: ConvertError,
}

impl DeclError {
    pub fn new(decl: impl Into<String>, file: impl Into<String>, source: ConvertError) -> Self {
        Self {
            decl: decl.into(),
            file: file.into(),
            source,
        }
    }
}
