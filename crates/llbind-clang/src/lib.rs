//! libclang frontend for llbind.
//!
//! Parses a header (or in-memory source) with libclang and lowers the cursor
//! tree into an [`llbind_ast::TranslationUnit`]:
//!
//! ```text
//! header.h ──libclang──► CXCursor tree ──DeclBuilder──► TranslationUnit
//! ```
//!
//! libclang is loaded at runtime; [`ClangParser::new`] fails if it cannot be
//! found.

mod parse;

pub use parse::{ClangParser, ParseOptions};
