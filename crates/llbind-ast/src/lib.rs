//! Declaration model consumed by the llbind translation engine.
//!
//! A frontend (libclang, or a test building trees by hand) produces a
//! [`TranslationUnit`] per header. The engine in `llbind-core` only ever
//! reads these trees; nothing here knows about the target language.
//!
//! ```text
//! TranslationUnit
//!   └── Decl { kind, children, location, access, doc }
//!         ├── Namespace / LinkageSpec / Record   (scopes, walked recursively)
//!         ├── Function                           (free, method, ctor, dtor)
//!         ├── Enum / Typedef
//!         └── Unknown
//! ```

mod decl;
mod types;

pub use decl::*;
pub use types::*;
