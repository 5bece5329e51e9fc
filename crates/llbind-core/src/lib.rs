//! Symbol and type translation for C/C++ bindings.
//!
//! # Architecture
//!
//! ```text
//! TranslationUnit (llbind-ast)
//!        │
//!        ▼
//!   Session::process ── SymbolProcessor (depth-first walk)
//!        │                  │ export policy, target names, `__N` suffixes
//!        │                  ▼
//!        │             TypeConverter ── BuiltinCatalog (scalars, aliases)
//!        │                  │        └─ TypeRegistry  (declared types)
//!        ▼                  ▼
//!   SymbolIndex        Package (bindings per header)
//! ```
//!
//! A [`Session`] owns all mutable state of a run. Feed it translation units
//! in a fixed order and call [`Session::finish`] to collect the symbol index,
//! the converted bindings and the declarations that had to be skipped.

pub mod builtin;
pub mod convert;
pub mod error;
pub mod eval;
pub mod name;
pub mod package;
mod process;
pub mod registry;
mod session;
pub mod sizes;
pub mod symbol;
pub mod target;

pub use builtin::{BuiltinCatalog, TypeAlias};
pub use convert::TypeConverter;
pub use error::{ConvertError, DeclError};
pub use name::{to_upper_camel_case, NameTransformer};
pub use package::{Binding, ConstBinding, FuncBinding, Package, PackageFile, TypeBinding};
pub use registry::{NamedKind, NamedType, TypeRegistry};
pub use session::{Session, SessionOptions, SessionOutput};
pub use symbol::{FuncName, NameCounter, SymbolIndex, SymbolInfo};
pub use target::{Param, Scalar, Signature, StructType, TargetType};
