//! Declarations.

use crate::types::{Expr, Field, FuncType, Tag, TypeExpr};

/// All declarations parsed from one header.
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    /// Path of the header the unit was parsed from
    pub path: String,
    /// Top-level declarations, in source order
    pub decls: Vec<Decl>,
}

impl TranslationUnit {
    pub fn new(path: impl Into<String>, decls: Vec<Decl>) -> Self {
        Self {
            path: path.into(),
            decls,
        }
    }
}

/// A declaration node.
#[derive(Debug, Clone)]
pub struct Decl {
    /// What was declared
    pub kind: DeclKind,
    /// Nested declarations (namespace members, record methods, ...)
    pub children: Vec<Decl>,
    /// Where it was declared
    pub location: Location,
    /// Member access; meaningful only inside records
    pub access: AccessSpecifier,
    /// Raw doc comment attached to the declaration
    pub doc: Option<String>,
}

impl Decl {
    pub fn new(kind: DeclKind, file: impl Into<String>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            location: Location::in_file(file),
            access: AccessSpecifier::default(),
            doc: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Decl>) -> Self {
        self.children = children;
        self
    }

    pub fn with_access(mut self, access: AccessSpecifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declared name, if the declaration has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Namespace { name } => name.as_deref(),
            DeclKind::Record { name, .. } => Some(name),
            DeclKind::Function(func) => Some(&func.name),
            DeclKind::Enum { name, .. } => name.as_deref(),
            DeclKind::Typedef { name, .. } => Some(name),
            DeclKind::LinkageSpec | DeclKind::Unknown(_) => None,
        }
    }

    pub fn file(&self) -> Option<&str> {
        self.location.file.as_deref()
    }
}

/// Source location of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn in_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            line: 0,
            column: 0,
        }
    }
}

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessSpecifier {
    Public,
    #[default]
    Private,
    Protected,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// `namespace name { ... }`; `None` for anonymous namespaces
    Namespace { name: Option<String> },
    /// `extern "C" { ... }`
    LinkageSpec,
    /// struct/union/class definition; members live in `children`
    Record {
        name: String,
        tag: Tag,
        fields: Vec<Field>,
    },
    Function(FunctionDecl),
    Enum {
        name: Option<String>,
        items: Vec<EnumItem>,
    },
    Typedef { name: String, underlying: TypeExpr },
    /// Anything the frontend saw but does not model
    Unknown(String),
}

/// Function-like declaration.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// Raw spelling, e.g. `bar`, `Foo`, `~Foo`
    pub name: String,
    /// Display spelling including parameter types, e.g. `bar(int)`
    pub display_name: String,
    /// Link-time symbol name as reported by the frontend
    pub mangled_name: String,
    pub kind: FunctionKind,
    pub ty: FuncType,
}

impl FunctionDecl {
    /// A free function whose mangled and display names are derived from `name`.
    pub fn free(name: impl Into<String>, ty: FuncType) -> Self {
        let name = name.into();
        Self {
            display_name: format!("{name}()"),
            mangled_name: name.clone(),
            name,
            kind: FunctionKind::Free,
            ty,
        }
    }

    pub fn with_kind(mut self, kind: FunctionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_mangled(mut self, mangled: impl Into<String>) -> Self {
        self.mangled_name = mangled.into();
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_name = display.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Free,
    Method,
    Constructor,
    Destructor,
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub name: String,
    pub value: Option<Expr>,
}

impl EnumItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BuiltinKind, TypeExpr};

    #[test]
    fn test_free_function_defaults() {
        let func = FunctionDecl::free(
            "lua_close",
            FuncType::new(vec![], TypeExpr::builtin(BuiltinKind::Void)),
        );
        assert_eq!(func.mangled_name, "lua_close");
        assert_eq!(func.display_name, "lua_close()");
        assert_eq!(func.kind, FunctionKind::Free);
    }

    #[test]
    fn test_decl_name() {
        let ns = Decl::new(DeclKind::Namespace { name: None }, "a.h");
        assert_eq!(ns.name(), None);
        assert_eq!(ns.access, AccessSpecifier::Private);

        let td = Decl::new(
            DeclKind::Typedef {
                name: "size_t".into(),
                underlying: TypeExpr::builtin(BuiltinKind::Int),
            },
            "a.h",
        );
        assert_eq!(td.name(), Some("size_t"));
        assert_eq!(td.file(), Some("a.h"));
    }
}
