//! Source-side type descriptors.

use std::fmt;

use bitflags::bitflags;

/// Base kind of a builtin scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Void,
    Bool,
    Char,
    WChar,
    Char16,
    Char32,
    Int,
    Float,
    Complex,
}

bitflags! {
    /// Modifiers refining a [`BuiltinKind`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct BuiltinFlags: u8 {
        const SIGNED = 1 << 0;
        const UNSIGNED = 1 << 1;
        const SHORT = 1 << 2;
        const LONG = 1 << 3;
        const LONG_LONG = 1 << 4;
        const DOUBLE = 1 << 5;
    }
}

/// A builtin scalar type, e.g. `unsigned long` is `Int` + `UNSIGNED | LONG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuiltinType {
    pub kind: BuiltinKind,
    pub flags: BuiltinFlags,
}

impl BuiltinType {
    pub const fn new(kind: BuiltinKind) -> Self {
        Self {
            kind,
            flags: BuiltinFlags::empty(),
        }
    }

    pub const fn with_flags(kind: BuiltinKind, flags: BuiltinFlags) -> Self {
        Self { kind, flags }
    }

    pub const fn void() -> Self {
        Self::new(BuiltinKind::Void)
    }

    pub const fn int() -> Self {
        Self::new(BuiltinKind::Int)
    }

    pub const fn char() -> Self {
        Self::new(BuiltinKind::Char)
    }

    pub const fn double() -> Self {
        Self::with_flags(BuiltinKind::Float, BuiltinFlags::DOUBLE)
    }
}

impl fmt::Display for BuiltinType {
    /// C spelling of the type, used in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.flags;
        if flags.contains(BuiltinFlags::UNSIGNED) {
            f.write_str("unsigned ")?;
        } else if flags.contains(BuiltinFlags::SIGNED) {
            f.write_str("signed ")?;
        }
        let base = match self.kind {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "bool",
            BuiltinKind::Char => "char",
            BuiltinKind::WChar => "wchar_t",
            BuiltinKind::Char16 => "char16_t",
            BuiltinKind::Char32 => "char32_t",
            BuiltinKind::Int if flags.contains(BuiltinFlags::SHORT) => "short",
            BuiltinKind::Int if flags.contains(BuiltinFlags::LONG_LONG) => "long long",
            BuiltinKind::Int if flags.contains(BuiltinFlags::LONG) => "long",
            BuiltinKind::Int => "int",
            BuiltinKind::Float if flags.contains(BuiltinFlags::DOUBLE | BuiltinFlags::LONG) => {
                "long double"
            }
            BuiltinKind::Float if flags.contains(BuiltinFlags::DOUBLE) => "double",
            BuiltinKind::Float => "float",
            BuiltinKind::Complex if flags.contains(BuiltinFlags::DOUBLE) => "_Complex double",
            BuiltinKind::Complex => "_Complex float",
        };
        f.write_str(base)
    }
}

/// Record tag of a named reference (`struct Foo`, `union U`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Struct,
    Union,
    Class,
    Enum,
}

impl Tag {
    pub fn keyword(self) -> &'static str {
        match self {
            Tag::Struct => "struct",
            Tag::Union => "union",
            Tag::Class => "class",
            Tag::Enum => "enum",
        }
    }
}

/// A reference to a declared type by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRef {
    pub name: String,
    /// Enclosing namespaces/classes, outermost first.
    pub scope: Vec<String>,
    pub tag: Option<Tag>,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Vec::new(),
            tag: None,
        }
    }

    /// `ns::Class::name`, or just `name` at file scope.
    pub fn qualified(&self) -> String {
        if self.scope.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.scope.join("::"), self.name)
        }
    }
}

/// A named slot: function parameter or record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }
}

/// A function type. A trailing `...` is either flagged with `variadic` or
/// given as a final [`TypeExpr::Variadic`] parameter; consumers accept both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub variadic: bool,
    pub ret: Box<TypeExpr>,
}

impl FuncType {
    pub fn new(params: Vec<Field>, ret: TypeExpr) -> Self {
        Self {
            params,
            variadic: false,
            ret: Box::new(ret),
        }
    }
}

/// A structured type descriptor as written in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Builtin(BuiltinType),
    Pointer(Box<TypeExpr>),
    Array {
        elem: Box<TypeExpr>,
        len: Option<Expr>,
    },
    Func(FuncType),
    Named(NamedRef),
    Variadic,
}

impl TypeExpr {
    pub fn ptr(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn array(elem: TypeExpr, len: Option<Expr>) -> Self {
        TypeExpr::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(NamedRef::new(name))
    }

    pub fn builtin(kind: BuiltinKind) -> Self {
        TypeExpr::Builtin(BuiltinType::new(kind))
    }

    /// Short name of the descriptor variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeExpr::Builtin(_) => "builtin",
            TypeExpr::Pointer(_) => "pointer",
            TypeExpr::Array { .. } => "array",
            TypeExpr::Func(_) => "function",
            TypeExpr::Named(_) => "named reference",
            TypeExpr::Variadic => "variadic",
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Builtin(b) => write!(f, "{b}"),
            TypeExpr::Pointer(inner) => write!(f, "{inner}*"),
            TypeExpr::Array { elem, len: Some(len) } => write!(f, "{elem}[{len}]"),
            TypeExpr::Array { elem, len: None } => write!(f, "{elem}[]"),
            TypeExpr::Func(func) => {
                write!(f, "{}(", func.ret)?;
                for (i, p) in func.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p.ty)?;
                }
                if func.variadic {
                    if !func.params.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("...")?;
                }
                f.write_str(")")
            }
            TypeExpr::Named(named) => match named.tag {
                Some(tag) => write!(f, "{} {}", tag.keyword(), named.qualified()),
                None => f.write_str(&named.qualified()),
            },
            TypeExpr::Variadic => f.write_str("..."),
        }
    }
}

/// Constant expressions appearing in array lengths and enumerators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal token as spelled, e.g. `16`, `0x10u`, `'a'`.
    Lit(String),
    Ident(String),
    Paren(Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    pub fn lit(text: impl Into<String>) -> Self {
        Expr::Lit(text.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Lit(value.to_string())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(text) | Expr::Ident(text) => f.write_str(text),
            Expr::Paren(inner) => write!(f, "({inner})"),
            Expr::Neg(inner) => write!(f, "-{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_display() {
        let ulong = BuiltinType::with_flags(
            BuiltinKind::Int,
            BuiltinFlags::UNSIGNED | BuiltinFlags::LONG,
        );
        assert_eq!(ulong.to_string(), "unsigned long");
        assert_eq!(BuiltinType::double().to_string(), "double");
        let ld = BuiltinType::with_flags(
            BuiltinKind::Float,
            BuiltinFlags::DOUBLE | BuiltinFlags::LONG,
        );
        assert_eq!(ld.to_string(), "long double");
    }

    #[test]
    fn test_type_expr_display() {
        let arr = TypeExpr::array(TypeExpr::builtin(BuiltinKind::Char), Some(Expr::int(16)));
        assert_eq!(arr.to_string(), "char[16]");

        let mut func = FuncType::new(
            vec![Field::new("fmt", TypeExpr::ptr(TypeExpr::builtin(BuiltinKind::Char)))],
            TypeExpr::builtin(BuiltinKind::Int),
        );
        func.variadic = true;
        assert_eq!(TypeExpr::Func(func).to_string(), "int(char*, ...)");
    }

    #[test]
    fn test_named_ref_qualified() {
        let mut named = NamedRef::new("Bar");
        assert_eq!(named.qualified(), "Bar");
        named.scope = vec!["ns".into(), "Foo".into()];
        assert_eq!(named.qualified(), "ns::Foo::Bar");
    }
}
