//! Target-side type representation.
//!
//! `Display` renders the compact target spelling (`c.Int`, `*T`, `[8]uint8`,
//! `func(a c.Int) c.Int`, ...). Turning whole declarations into source files
//! is left to emitters.

use std::fmt;

/// Fixed-size scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    /// C `char`, signedness not tracked
    Char,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Int,
    Uint,
    Long,
    Ulong,
    LongLong,
    UlongLong,
    Float,
    Double,
    Complex64,
    Complex128,
}

impl Scalar {
    pub fn name(self) -> &'static str {
        match self {
            Scalar::Bool => "bool",
            Scalar::Char => "c.Char",
            Scalar::Uint8 => "uint8",
            Scalar::Int16 => "int16",
            Scalar::Uint16 => "uint16",
            Scalar::Int32 => "int32",
            Scalar::Int => "c.Int",
            Scalar::Uint => "c.Uint",
            Scalar::Long => "c.Long",
            Scalar::Ulong => "c.Ulong",
            Scalar::LongLong => "c.LongLong",
            Scalar::UlongLong => "c.UlongLong",
            Scalar::Float => "c.Float",
            Scalar::Double => "c.Double",
            Scalar::Complex64 => "complex64",
            Scalar::Complex128 => "complex128",
        }
    }
}

/// A translated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// `void`: no value. Only meaningful as a return type or pointee.
    Invalid,
    Scalar(Scalar),
    /// `void *`
    OpaquePointer,
    Pointer(Box<TargetType>),
    Array {
        elem: Box<TargetType>,
        len: u64,
    },
    Func(Signature),
    /// A declared type, by target name
    Named(String),
    Struct(StructType),
    /// Open trailing argument list
    VarArgs,
}

impl TargetType {
    pub fn ptr(inner: TargetType) -> Self {
        TargetType::Pointer(Box::new(inner))
    }

    pub fn array(elem: TargetType, len: u64) -> Self {
        TargetType::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TargetType::Named(name.into())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TargetType::Invalid)
    }
}

impl From<Scalar> for TargetType {
    fn from(scalar: Scalar) -> Self {
        TargetType::Scalar(scalar)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Invalid => f.write_str("invalid type"),
            TargetType::Scalar(s) => f.write_str(s.name()),
            TargetType::OpaquePointer => f.write_str("c.Pointer"),
            TargetType::Pointer(inner) => write!(f, "*{inner}"),
            TargetType::Array { elem, len } => write!(f, "[{len}]{elem}"),
            TargetType::Func(sig) => write!(f, "{sig}"),
            TargetType::Named(name) => f.write_str(name),
            TargetType::Struct(st) => write!(f, "{st}"),
            TargetType::VarArgs => f.write_str("[]any"),
        }
    }
}

/// A parameter or struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TargetType,
}

impl Param {
    pub fn new(name: Option<String>, ty: TargetType) -> Self {
        Self { name, ty }
    }
}

/// Function signature. When `variadic` is set the last parameter has type
/// [`TargetType::VarArgs`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<Param>,
    pub variadic: bool,
    /// Empty for `void` functions, otherwise exactly one entry
    pub results: Vec<TargetType>,
}

impl Signature {
    pub fn result(&self) -> Option<&TargetType> {
        self.results.first()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(name) = &param.name {
                write!(f, "{name} ")?;
            }
            if self.variadic && i == last {
                f.write_str("...any")?;
            } else {
                write!(f, "{}", param.ty)?;
            }
        }
        f.write_str(")")?;
        if let Some(ret) = self.result() {
            write!(f, " {ret}")?;
        }
        Ok(())
    }
}

/// Aggregate with fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructType {
    pub fields: Vec<Param>,
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("struct{}");
        }
        f.write_str("struct { ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            match &field.name {
                Some(name) => write!(f, "{name} {}", field.ty)?,
                None => write!(f, "{}", field.ty)?,
            }
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars_and_pointers() {
        assert_eq!(TargetType::from(Scalar::Int).to_string(), "c.Int");
        assert_eq!(TargetType::ptr(Scalar::Char.into()).to_string(), "*c.Char");
        assert_eq!(TargetType::OpaquePointer.to_string(), "c.Pointer");
        assert_eq!(TargetType::array(Scalar::Uint8.into(), 8).to_string(), "[8]uint8");
    }

    #[test]
    fn test_display_signature() {
        let sig = Signature {
            params: vec![
                Param::new(Some("fmt".into()), TargetType::ptr(Scalar::Char.into())),
                Param::new(Some("__va_list".into()), TargetType::VarArgs),
            ],
            variadic: true,
            results: vec![Scalar::Int.into()],
        };
        insta::assert_snapshot!(sig.to_string(), @"func(fmt *c.Char, __va_list ...any) c.Int");

        let void_sig = Signature::default();
        assert_eq!(void_sig.to_string(), "func()");
    }

    #[test]
    fn test_display_struct() {
        let st = StructType {
            fields: vec![
                Param::new(Some("x".into()), Scalar::Int.into()),
                Param::new(Some("next".into()), TargetType::ptr(TargetType::named("Node"))),
            ],
        };
        insta::assert_snapshot!(st.to_string(), @"struct { x c.Int; next *Node }");
    }
}
