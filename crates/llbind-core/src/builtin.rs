//! Builtin scalar catalog and fixed-width typedef aliases.

use std::path::{Component, Path};

use indexmap::IndexMap;
use llbind_ast::{BuiltinFlags as F, BuiltinKind as K, BuiltinType};
use rustc_hash::FxHashMap;

use crate::error::{ConvertError, Result};
use crate::target::{Scalar, TargetType};

/// A typedef the catalog resolves without seeing its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAlias {
    pub name: String,
    pub resolved: TargetType,
    /// Declaring header, relative to the include root
    pub header: String,
}

const BUILTINS: &[(K, F, Option<Scalar>)] = &[
    (K::Void, F::empty(), None),
    (K::Bool, F::empty(), Some(Scalar::Bool)),
    (K::Char, F::empty(), Some(Scalar::Char)),
    (K::Char, F::SIGNED, Some(Scalar::Char)),
    (K::Char, F::UNSIGNED, Some(Scalar::Char)),
    (K::WChar, F::empty(), Some(Scalar::Int16)),
    (K::Char16, F::empty(), Some(Scalar::Int16)),
    (K::Char32, F::empty(), Some(Scalar::Int32)),
    (K::Int, F::SHORT, Some(Scalar::Int16)),
    (K::Int, F::SHORT.union(F::UNSIGNED), Some(Scalar::Uint16)),
    (K::Int, F::empty(), Some(Scalar::Int)),
    (K::Int, F::UNSIGNED, Some(Scalar::Uint)),
    (K::Int, F::LONG, Some(Scalar::Long)),
    (K::Int, F::LONG.union(F::UNSIGNED), Some(Scalar::Ulong)),
    (K::Int, F::LONG_LONG, Some(Scalar::LongLong)),
    (K::Int, F::LONG_LONG.union(F::UNSIGNED), Some(Scalar::UlongLong)),
    (K::Float, F::empty(), Some(Scalar::Float)),
    (K::Float, F::DOUBLE, Some(Scalar::Double)),
    // long double loses precision here
    (K::Float, F::DOUBLE.union(F::LONG), Some(Scalar::Double)),
    (K::Complex, F::empty(), Some(Scalar::Complex64)),
    (K::Complex, F::DOUBLE, Some(Scalar::Complex128)),
];

const ALIASES: &[(&str, Scalar, &str)] = &[
    ("int8_t", Scalar::Char, "sys/_types/_int8_t.h"),
    ("uint8_t", Scalar::Char, "_types/_uint8_t.h"),
    ("u_int8_t", Scalar::Char, "sys/_types/_u_int8_t.h"),
    ("int16_t", Scalar::Int16, "sys/_types/_int16_t.h"),
    ("uint16_t", Scalar::Uint16, "_types/_uint16_t.h"),
    ("u_int16_t", Scalar::Uint16, "sys/_types/_u_int16_t.h"),
    ("int32_t", Scalar::Int, "sys/_types/_int32_t.h"),
    ("uint32_t", Scalar::Uint, "_types/_uint32_t.h"),
    ("u_int32_t", Scalar::Uint, "sys/_types/_u_int32_t.h"),
    ("int64_t", Scalar::LongLong, "sys/_types/_int64_t.h"),
    ("uint64_t", Scalar::UlongLong, "_types/_uint64_t.h"),
    ("u_int64_t", Scalar::UlongLong, "sys/_types/_u_int64_t.h"),
];

/// Builtin and alias tables. Built once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    builtins: FxHashMap<BuiltinType, TargetType>,
    aliases: IndexMap<String, TypeAlias>,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        let builtins = BUILTINS
            .iter()
            .map(|&(kind, flags, scalar)| {
                let ty = scalar.map_or(TargetType::Invalid, TargetType::Scalar);
                (BuiltinType::with_flags(kind, flags), ty)
            })
            .collect();
        let aliases = ALIASES
            .iter()
            .map(|&(name, scalar, header)| {
                let alias = TypeAlias {
                    name: name.to_string(),
                    resolved: TargetType::Scalar(scalar),
                    header: header.to_string(),
                };
                (name.to_string(), alias)
            })
            .collect();
        Self { builtins, aliases }
    }

    pub fn resolve_builtin(&self, key: BuiltinType) -> Result<TargetType> {
        self.builtins
            .get(&key)
            .cloned()
            .ok_or(ConvertError::UnresolvedBuiltin(key))
    }

    pub fn resolve_alias(&self, name: &str) -> Option<&TypeAlias> {
        self.aliases.get(name)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &TypeAlias> {
        self.aliases.values()
    }

    pub fn is_void(&self, ty: &TargetType) -> bool {
        ty.is_void()
    }

    /// Type used for enumerations without an explicit underlying type.
    pub fn default_enum_type(&self) -> TargetType {
        TargetType::Scalar(Scalar::Int)
    }

    /// Whether `header` only declares a type the alias table already knows.
    ///
    /// Headers are compared relative to their `include` directory, so
    /// `/usr/include/sys/_types/_int8_t.h` and the SDK copy of the same
    /// header are both recognized.
    pub fn is_header_aliased(&self, header: &str) -> bool {
        let rel = relative_header_path(header);
        self.aliases.values().any(|alias| alias.header == rel)
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Path after the first `include` component, or `path` itself if there is none.
pub fn relative_header_path(path: &str) -> String {
    let components: Vec<Component<'_>> = Path::new(path).components().collect();
    match components
        .iter()
        .position(|c| c.as_os_str() == "include")
    {
        Some(idx) => components[idx + 1..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: K, flags: F) -> BuiltinType {
        BuiltinType::with_flags(kind, flags)
    }

    #[test]
    fn test_void_is_invalid_sentinel() {
        let catalog = BuiltinCatalog::new();
        let void = catalog.resolve_builtin(BuiltinType::void()).unwrap();
        assert!(catalog.is_void(&void));
        assert_eq!(void, TargetType::Invalid);
    }

    #[test]
    fn test_char_signedness_collapses() {
        let catalog = BuiltinCatalog::new();
        let signed = catalog.resolve_builtin(key(K::Char, F::SIGNED)).unwrap();
        let unsigned = catalog.resolve_builtin(key(K::Char, F::UNSIGNED)).unwrap();
        assert_eq!(signed, unsigned);
        assert_eq!(signed, TargetType::Scalar(Scalar::Char));
    }

    #[test]
    fn test_integer_widths() {
        let catalog = BuiltinCatalog::new();
        let cases = [
            (key(K::Int, F::SHORT), Scalar::Int16),
            (key(K::Int, F::SHORT | F::UNSIGNED), Scalar::Uint16),
            (key(K::Int, F::empty()), Scalar::Int),
            (key(K::Int, F::UNSIGNED), Scalar::Uint),
            (key(K::Int, F::LONG), Scalar::Long),
            (key(K::Int, F::LONG | F::UNSIGNED), Scalar::Ulong),
            (key(K::Int, F::LONG_LONG), Scalar::LongLong),
            (key(K::Int, F::LONG_LONG | F::UNSIGNED), Scalar::UlongLong),
            (key(K::WChar, F::empty()), Scalar::Int16),
            (key(K::Char16, F::empty()), Scalar::Int16),
            (key(K::Char32, F::empty()), Scalar::Int32),
        ];
        for (k, expected) in cases {
            assert_eq!(
                catalog.resolve_builtin(k).unwrap(),
                TargetType::Scalar(expected),
                "{k}"
            );
        }
    }

    #[test]
    fn test_floating_point() {
        let catalog = BuiltinCatalog::new();
        let long_double = catalog.resolve_builtin(key(K::Float, F::DOUBLE | F::LONG)).unwrap();
        assert_eq!(long_double, TargetType::Scalar(Scalar::Double));
        let cplx = catalog.resolve_builtin(key(K::Complex, F::DOUBLE)).unwrap();
        assert_eq!(cplx, TargetType::Scalar(Scalar::Complex128));
    }

    #[test]
    fn test_unknown_builtin() {
        let catalog = BuiltinCatalog::new();
        let bogus = key(K::Bool, F::LONG);
        assert_eq!(
            catalog.resolve_builtin(bogus),
            Err(ConvertError::UnresolvedBuiltin(bogus))
        );
    }

    #[test]
    fn test_alias_lookup() {
        let catalog = BuiltinCatalog::new();
        let alias = catalog.resolve_alias("uint64_t").unwrap();
        assert_eq!(alias.resolved, TargetType::Scalar(Scalar::UlongLong));
        assert_eq!(alias.header, "_types/_uint64_t.h");
        assert!(catalog.resolve_alias("size_t").is_none());
        assert_eq!(catalog.aliases().count(), 12);
    }

    #[test]
    fn test_relative_header_path() {
        assert_eq!(
            relative_header_path("/usr/include/sys/_types/_int8_t.h"),
            "sys/_types/_int8_t.h"
        );
        assert_eq!(relative_header_path("foo/bar.h"), "foo/bar.h");
        assert_eq!(
            relative_header_path("/sdk/usr/include/_types/_uint8_t.h"),
            "_types/_uint8_t.h"
        );
    }

    #[test]
    fn test_is_header_aliased() {
        let catalog = BuiltinCatalog::new();
        assert!(catalog.is_header_aliased("/usr/include/sys/_types/_int8_t.h"));
        assert!(catalog.is_header_aliased(
            "/Library/Developer/SDKs/MacOSX.sdk/usr/include/_types/_uint32_t.h"
        ));
        assert!(!catalog.is_header_aliased("/usr/include/stdio.h"));
        assert!(!catalog.is_header_aliased("/usr/include/sys/_types/_size_t.h"));
    }
}
