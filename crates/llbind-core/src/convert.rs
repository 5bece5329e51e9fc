//! Type descriptor translation.
//!
//! [`TypeConverter`] maps a [`TypeExpr`] to a [`TargetType`]. It is a pure
//! function of the catalog, the prefix rules and the types registered so far:
//!
//! - `void *` becomes an opaque pointer, and a pointer to a function type
//!   is the function type itself.
//! - Arrays decay to pointers in parameters and need a constant length
//!   everywhere else.
//! - Named references check the alias table before declared types.

use llbind_ast::{Field, FuncType, NamedRef, Tag, TypeExpr};
use tracing::trace;

use crate::builtin::BuiltinCatalog;
use crate::error::{ConvertError, Result};
use crate::eval;
use crate::name::NameTransformer;
use crate::registry::TypeRegistry;
use crate::sizes::{self, POINTER_SIZE};
use crate::target::{Param, Scalar, Signature, StructType, TargetType};

/// Name given to an unnamed trailing variadic parameter.
pub const VA_LIST_NAME: &str = "__va_list";

/// Name of the field synthesized for empty records.
pub const PLACEHOLDER_FIELD: &str = "Unused";

/// Translator from source descriptors to target types.
#[derive(Debug, Clone, Copy)]
pub struct TypeConverter<'a> {
    catalog: &'a BuiltinCatalog,
    names: &'a NameTransformer,
    types: &'a TypeRegistry,
}

impl<'a> TypeConverter<'a> {
    pub fn new(
        catalog: &'a BuiltinCatalog,
        names: &'a NameTransformer,
        types: &'a TypeRegistry,
    ) -> Self {
        Self {
            catalog,
            names,
            types,
        }
    }

    /// Translates `expr`. `in_param` is set while converting a function
    /// parameter, where the outermost array decays to a pointer.
    pub fn to_type(&self, expr: &TypeExpr, in_param: bool) -> Result<TargetType> {
        match expr {
            TypeExpr::Builtin(key) => self.catalog.resolve_builtin(*key),
            TypeExpr::Pointer(inner) => {
                let inner = self.to_type(inner, false)?;
                Ok(match inner {
                    TargetType::Invalid => TargetType::OpaquePointer,
                    TargetType::Func(sig) => TargetType::Func(sig),
                    other => TargetType::ptr(other),
                })
            }
            TypeExpr::Array { elem, len } => {
                let elem = self.to_type(elem, false)?;
                if in_param {
                    return Ok(TargetType::ptr(elem));
                }
                let Some(len) = len else {
                    return Err(ConvertError::UnsupportedDescriptor(format!(
                        "{} without length",
                        expr.kind_name()
                    )));
                };
                match eval::eval_const(len) {
                    Some(n) if n >= 0 => Ok(TargetType::array(elem, n as u64)),
                    _ => Err(ConvertError::UnresolvedArrayLength {
                        len: len.to_string(),
                    }),
                }
            }
            TypeExpr::Func(func) => self.to_signature(func).map(TargetType::Func),
            TypeExpr::Named(named) => self.resolve_named(named),
            TypeExpr::Variadic => Ok(TargetType::VarArgs),
        }
    }

    /// Converts a function type. Parameters are converted in parameter
    /// context; a `void` return yields no results.
    pub fn to_signature(&self, func: &FuncType) -> Result<Signature> {
        let mut params = Vec::with_capacity(func.params.len() + 1);
        let mut variadic = func.variadic;
        for (i, field) in func.params.iter().enumerate() {
            if matches!(field.ty, TypeExpr::Variadic) {
                if i + 1 != func.params.len() {
                    return Err(ConvertError::UnsupportedDescriptor(format!(
                        "{} parameter before the end of the list",
                        field.ty.kind_name()
                    )));
                }
                variadic = true;
                break;
            }
            params.push(self.field_to_param(field, true)?);
        }
        if variadic {
            params.push(Param::new(
                Some(VA_LIST_NAME.to_string()),
                TargetType::VarArgs,
            ));
        }

        let ret = self.to_type(&func.ret, false)?;
        let results = if self.catalog.is_void(&ret) {
            Vec::new()
        } else {
            vec![ret]
        };
        Ok(Signature {
            params,
            variadic,
            results,
        })
    }

    pub fn field_to_param(&self, field: &Field, in_param: bool) -> Result<Param> {
        let ty = self.to_type(&field.ty, in_param)?;
        Ok(Param::new(field.name.clone(), ty))
    }

    /// Converts a struct/union/class body.
    ///
    /// Empty records get one pointer-sized placeholder field. A union keeps
    /// only its largest field, the later one on ties.
    pub fn record_to_struct(&self, tag: Tag, fields: &[Field]) -> Result<StructType> {
        if fields.is_empty() {
            return Ok(StructType {
                fields: vec![Param::new(
                    Some(PLACEHOLDER_FIELD.to_string()),
                    TargetType::array(Scalar::Uint8.into(), POINTER_SIZE),
                )],
            });
        }

        let converted = fields
            .iter()
            .map(|field| self.field_to_param(field, false))
            .collect::<Result<Vec<_>>>()?;

        if tag != Tag::Union {
            return Ok(StructType { fields: converted });
        }

        // walk from the last field so that on equal sizes the later one stays
        let mut largest: Option<Param> = None;
        let mut max_size = 0u64;
        for field in converted.into_iter().rev() {
            let size = sizes::size_of(&field.ty, self.types);
            if largest.is_none() || size > max_size {
                max_size = size;
                largest = Some(field);
            }
        }
        Ok(StructType {
            fields: largest.into_iter().collect(),
        })
    }

    fn resolve_named(&self, named: &NamedRef) -> Result<TargetType> {
        if named.name.is_empty() {
            return Err(ConvertError::UnsupportedDescriptor(
                "anonymous type reference".to_string(),
            ));
        }
        let trimmed = self.names.trim(&named.name);
        if let Some(alias) = self.catalog.resolve_alias(&trimmed) {
            return Ok(alias.resolved.clone());
        }
        let name = crate::name::to_upper_camel_case(&trimmed);
        if self.types.contains(&name) {
            trace!(source = %named.qualified(), target = %name, "resolved named type");
            return Ok(TargetType::Named(name));
        }
        Err(ConvertError::UnresolvedAlias(named.name.clone()))
    }

    /// Target name of a declared type: trimmed, then upper camel case.
    pub fn type_name(&self, name: &str) -> String {
        crate::name::to_upper_camel_case(&self.names.trim(name))
    }

    pub fn is_header_aliased(&self, header: &str) -> bool {
        self.catalog.is_header_aliased(header)
    }
}
