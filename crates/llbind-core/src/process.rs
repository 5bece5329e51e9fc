//! Declaration walk: export policy, target naming and type registration.

use llbind_ast::{
    AccessSpecifier, Decl, DeclKind, EnumItem, Field, FunctionDecl, FunctionKind, Tag, TypeExpr,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::{ConvertError, DeclError};
use crate::eval;
use crate::package::{Binding, ConstBinding, FuncBinding, TypeBinding};
use crate::registry::{NamedKind, NamedType};
use crate::session::Session;
use crate::symbol::{self, FuncName, SymbolInfo};
use crate::target::{StructType, TargetType};

/// Whether the walker should visit a declaration's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
}

/// An enclosing namespace or record.
#[derive(Debug, Clone)]
struct Scope {
    name: String,
    is_record: bool,
}

impl Scope {
    fn of(decl: &Decl) -> Option<Scope> {
        match &decl.kind {
            DeclKind::Namespace { name: Some(name) } => Some(Scope {
                name: name.clone(),
                is_record: false,
            }),
            DeclKind::Record { name, .. } if !name.is_empty() => Some(Scope {
                name: name.clone(),
                is_record: true,
            }),
            _ => None,
        }
    }
}

/// Depth-first walk over one translation unit.
pub(crate) struct SymbolProcessor<'s> {
    session: &'s mut Session,
    file: &'s str,
    scope: Vec<Scope>,
    /// False for headers that only redeclare catalog aliases
    emit: bool,
}

impl<'s> SymbolProcessor<'s> {
    pub(crate) fn new(session: &'s mut Session, file: &'s str) -> Self {
        let emit = !session.catalog.is_header_aliased(file);
        if !emit {
            debug!(file, "header only declares known aliases, no bindings emitted");
        }
        Self {
            session,
            file,
            scope: Vec::new(),
            emit,
        }
    }

    pub(crate) fn run(&mut self, decls: &[Decl]) {
        self.walk(decls);
    }

    fn walk(&mut self, decls: &[Decl]) {
        for decl in decls {
            if self.visit(decl) == Walk::Skip {
                continue;
            }
            let scope = Scope::of(decl);
            let pushed = scope.is_some();
            self.scope.extend(scope);
            self.walk(&decl.children);
            if pushed {
                self.scope.pop();
            }
        }
    }

    fn visit(&mut self, decl: &Decl) -> Walk {
        match &decl.kind {
            DeclKind::Namespace { .. } | DeclKind::LinkageSpec => Walk::Descend,
            DeclKind::Record { name, tag, fields } => {
                self.visit_record(decl, name, *tag, fields);
                Walk::Descend
            }
            DeclKind::Function(func) => {
                self.visit_function(decl, func);
                Walk::Skip
            }
            DeclKind::Enum { name, items } => {
                self.visit_enum(decl, name.as_deref(), items);
                Walk::Skip
            }
            DeclKind::Typedef { name, underlying } => {
                self.visit_typedef(decl, name, underlying);
                Walk::Skip
            }
            DeclKind::Unknown(kind) => {
                trace!(kind = %kind, "skipping unmodeled declaration");
                Walk::Skip
            }
        }
    }

    fn in_current_file(&self, decl: &Decl) -> bool {
        decl.file() == Some(self.file)
    }

    fn enclosing_record(&self) -> Option<&str> {
        self.scope
            .last()
            .filter(|s| s.is_record)
            .map(|s| s.name.as_str())
    }

    fn qualified(&self, name: &str) -> String {
        let mut parts: Vec<&str> = self.scope.iter().map(|s| s.name.as_str()).collect();
        parts.push(name);
        parts.join("::")
    }

    /// Records a failure for a declaration of this file. Failures of
    /// declarations pulled in from other headers are reported when that
    /// header is processed.
    fn fail(&mut self, decl: &Decl, name: String, err: ConvertError) {
        if !self.in_current_file(decl) {
            trace!(decl = %name, error = %err, "failed to convert included declaration");
            return;
        }
        warn!(decl = %name, file = self.file, error = %err, "skipping declaration");
        self.session
            .diagnostics
            .push(DeclError::new(name, self.file, err));
    }

    fn is_exported(func: &FunctionDecl, decl: &Decl) -> bool {
        match func.kind {
            FunctionKind::Method => decl.access == AccessSpecifier::Public,
            FunctionKind::Free | FunctionKind::Constructor | FunctionKind::Destructor => true,
        }
    }

    fn visit_function(&mut self, decl: &Decl, func: &FunctionDecl) {
        if !self.in_current_file(decl) || !Self::is_exported(func, decl) {
            return;
        }
        let qualified = self.qualified(&func.display_name);
        let signature = match self.session.converter().to_signature(&func.ty) {
            Ok(sig) => sig,
            Err(err) => return self.fail(decl, qualified, err),
        };

        let key = symbol::undecorate(&func.mangled_name, self.session.decoration).to_string();
        let target_name = match self.session.overrides.get(&key) {
            Some(name) => name.clone(),
            None => {
                let candidate = self.candidate_name(func);
                let claimed = self.session.counter.claim(&candidate);
                if claimed != candidate {
                    debug!(%candidate, name = %claimed, "target name collision");
                }
                claimed
            }
        };

        let info = SymbolInfo {
            target_name: target_name.clone(),
            qualified_name: qualified,
        };
        trace!(mangled = %key, target = %target_name, "indexed symbol");
        if let Some(prev) = self.session.symbols.insert(key.clone(), info) {
            debug!(mangled = %key, previous = %prev.target_name, "mangled name overwritten");
        }

        if self.emit {
            let binding = FuncBinding {
                name: FuncName::parse(&target_name),
                link_name: key,
                signature,
                doc: decl.doc.clone(),
            };
            self.session.package.push(self.file, Binding::Func(binding));
        }
    }

    /// Target name before collision counting.
    fn candidate_name(&self, func: &FunctionDecl) -> String {
        let names = &self.session.names;
        let raw = match func.kind {
            FunctionKind::Destructor => func.name.strip_prefix('~').unwrap_or(&func.name),
            _ => func.name.as_str(),
        };
        let converted = names.target_name(raw);
        let Some(class) = self.enclosing_record() else {
            return converted;
        };
        let class = names.target_name(class);
        let method = match func.kind {
            FunctionKind::Destructor => "Dispose".to_string(),
            FunctionKind::Constructor if converted == class => "Init".to_string(),
            _ => converted,
        };
        FuncName::method(class, method).to_string()
    }

    fn visit_record(&mut self, decl: &Decl, name: &str, tag: Tag, fields: &[Field]) {
        if name.is_empty() {
            return;
        }
        let target = self.session.converter().type_name(name);
        if !self.session.types.contains(&target) {
            // registered first so self-referencing fields resolve
            self.session.types.register(NamedType {
                name: target.clone(),
                kind: NamedKind::Struct,
                underlying: TargetType::Struct(StructType::default()),
            });
            match self.session.converter().record_to_struct(tag, fields) {
                Ok(st) => {
                    trace!(name = %target, "registered record");
                    self.session.types.update(&target, TargetType::Struct(st));
                }
                Err(err) => {
                    self.session.types.remove(&target);
                    return self.fail(decl, self.qualified(name), err);
                }
            }
        }
        self.emit_type(decl, &target);
    }

    fn visit_typedef(&mut self, decl: &Decl, name: &str, underlying: &TypeExpr) {
        let trimmed = self.session.names.trim(name);
        if self.session.catalog.resolve_alias(&trimmed).is_some() {
            return;
        }
        let target = self.session.converter().type_name(name);
        if let TypeExpr::Named(named) = underlying {
            if named.tag.is_some() && self.session.converter().type_name(&named.name) == target {
                // typedef struct Foo Foo; the record carries the binding
                return;
            }
        }
        if !self.session.types.contains(&target) {
            let ty = match self.session.converter().to_type(underlying, false) {
                Ok(ty) => ty,
                Err(err) => return self.fail(decl, self.qualified(name), err),
            };
            if ty == TargetType::Named(target.clone()) {
                // typedef struct Foo Foo;
                return;
            }
            trace!(name = %target, underlying = %ty, "registered typedef");
            self.session.types.register(NamedType {
                name: target.clone(),
                kind: NamedKind::Alias,
                underlying: ty,
            });
        }
        self.emit_type(decl, &target);
    }

    fn visit_enum(&mut self, decl: &Decl, name: Option<&str>, items: &[EnumItem]) {
        let values = match enum_values(items) {
            Ok(values) => values,
            Err(err) => {
                let label = self.qualified(name.unwrap_or("(anonymous enum)"));
                return self.fail(decl, label, err);
            }
        };

        let enum_ty = self.session.catalog.default_enum_type();
        let prefix = match name {
            Some(name) if !name.is_empty() => {
                let target = self.session.converter().type_name(name);
                self.session.types.register(NamedType {
                    name: target.clone(),
                    kind: NamedKind::Enum,
                    underlying: enum_ty.clone(),
                });
                self.emit_type(decl, &target);
                Some(enum_const_prefix(&self.session.names.trim(name)))
            }
            _ => None,
        };

        if !self.emit || !self.in_current_file(decl) {
            return;
        }
        for (item, value) in items.iter().zip(values) {
            let const_name = match &prefix {
                Some(prefix) => format!("{prefix}_{}", item.name),
                None => item.name.clone(),
            };
            self.session.package.push(
                self.file,
                Binding::Const(ConstBinding {
                    name: const_name,
                    value,
                    ty: enum_ty.clone(),
                }),
            );
        }
    }

    /// Adds a binding for a registered type declared in this file, once.
    fn emit_type(&mut self, decl: &Decl, target: &str) {
        if !self.emit || !self.in_current_file(decl) || self.session.emitted.contains(target) {
            return;
        }
        let Some(named) = self.session.types.get(target) else {
            return;
        };
        let binding = TypeBinding {
            name: named.name.clone(),
            kind: named.kind,
            underlying: named.underlying.clone(),
            doc: decl.doc.clone(),
        };
        self.session.emitted.insert(target.to_string());
        self.session.package.push(self.file, Binding::Type(binding));
    }
}

/// Enumerator values: explicit ones are evaluated, the rest continue from
/// the previous value.
fn enum_values(items: &[EnumItem]) -> Result<Vec<i64>, ConvertError> {
    let mut seen: FxHashMap<&str, i64> = FxHashMap::default();
    let mut values = Vec::with_capacity(items.len());
    let mut next = 0i64;
    for item in items {
        let value = match &item.value {
            Some(expr) => eval::eval_int(expr, &|name: &str| seen.get(name).copied())
                .ok_or_else(|| {
                    ConvertError::UnsupportedDescriptor(format!(
                        "enumerator value `{}` of `{}`",
                        expr, item.name
                    ))
                })?,
            None => next,
        };
        seen.insert(item.name.as_str(), value);
        values.push(value);
        next = value.wrapping_add(1);
    }
    Ok(values)
}

/// `PieceType` -> `Piecetype`, `spectrum` -> `Spectrum`.
fn enum_const_prefix(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llbind_ast::Expr;

    #[test]
    fn test_enum_values_auto_increment() {
        let items = [
            EnumItem::new("cat"),
            EnumItem::with_value("lynx", Expr::int(10)),
            EnumItem::new("puma"),
            EnumItem::new("tiger"),
        ];
        assert_eq!(enum_values(&items).unwrap(), [0, 10, 11, 12]);
    }

    #[test]
    fn test_enum_values_reference_earlier_items() {
        let items = [
            EnumItem::with_value("A", Expr::lit("0x10")),
            EnumItem::with_value("B", Expr::Ident("A".into())),
            EnumItem::new("C"),
            EnumItem::with_value("D", Expr::Neg(Box::new(Expr::int(1)))),
            EnumItem::new("E"),
        ];
        assert_eq!(enum_values(&items).unwrap(), [16, 16, 17, -1, 0]);
    }

    #[test]
    fn test_enum_values_unresolvable() {
        let items = [EnumItem::with_value("A", Expr::Ident("LATER".into()))];
        assert!(matches!(
            enum_values(&items),
            Err(ConvertError::UnsupportedDescriptor(_))
        ));
    }

    #[test]
    fn test_enum_const_prefix() {
        assert_eq!(enum_const_prefix("spectrum"), "Spectrum");
        assert_eq!(enum_const_prefix("PieceType"), "Piecetype");
        assert_eq!(enum_const_prefix(""), "");
    }
}
