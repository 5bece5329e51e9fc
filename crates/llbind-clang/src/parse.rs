//! Clang parsing and cursor lowering.

use clang_sys::*;
use llbind_ast::{
    AccessSpecifier, BuiltinFlags, BuiltinKind, BuiltinType, Decl, DeclKind, EnumItem, Expr,
    Field, FuncType, FunctionDecl, FunctionKind, Location, NamedRef, Tag, TranslationUnit,
    TypeExpr,
};
use miette::{miette, Result};
use rustc_hash::FxHashSet;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint, c_ulong};
use std::path::Path;
use std::ptr;
use tracing::{debug, trace};

/// How a header is parsed.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Parse as C++ instead of C.
    pub cplusplus: bool,
    /// Extra compiler arguments (`-I`, `-D`, ...).
    pub args: Vec<String>,
}

impl ParseOptions {
    pub fn c() -> Self {
        Self::default()
    }

    pub fn cplusplus() -> Self {
        Self {
            cplusplus: true,
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    fn command_line(&self) -> Vec<String> {
        let mut args: Vec<String> = if self.cplusplus {
            vec!["-x".into(), "c++".into(), "-std=c++17".into()]
        } else {
            vec!["-x".into(), "c".into()]
        };
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Parser for C and C++ headers using libclang.
pub struct ClangParser {
    index: CXIndex,
}

impl ClangParser {
    /// Create a new parser, loading libclang if needed.
    pub fn new() -> Result<Self> {
        if !clang_sys::is_loaded() {
            clang_sys::load().map_err(|e| miette!("Failed to load libclang: {}", e))?;
        }
        let index = unsafe { clang_createIndex(0, 0) };
        if index.is_null() {
            return Err(miette!("Failed to create clang index"));
        }
        Ok(Self { index })
    }

    /// Parse a header file.
    pub fn parse_file(&self, path: &Path, opts: &ParseOptions) -> Result<TranslationUnit> {
        let path_str = path
            .to_str()
            .ok_or_else(|| miette!("Invalid path: {:?}", path))?;
        let c_path = CString::new(path_str).map_err(|e| miette!("Invalid path: {}", e))?;
        self.parse(path_str, &c_path, &mut [], opts)
    }

    /// Parse source text as if it were the file `filename`.
    pub fn parse_string(
        &self,
        source: &str,
        filename: &str,
        opts: &ParseOptions,
    ) -> Result<TranslationUnit> {
        let c_filename = CString::new(filename).map_err(|e| miette!("Invalid filename: {}", e))?;
        let c_source = CString::new(source).map_err(|e| miette!("Invalid source: {}", e))?;
        let mut unsaved = [CXUnsavedFile {
            Filename: c_filename.as_ptr(),
            Contents: c_source.as_ptr(),
            Length: source.len() as c_ulong,
        }];
        self.parse(filename, &c_filename, &mut unsaved, opts)
    }

    fn parse(
        &self,
        path: &str,
        c_path: &CString,
        unsaved: &mut [CXUnsavedFile],
        opts: &ParseOptions,
    ) -> Result<TranslationUnit> {
        let args = opts.command_line();
        let c_args: Vec<CString> = args
            .iter()
            .map(|s| CString::new(s.as_str()))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| miette!("Invalid argument: {}", e))?;
        let c_arg_ptrs: Vec<*const c_char> = c_args.iter().map(|s| s.as_ptr()).collect();

        let unit = unsafe {
            clang_parseTranslationUnit(
                self.index,
                c_path.as_ptr(),
                c_arg_ptrs.as_ptr(),
                c_arg_ptrs.len() as c_int,
                if unsaved.is_empty() {
                    ptr::null_mut()
                } else {
                    unsaved.as_mut_ptr()
                },
                unsaved.len() as c_uint,
                CXTranslationUnit_SkipFunctionBodies,
            )
        };
        if unit.is_null() {
            return Err(miette!("Failed to parse {}", path));
        }

        let result = check_diagnostics(unit, path).map(|()| {
            let cursor = unsafe { clang_getTranslationUnitCursor(unit) };
            let mut builder = DeclBuilder::default();
            let decls = builder.build_decls(cursor);
            debug!(file = path, decls = decls.len(), "parsed header");
            TranslationUnit::new(path, decls)
        });

        unsafe { clang_disposeTranslationUnit(unit) };
        result
    }
}

impl Drop for ClangParser {
    fn drop(&mut self) {
        unsafe { clang_disposeIndex(self.index) };
    }
}

fn check_diagnostics(unit: CXTranslationUnit, path: &str) -> Result<()> {
    let num_diagnostics = unsafe { clang_getNumDiagnostics(unit) };
    let mut errors = Vec::new();
    for i in 0..num_diagnostics {
        let diag = unsafe { clang_getDiagnostic(unit, i) };
        let severity = unsafe { clang_getDiagnosticSeverity(diag) };
        let spelling = cx_string_to_string(unsafe { clang_getDiagnosticSpelling(diag) });
        if severity >= CXDiagnostic_Error {
            errors.push(spelling);
        } else {
            trace!(file = path, "clang: {}", spelling);
        }
        unsafe { clang_disposeDiagnostic(diag) };
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(miette!("Parse errors in {}:\n{}", path, errors.join("\n")))
    }
}

/// Lowers a cursor tree into declarations.
#[derive(Default)]
struct DeclBuilder {
    /// USRs of records and enums already lowered
    seen: FxHashSet<String>,
}

impl DeclBuilder {
    fn build_decls(&mut self, parent: CXCursor) -> Vec<Decl> {
        let cursors = children(parent);
        let mut decls = Vec::new();
        for (i, &cursor) in cursors.iter().enumerate() {
            // implicit builtins (__int128_t, __builtin_va_list, ...) have no file
            if get_location(cursor).file.is_none() {
                continue;
            }
            let kind = unsafe { clang_getCursorKind(cursor) };
            let decl = match kind {
                CXCursor_Namespace => {
                    let name = (!is_anonymous(cursor)).then(|| cursor_spelling(cursor));
                    let children = self.build_decls(cursor);
                    Some(self.decl(cursor, DeclKind::Namespace { name }).with_children(children))
                }
                CXCursor_LinkageSpec => {
                    let children = self.build_decls(cursor);
                    Some(self.decl(cursor, DeclKind::LinkageSpec).with_children(children))
                }
                CXCursor_StructDecl | CXCursor_UnionDecl | CXCursor_ClassDecl => {
                    if is_anonymous(cursor) {
                        // lowered under the typedef's name, if any
                        None
                    } else {
                        self.build_record(cursor, cursor_spelling(cursor))
                    }
                }
                CXCursor_EnumDecl => {
                    if !is_anonymous(cursor) {
                        self.build_enum(cursor, Some(cursor_spelling(cursor)))
                    } else if named_by_typedef(cursor, &cursors[i + 1..]) {
                        None
                    } else {
                        self.build_enum(cursor, None)
                    }
                }
                CXCursor_FunctionDecl
                | CXCursor_CXXMethod
                | CXCursor_Constructor
                | CXCursor_Destructor => self.build_function(cursor, kind),
                CXCursor_TypedefDecl => {
                    decls.extend(self.build_typedef(cursor));
                    None
                }
                // fields and access labels are read by build_record
                CXCursor_FieldDecl | CXCursor_CXXAccessSpecifier => None,
                _ => {
                    let spelling =
                        cx_string_to_string(unsafe { clang_getCursorKindSpelling(kind) });
                    Some(self.decl(cursor, DeclKind::Unknown(spelling)))
                }
            };
            decls.extend(decl);
        }
        decls
    }

    fn decl(&self, cursor: CXCursor, kind: DeclKind) -> Decl {
        let mut decl = Decl::new(kind, String::new());
        decl.location = get_location(cursor);
        decl.access = get_access_specifier(cursor);
        decl.doc = raw_comment(cursor);
        decl
    }

    /// Marks a record or enum as lowered; false if it already was.
    fn first_sight(&mut self, cursor: CXCursor) -> bool {
        let usr = cx_string_to_string(unsafe { clang_getCursorUSR(cursor) });
        usr.is_empty() || self.seen.insert(usr)
    }

    /// Lowers a record at its first declaration, with the members of its
    /// definition when there is one. Later redeclarations are dropped.
    fn build_record(&mut self, cursor: CXCursor, name: String) -> Option<Decl> {
        if !self.first_sight(cursor) {
            return None;
        }
        let definition = unsafe { clang_getCursorDefinition(cursor) };
        let source = if unsafe { clang_Cursor_isNull(definition) } != 0 {
            cursor
        } else {
            definition
        };

        let tag = match unsafe { clang_getCursorKind(source) } {
            CXCursor_UnionDecl => Tag::Union,
            CXCursor_ClassDecl => Tag::Class,
            _ => Tag::Struct,
        };
        let fields = children(source)
            .into_iter()
            .filter(|&c| unsafe { clang_getCursorKind(c) } == CXCursor_FieldDecl)
            .map(|c| {
                let ty = unsafe { clang_getCursorType(c) };
                Field::new(cursor_spelling(c), convert_type(ty))
            })
            .collect();
        let children = self.build_decls(source);
        trace!(record = %name, "lowered record");
        Some(
            self.decl(source, DeclKind::Record { name, tag, fields })
                .with_children(children),
        )
    }

    fn build_enum(&mut self, cursor: CXCursor, name: Option<String>) -> Option<Decl> {
        if !self.first_sight(cursor) {
            return None;
        }
        let items = children(cursor)
            .into_iter()
            .filter(|&c| unsafe { clang_getCursorKind(c) } == CXCursor_EnumConstantDecl)
            .map(|c| {
                let value = unsafe { clang_getEnumConstantDeclValue(c) };
                EnumItem::with_value(cursor_spelling(c), Expr::int(value))
            })
            .collect();
        Some(self.decl(cursor, DeclKind::Enum { name, items }))
    }

    fn build_function(&mut self, cursor: CXCursor, kind: CXCursorKind) -> Option<Decl> {
        // out-of-line member definitions repeat an in-class declaration
        let semantic = unsafe { clang_getCursorSemanticParent(cursor) };
        let lexical = unsafe { clang_getCursorLexicalParent(cursor) };
        if unsafe { clang_equalCursors(semantic, lexical) } == 0 {
            return None;
        }

        let kind = match kind {
            CXCursor_CXXMethod => FunctionKind::Method,
            CXCursor_Constructor => FunctionKind::Constructor,
            CXCursor_Destructor => FunctionKind::Destructor,
            _ => FunctionKind::Free,
        };
        let cursor_type = unsafe { clang_getCursorType(cursor) };
        let num_args = unsafe { clang_Cursor_getNumArguments(cursor) }.max(0) as c_uint;
        let params = (0..num_args)
            .map(|i| {
                let arg = unsafe { clang_Cursor_getArgument(cursor, i) };
                let ty = convert_type(unsafe { clang_getCursorType(arg) });
                let name = cursor_spelling(arg);
                if name.is_empty() {
                    Field::unnamed(ty)
                } else {
                    Field::new(name, ty)
                }
            })
            .collect();
        let ret = convert_type(unsafe { clang_getCursorResultType(cursor) });
        let mut ty = FuncType::new(params, ret);
        ty.variadic = unsafe { clang_isFunctionTypeVariadic(cursor_type) } != 0;

        let name = cursor_spelling(cursor);
        let mangled = cx_string_to_string(unsafe { clang_Cursor_getMangling(cursor) });
        let display = cx_string_to_string(unsafe { clang_getCursorDisplayName(cursor) });
        let mut func = FunctionDecl::free(name, ty)
            .with_kind(kind)
            .with_display(display);
        if !mangled.is_empty() {
            func = func.with_mangled(mangled);
        }
        Some(self.decl(cursor, DeclKind::Function(func)))
    }

    /// `typedef struct { ... } Name;` becomes a record named `Name`; other
    /// typedefs are kept as aliases, preceded by the tagged type they name
    /// if it was not lowered yet.
    fn build_typedef(&mut self, cursor: CXCursor) -> Vec<Decl> {
        let name = cursor_spelling(cursor);
        let underlying = unsafe { clang_getTypedefDeclUnderlyingType(cursor) };
        let named = strip_elaborated(underlying);
        let mut decls = Vec::new();
        if matches!(named.kind, CXType_Record | CXType_Enum) {
            let target = unsafe { clang_getTypeDeclaration(named) };
            let (tag_name, anonymous) = if is_anonymous(target) {
                (name.clone(), true)
            } else {
                (cursor_spelling(target), false)
            };
            let lowered = if named.kind == CXType_Record {
                self.build_record(target, tag_name)
            } else {
                self.build_enum(target, Some(tag_name))
            };
            match lowered {
                Some(decl) if anonymous => return vec![decl],
                lowered => decls.extend(lowered),
            }
        }
        let underlying = convert_type(underlying);
        decls.push(self.decl(cursor, DeclKind::Typedef { name, underlying }));
        decls
    }
}

/// True if one of `siblings` is a typedef naming the anonymous `cursor`.
fn named_by_typedef(cursor: CXCursor, siblings: &[CXCursor]) -> bool {
    siblings.iter().any(|&sibling| unsafe {
        if clang_getCursorKind(sibling) != CXCursor_TypedefDecl {
            return false;
        }
        let named = strip_elaborated(clang_getTypedefDeclUnderlyingType(sibling));
        clang_equalCursors(clang_getTypeDeclaration(named), cursor) != 0
    })
}

fn children(parent: CXCursor) -> Vec<CXCursor> {
    extern "C" fn visitor(
        cursor: CXCursor,
        _parent: CXCursor,
        data: CXClientData,
    ) -> CXChildVisitResult {
        let out = unsafe { &mut *(data as *mut Vec<CXCursor>) };
        out.push(cursor);
        CXChildVisit_Continue
    }

    let mut out: Vec<CXCursor> = Vec::new();
    unsafe {
        clang_visitChildren(
            parent,
            visitor,
            &mut out as *mut Vec<CXCursor> as CXClientData,
        );
    }
    out
}

fn convert_type(ty: CXType) -> TypeExpr {
    use BuiltinKind as K;
    let builtin = |kind, flags| TypeExpr::Builtin(BuiltinType::with_flags(kind, flags));
    let none = BuiltinFlags::empty();

    match ty.kind {
        CXType_Void => builtin(K::Void, none),
        CXType_Bool => builtin(K::Bool, none),
        CXType_Char_S | CXType_SChar => builtin(K::Char, BuiltinFlags::SIGNED),
        CXType_Char_U | CXType_UChar => builtin(K::Char, BuiltinFlags::UNSIGNED),
        CXType_WChar => builtin(K::WChar, none),
        CXType_Char16 => builtin(K::Char16, none),
        CXType_Char32 => builtin(K::Char32, none),
        CXType_Short => builtin(K::Int, BuiltinFlags::SHORT),
        CXType_UShort => builtin(K::Int, BuiltinFlags::SHORT | BuiltinFlags::UNSIGNED),
        CXType_Int => builtin(K::Int, none),
        CXType_UInt => builtin(K::Int, BuiltinFlags::UNSIGNED),
        CXType_Long => builtin(K::Int, BuiltinFlags::LONG),
        CXType_ULong => builtin(K::Int, BuiltinFlags::LONG | BuiltinFlags::UNSIGNED),
        CXType_LongLong => builtin(K::Int, BuiltinFlags::LONG_LONG),
        CXType_ULongLong => builtin(K::Int, BuiltinFlags::LONG_LONG | BuiltinFlags::UNSIGNED),
        CXType_Float => builtin(K::Float, none),
        CXType_Double => builtin(K::Float, BuiltinFlags::DOUBLE),
        CXType_LongDouble => builtin(K::Float, BuiltinFlags::DOUBLE | BuiltinFlags::LONG),
        CXType_Complex => {
            let elem = unsafe { clang_getElementType(ty) };
            match elem.kind {
                CXType_Float => builtin(K::Complex, none),
                CXType_Double => builtin(K::Complex, BuiltinFlags::DOUBLE),
                _ => builtin(K::Complex, BuiltinFlags::DOUBLE | BuiltinFlags::LONG),
            }
        }
        CXType_Pointer | CXType_LValueReference | CXType_RValueReference => {
            let pointee = unsafe { clang_getPointeeType(ty) };
            TypeExpr::ptr(convert_type(pointee))
        }
        CXType_ConstantArray => {
            let elem = unsafe { clang_getArrayElementType(ty) };
            let size = unsafe { clang_getArraySize(ty) };
            TypeExpr::array(convert_type(elem), Some(Expr::int(size)))
        }
        CXType_IncompleteArray | CXType_VariableArray | CXType_DependentSizedArray => {
            let elem = unsafe { clang_getArrayElementType(ty) };
            TypeExpr::array(convert_type(elem), None)
        }
        CXType_FunctionProto => {
            let num_args = unsafe { clang_getNumArgTypes(ty) }.max(0) as c_uint;
            let params = (0..num_args)
                .map(|i| Field::unnamed(convert_type(unsafe { clang_getArgType(ty, i) })))
                .collect();
            let ret = convert_type(unsafe { clang_getResultType(ty) });
            let mut func = FuncType::new(params, ret);
            func.variadic = unsafe { clang_isFunctionTypeVariadic(ty) } != 0;
            TypeExpr::Func(func)
        }
        CXType_FunctionNoProto => {
            let ret = convert_type(unsafe { clang_getResultType(ty) });
            TypeExpr::Func(FuncType::new(Vec::new(), ret))
        }
        CXType_Elaborated => convert_type(unsafe { clang_Type_getNamedType(ty) }),
        CXType_Attributed => convert_type(unsafe { clang_Type_getModifiedType(ty) }),
        CXType_Typedef => {
            let decl = unsafe { clang_getTypeDeclaration(ty) };
            TypeExpr::Named(NamedRef {
                name: cursor_spelling(decl),
                scope: build_scope_path(decl),
                tag: None,
            })
        }
        CXType_Record | CXType_Enum => {
            let decl = unsafe { clang_getTypeDeclaration(ty) };
            let tag = match unsafe { clang_getCursorKind(decl) } {
                CXCursor_UnionDecl => Tag::Union,
                CXCursor_ClassDecl => Tag::Class,
                CXCursor_EnumDecl => Tag::Enum,
                _ => Tag::Struct,
            };
            // anonymous types have no usable name
            let name = if is_anonymous(decl) {
                String::new()
            } else {
                cursor_spelling(decl)
            };
            TypeExpr::Named(NamedRef {
                name,
                scope: build_scope_path(decl),
                tag: Some(tag),
            })
        }
        CXType_Unexposed => {
            let canonical = unsafe { clang_getCanonicalType(ty) };
            if canonical.kind == CXType_Unexposed {
                TypeExpr::named(type_spelling(ty))
            } else {
                convert_type(canonical)
            }
        }
        // unresolvable by name; reported when the type is converted
        _ => TypeExpr::named(type_spelling(ty)),
    }
}

fn strip_elaborated(ty: CXType) -> CXType {
    if ty.kind == CXType_Elaborated {
        unsafe { clang_Type_getNamedType(ty) }
    } else {
        ty
    }
}

fn get_location(cursor: CXCursor) -> Location {
    let location = unsafe { clang_getCursorLocation(cursor) };
    let mut file: CXFile = ptr::null_mut();
    let mut line: c_uint = 0;
    let mut column: c_uint = 0;
    unsafe {
        clang_getSpellingLocation(location, &mut file, &mut line, &mut column, ptr::null_mut());
    }
    let file = if file.is_null() {
        None
    } else {
        Some(cx_string_to_string(unsafe { clang_getFileName(file) }))
    };
    Location { file, line, column }
}

fn get_access_specifier(cursor: CXCursor) -> AccessSpecifier {
    let access = unsafe { clang_getCXXAccessSpecifier(cursor) };
    match access {
        CX_CXXPublic => AccessSpecifier::Public,
        CX_CXXProtected => AccessSpecifier::Protected,
        CX_CXXPrivate => AccessSpecifier::Private,
        // not a class member
        _ => AccessSpecifier::Public,
    }
}

/// Enclosing namespaces and classes of a declaration, outermost first.
fn build_scope_path(cursor: CXCursor) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = unsafe { clang_getCursorSemanticParent(cursor) };
    loop {
        let kind = unsafe { clang_getCursorKind(current) };
        match kind {
            CXCursor_Namespace | CXCursor_StructDecl | CXCursor_ClassDecl | CXCursor_UnionDecl => {
                if !is_anonymous(current) {
                    path.push(cursor_spelling(current));
                }
            }
            CXCursor_TranslationUnit => break,
            _ if unsafe { clang_Cursor_isNull(current) } != 0 => break,
            _ => {}
        }
        current = unsafe { clang_getCursorSemanticParent(current) };
    }
    path.reverse();
    path
}

fn is_anonymous(cursor: CXCursor) -> bool {
    unsafe { clang_Cursor_isAnonymous(cursor) != 0 }
}

fn raw_comment(cursor: CXCursor) -> Option<String> {
    let text = cx_string_to_string(unsafe { clang_Cursor_getRawCommentText(cursor) });
    (!text.is_empty()).then_some(text)
}

fn cx_string_to_string(cx_str: CXString) -> String {
    unsafe {
        let c_str = clang_getCString(cx_str);
        let result = if c_str.is_null() {
            String::new()
        } else {
            CStr::from_ptr(c_str).to_string_lossy().into_owned()
        };
        clang_disposeString(cx_str);
        result
    }
}

fn cursor_spelling(cursor: CXCursor) -> String {
    cx_string_to_string(unsafe { clang_getCursorSpelling(cursor) })
}

fn type_spelling(ty: CXType) -> String {
    cx_string_to_string(unsafe { clang_getTypeSpelling(ty) })
}
