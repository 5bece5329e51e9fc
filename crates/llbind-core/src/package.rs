//! Converted bindings grouped by output file.

use std::path::Path;

use indexmap::IndexMap;

use crate::registry::NamedKind;
use crate::symbol::FuncName;
use crate::target::{Signature, TargetType};

/// Binding for an exported function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncBinding {
    pub name: FuncName,
    /// Undecorated link-time symbol
    pub link_name: String,
    pub signature: Signature,
    pub doc: Option<String>,
}

/// Binding for a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBinding {
    pub name: String,
    pub kind: NamedKind,
    pub underlying: TargetType,
    pub doc: Option<String>,
}

/// Binding for an enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstBinding {
    pub name: String,
    pub value: i64,
    pub ty: TargetType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Func(FuncBinding),
    Type(TypeBinding),
    Const(ConstBinding),
}

impl Binding {
    pub fn name(&self) -> String {
        match self {
            Binding::Func(f) => f.name.to_string(),
            Binding::Type(t) => t.name.clone(),
            Binding::Const(c) => c.name.clone(),
        }
    }
}

/// Bindings generated from one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub header: String,
    pub bindings: Vec<Binding>,
}

impl PackageFile {
    pub fn funcs(&self) -> impl Iterator<Item = &FuncBinding> {
        self.bindings.iter().filter_map(|b| match b {
            Binding::Func(f) => Some(f),
            _ => None,
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeBinding> {
        self.bindings.iter().filter_map(|b| match b {
            Binding::Type(t) => Some(t),
            _ => None,
        })
    }

    pub fn consts(&self) -> impl Iterator<Item = &ConstBinding> {
        self.bindings.iter().filter_map(|b| match b {
            Binding::Const(c) => Some(c),
            _ => None,
        })
    }

    /// Output file stem: `foo/bar.h` -> `bar`.
    pub fn output_name(&self) -> String {
        output_file_name(&self.header)
    }
}

/// All bindings of a run, one file per header in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct Package {
    files: IndexMap<String, PackageFile>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: &str, binding: Binding) {
        self.files
            .entry(header.to_string())
            .or_insert_with(|| PackageFile {
                header: header.to_string(),
                bindings: Vec::new(),
            })
            .bindings
            .push(binding);
    }

    pub fn file(&self, header: &str) -> Option<&PackageFile> {
        self.files.get(header)
    }

    pub fn files(&self) -> impl Iterator<Item = &PackageFile> {
        self.files.values()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Every binding in the package, file by file.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.files.values().flat_map(|f| f.bindings.iter())
    }
}

/// File stem of a header path.
pub fn output_file_name(header: &str) -> String {
    Path::new(header)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| header.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Scalar;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("/usr/include/lua/lua.h"), "lua");
        assert_eq!(output_file_name("cJSON.h"), "cJSON");
        assert_eq!(output_file_name("noext"), "noext");
    }

    #[test]
    fn test_files_keep_first_appearance_order() {
        let mut pkg = Package::new();
        let konst = |name: &str| {
            Binding::Const(ConstBinding {
                name: name.into(),
                value: 0,
                ty: Scalar::Int.into(),
            })
        };
        pkg.push("b.h", konst("B1"));
        pkg.push("a.h", konst("A1"));
        pkg.push("b.h", konst("B2"));

        let headers: Vec<_> = pkg.files().map(|f| f.header.as_str()).collect();
        assert_eq!(headers, ["b.h", "a.h"]);
        let names: Vec<_> = pkg.bindings().map(Binding::name).collect();
        assert_eq!(names, ["B1", "B2", "A1"]);
        assert_eq!(pkg.file("b.h").unwrap().consts().count(), 2);
    }
}
