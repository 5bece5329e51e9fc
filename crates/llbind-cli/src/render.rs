//! Plain-text rendering of package files for `llbind dump`.

use std::fmt::Write;

use llbind_core::{Binding, PackageFile};

/// Renders one package file: types, constants and functions in declaration
/// order, each function followed by its link name.
pub fn render_file(file: &PackageFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// {} ({})", file.output_name(), file.header);
    for binding in &file.bindings {
        match binding {
            Binding::Type(ty) => {
                write_doc(&mut out, ty.doc.as_deref());
                let _ = writeln!(out, "type {} {}", ty.name, ty.underlying);
            }
            Binding::Const(c) => {
                let _ = writeln!(out, "const {} {} = {}", c.name, c.ty, c.value);
            }
            Binding::Func(func) => {
                write_doc(&mut out, func.doc.as_deref());
                let signature = func.signature.to_string();
                let signature = signature.strip_prefix("func").unwrap_or(&signature);
                let _ = writeln!(out, "func {}{} // {}", func.name, signature, func.link_name);
            }
        }
    }
    out
}

fn write_doc(out: &mut String, doc: Option<&str>) {
    let Some(doc) = doc else {
        return;
    };
    for line in doc.lines() {
        let _ = writeln!(out, "{}", line.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llbind_core::{
        ConstBinding, FuncBinding, FuncName, NamedKind, Param, Scalar, Signature, StructType,
        TargetType, TypeBinding,
    };

    #[test]
    fn test_render_file() {
        let state = TargetType::named("State");
        let file = PackageFile {
            header: "/usr/include/lua.h".to_string(),
            bindings: vec![
                Binding::Type(TypeBinding {
                    name: "State".to_string(),
                    kind: NamedKind::Struct,
                    underlying: TargetType::Struct(StructType {
                        fields: vec![Param::new(
                            Some("Unused".to_string()),
                            TargetType::array(Scalar::Uint8.into(), 8),
                        )],
                    }),
                    doc: None,
                }),
                Binding::Const(ConstBinding {
                    name: "Status_LUA_OK".to_string(),
                    value: 0,
                    ty: Scalar::Int.into(),
                }),
                Binding::Func(FuncBinding {
                    name: FuncName::free("Gettop"),
                    link_name: "lua_gettop".to_string(),
                    signature: Signature {
                        params: vec![Param::new(Some("L".to_string()), TargetType::ptr(state))],
                        variadic: false,
                        results: vec![Scalar::Int.into()],
                    },
                    doc: Some("/** Stack size */".to_string()),
                }),
            ],
        };

        insta::assert_snapshot!(render_file(&file), @r"
        // lua (/usr/include/lua.h)
        type State struct { Unused [8]uint8 }
        const Status_LUA_OK c.Int = 0
        /** Stack size */
        func Gettop(L *State) c.Int // lua_gettop
        ");
    }
}
