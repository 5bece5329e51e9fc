//! Integration tests: headers parsed with libclang and processed into bindings.
//!
//! Every test returns early when libclang cannot be loaded.

use llbind_clang::{ClangParser, ParseOptions};
use llbind_core::{Binding, Session, SessionOptions};

const LUA_HEADER: &str = r#"
typedef struct lua_State lua_State;
typedef int (*lua_CFunction)(lua_State *L);

lua_State *lua_newstate(void);
void lua_close(lua_State *L);
int lua_gettop(lua_State *L);
int lua_error(lua_State *L, const char *fmt, ...);

enum lua_Status { LUA_OK, LUA_YIELD, LUA_ERRRUN = 2 };
"#;

/// Test the C pipeline from header text to package bindings.
#[test]
fn test_lua_header_bindings() {
    let Ok(parser) = ClangParser::new() else {
        return;
    };
    let unit = parser
        .parse_string(LUA_HEADER, "lua.h", &ParseOptions::c())
        .expect("Failed to parse");

    let options = SessionOptions::new()
        .with_trim_prefixes(["lua_"])
        .with_override("lua_close", "Close");
    let mut session = Session::new(options);
    session.process(&unit);
    assert!(session.diagnostics().is_empty(), "{:?}", session.diagnostics());

    let file = session.package().file("lua.h").expect("no bindings for lua.h");
    let types: Vec<String> = file.types().map(|t| t.name.clone()).collect();
    assert_eq!(types, vec!["State", "CFunction", "Status"]);

    let funcs: Vec<(String, String)> = file
        .funcs()
        .map(|f| (f.name.to_string(), f.signature.to_string()))
        .collect();
    assert_eq!(
        funcs,
        vec![
            ("Newstate".to_string(), "func() *State".to_string()),
            ("Close".to_string(), "func(L *State)".to_string()),
            ("Gettop".to_string(), "func(L *State) c.Int".to_string()),
            (
                "Error".to_string(),
                "func(L *State, fmt *c.Char, __va_list ...any) c.Int".to_string()
            ),
        ]
    );

    let consts: Vec<(String, i64)> = file.consts().map(|c| (c.name.clone(), c.value)).collect();
    assert_eq!(
        consts,
        vec![
            ("Status_LUA_OK".to_string(), 0),
            ("Status_LUA_YIELD".to_string(), 1),
            ("Status_LUA_ERRRUN".to_string(), 2),
        ]
    );

    let gettop = session.symbols().lookup("lua_gettop").unwrap();
    assert_eq!(gettop.target_name, "Gettop");
    assert_eq!(gettop.qualified_name, "lua_gettop(lua_State *)");
}

/// Test C++ methods are named after their class.
#[test]
fn test_cpp_class_symbols() {
    let Ok(parser) = ClangParser::new() else {
        return;
    };
    let source = r#"
namespace ns {
class Foo {
public:
    Foo();
    ~Foo();
    int bar(int x);
    static Foo *make();
private:
    void hidden();
};
}
"#;
    let unit = parser
        .parse_string(source, "foo.hpp", &ParseOptions::cplusplus())
        .expect("Failed to parse");
    let mut session = Session::new(SessionOptions::new());
    session.process(&unit);
    assert!(session.diagnostics().is_empty(), "{:?}", session.diagnostics());

    let names: Vec<&str> = session
        .symbols()
        .iter()
        .map(|(_, info)| info.target_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["(*Foo).Init", "(*Foo).Dispose", "(*Foo).Bar", "(*Foo).Make"]
    );

    let (mangled, bar) = session
        .symbols()
        .iter()
        .find(|(_, info)| info.target_name == "(*Foo).Bar")
        .unwrap();
    assert!(mangled.contains("ZN2ns3Foo3barEi"));
    assert_eq!(bar.qualified_name, "ns::Foo::bar(int)");

    let file = session.package().file("foo.hpp").unwrap();
    assert!(file
        .bindings
        .iter()
        .any(|b| matches!(b, Binding::Type(t) if t.name == "Foo")));
}

/// Test declarations from included headers are not bound to the main file.
#[test]
fn test_included_declarations() {
    let Ok(parser) = ClangParser::new() else {
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base.h"),
        "typedef unsigned long my_size;\nvoid base_init(void);\n",
    )
    .unwrap();
    let main = dir.path().join("main.h");
    std::fs::write(&main, "#include \"base.h\"\nmy_size my_len(const char *s);\n").unwrap();

    let unit = parser
        .parse_file(&main, &ParseOptions::c())
        .expect("Failed to parse");
    let mut session = Session::new(SessionOptions::new().with_trim_prefixes(["my_"]));
    session.process(&unit);

    let file = session.package().file(&unit.path).unwrap();
    let funcs: Vec<String> = file.funcs().map(|f| f.signature.to_string()).collect();
    assert_eq!(funcs, vec!["func(s *c.Char) Size"]);
    assert_eq!(file.types().count(), 0);
    assert!(session.symbols().get("base_init").is_none());
}
