use jack::prelude::*;

fn compile_ok(source: &str) -> CompiledClass {
    match jack::compile(source) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{}", err),
    }
}

#[test]
fn test_compile_point() {
    let compiled = compile_ok(include_str!("programs/Point.jack"));
    assert_eq!(compiled.name, "Point");
    assert_eq!(compiled.vm_text(), include_str!("programs/Point.vm"));
}

#[test]
fn test_compile_main() {
    let compiled = compile_ok(include_str!("programs/Main.jack"));
    assert_eq!(compiled.name, "Main");
    assert_eq!(compiled.vm_text(), include_str!("programs/Main.vm"));
}

#[test]
fn test_compile_is_repeatable() {
    let source = include_str!("programs/Square.jack");
    let first = compile_ok(source);
    let second = compile_ok(source);
    assert_eq!(first, second);
    assert_eq!(first.vm_text(), second.vm_text());
}

#[test]
fn test_square_structure() {
    let compiled = compile_ok(include_str!("programs/Square.jack"));

    let functions = compiled
        .code
        .iter()
        .filter_map(|instr| match instr {
            Instr::Function(name, n_locals) => Some((name.as_str(), *n_locals)),
            _ => None,
        })
        .collect::<Vec<_>>();

    assert_eq!(
        functions,
        vec![
            ("Square.new", 0),
            ("Square.dispose", 0),
            ("Square.draw", 0),
            ("Square.erase", 0),
            ("Square.incSize", 0),
            ("Square.decSize", 0),
            ("Square.moveUp", 0),
            ("Square.moveDown", 0),
            ("Square.moveLeft", 0),
            ("Square.moveRight", 0),
            ("Square.run", 2),
        ]
    );

    // Constructor allocates the three fields.
    assert_eq!(
        &compiled.code[1..4],
        &[
            Instr::Push(Segment::Const, 3),
            Instr::Call("Memory.alloc".into(), 1),
            Instr::Pop(Segment::Pointer, 0),
        ]
    );

    // `run` holds the receiver in argument 0, so `direction` is argument 1.
    let text = compiled.vm_text();
    assert!(text.contains("push argument 1\npush constant 1\neq\nif-goto IF_TRUE1\n"));
    assert!(text.contains("label IF_TRUE6\npush pointer 0\ncall Square.incSize 1\npop temp 0\n"));
}

#[test]
fn test_syntax_error_line() {
    let source = "class Main {\n  function void main() {\n    let x = ;\n  }\n}\n";
    let err = jack::compile(source).unwrap_err();

    assert!(matches!(err, JackError::Syntax(_)));
    assert_eq!(err.line(), 3);
    assert_eq!(
        err.to_string(),
        "[line 3] Error at ';': expected a term\n    let x = ;\n            ^"
    );
}

#[test]
fn test_error_at_end() {
    let err = jack::compile("class Main {\n  function void main() {").unwrap_err();
    assert_eq!(err.line(), 2);
    assert!(err.to_string().starts_with("[line 2] Error at end:"));
}

#[test]
fn test_unknown_character() {
    let err = jack::compile("class Main { field int #; }").unwrap_err();
    assert!(matches!(err, JackError::Syntax(_)));
    assert!(err.to_string().starts_with("[line 1] Error at '#': expected identifier"));
}

#[test]
fn test_unresolved_variable_compiles() {
    let source = "class Main {\n  function void main() {\n    let y = x;\n    return;\n  }\n}";
    let compiled = compile_ok(source);
    assert_eq!(
        compiled.vm_text(),
        concat!(
            "function Main.main 0\n",
            "push constant 0\n",
            "pop temp 0\n",
            "push constant 0\n",
            "return\n",
        )
    );
}

#[test]
fn test_method_call_on_field_and_static() {
    let source = r#"
    class Scene {
        field int width;
        field Point cursor;
        static Point origin;

        method void redraw() {
            do cursor.print();
            do origin.plus(cursor);
            return;
        }
    }
    "#;

    assert_eq!(
        compile_ok(source).vm_text(),
        concat!(
            "function Scene.redraw 0\n",
            "push argument 0\n",
            "pop pointer 0\n",
            // receiver is field 1
            "push this 1\n",
            "call Point.print 1\n",
            "pop temp 0\n",
            // receiver is static 0
            "push static 0\n",
            "push this 1\n",
            "call Point.plus 2\n",
            "pop temp 0\n",
            "push constant 0\n",
            "return\n",
        )
    );
}

#[test]
fn test_compiler_over_token_list() {
    // Tokens don't have to come from the lexer.
    let tokens = jack::lex::tokenize("class Empty { function void f() { return; } }");
    let stream = jack::lex::TokenStream::from_tokens(tokens);
    let compiled = Compiler::from_stream(stream, JackConf::default())
        .compile_class()
        .unwrap();

    assert_eq!(
        compiled.vm_text(),
        "function Empty.f 0\npush constant 0\nreturn\n"
    );
}
