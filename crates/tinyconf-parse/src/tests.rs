use expect_test::{Expect, expect};
use text_size::TextSize;
use tinyconf_errors::SyntaxError;
use tinyconf_tokenizer::Syntax;
use tinyconf_tree::{Dialect, Path, TableStyle, Value};

use crate::{EnvOptions, ParseOptions, parse, parse_bytes};

fn check(text: &str, dialect: Dialect, expect: Expect) {
    let document = parse(text, dialect, &ParseOptions::default()).unwrap();
    expect.assert_eq(&document.root().outline());
}

fn error(text: &str, dialect: Dialect) -> SyntaxError {
    parse(text, dialect, &ParseOptions::default()).unwrap_err()
}

#[test]
fn toml_trivia() {
    check(
        "# top\ntitle = \"x\"  # t\n\n[server]\nport = 8080\n",
        Dialect::Toml,
        expect![[r##"
            table Root
              title: string "x" leading="# top\n" trailing="  # t\n"
              <server>: table Header "[server]" #0 leading="\n" trailing="\n"
                port: integer 8080 trailing="\n"
        "##]],
    );
}

#[test]
fn toml_dotted_keys() {
    check(
        "a.b = 1\na . c = 'x'\n",
        Dialect::Toml,
        expect![[r#"
            table Root
              a: table Dotted
                b: integer 1 trailing="\n"
                c: string 'x' trailing="\n"
        "#]],
    );

    let document = parse("a.b = 1\n", Dialect::Toml, &ParseOptions::default()).unwrap();
    let entry = document.root().as_table().unwrap().entry("a").unwrap();
    assert_eq!(entry.key.separator.as_deref(), Some("."));
}

#[test]
fn toml_inline_values() {
    check(
        "point = { x = 1, y = 2 }\nlist = [\n  1,\n  2, # two\n]\n",
        Dialect::Toml,
        expect![[r#"
            table Root
              point: table Braced trailing="\n"
                x: integer 1 leading=" "
                y: integer 2 leading=" "
                dangling=" "
              list: array Bracketed trailing="\n"
                - integer 1 leading="\n  "
                - integer 2 leading="\n  "
                dangling=" # two\n"
        "#]],
    );

    let document = parse("list = [1, 2,]\n", Dialect::Toml, &ParseOptions::default()).unwrap();
    let list = document.get(&Path::from(["list"])).and_then(|node| node.as_array()).unwrap();
    assert!(list.trailing_comma());
}

#[test]
fn toml_scalars() {
    let text = "hex = 0xff\nbig = 1_000\nratio = 2.5\nno = false\nwhen = 1979-05-27 07:32:00Z\nraw = '''\nline\n'''\n";
    let document = parse(text, Dialect::Toml, &ParseOptions::default()).unwrap();
    assert_eq!(
        document.root().to_value(),
        Value::table([
            ("hex", Value::Integer(255)),
            ("big", Value::Integer(1000)),
            ("ratio", Value::Float(2.5)),
            ("no", Value::Boolean(false)),
            ("when", Value::from("1979-05-27 07:32:00Z")),
            ("raw", Value::from("line\n")),
        ])
    );
}

#[test]
fn toml_tables_and_arrays_of_tables() {
    let text = "[a.b]\nx = 1\n[a]\ny = 2\n[[p]]\nn = 1\n[[p]]\nn = 2\n";
    let document = parse(text, Dialect::Toml, &ParseOptions::default()).unwrap();
    assert_eq!(
        document.root().to_value(),
        Value::table([
            ("a", Value::table([("b", Value::table([("x", Value::Integer(1))])), ("y", Value::Integer(2))])),
            (
                "p",
                Value::array([
                    Value::table([("n", Value::Integer(1))]),
                    Value::table([("n", Value::Integer(2))]),
                ]),
            ),
        ])
    );

    let a = document.get(&Path::from(["a"])).unwrap();
    assert_eq!(a.as_table().map(|table| table.style()), Some(TableStyle::Header));
    assert_eq!(a.position(), Some(1));
    assert_eq!(document.get(&Path::from(["a", "b"])).and_then(|node| node.position()), Some(0));
}

#[test]
fn toml_duplicate_keys() {
    expect!["duplicate key `x` at 2:1"].assert_eq(&error("x = 1\nx = 2\n", Dialect::Toml).to_string());
    expect!["duplicate key `a` at 2:2"].assert_eq(&error("[a]\n[a]\n", Dialect::Toml).to_string());
    expect!["duplicate key `a` at 2:1"].assert_eq(&error("a = 1\na.b = 2\n", Dialect::Toml).to_string());
    expect!["duplicate key `t` at 2:2"].assert_eq(&error("t = { x = 1 }\n[t.y]\n", Dialect::Toml).to_string());
}

#[test]
fn toml_errors() {
    expect!["1:5: expected a value, found newline"].assert_eq(&error("a = \n", Dialect::Toml).to_string());
    expect!["1:7: expected newline or end of file, found key `b`"]
        .assert_eq(&error("a = 1 b = 2\n", Dialect::Toml).to_string());
    expect!["1:5: expected an integer in range"]
        .assert_eq(&error("a = 9223372036854775808\n", Dialect::Toml).to_string());
}

#[test]
fn json_trivia() {
    check(
        "{ \"a\": [1, 2], \"b\": {} }\n",
        Dialect::Json,
        expect![[r#"
            table Braced trailing="\n"
              "a": array Bracketed leading=" "
                - integer 1
                - integer 2 leading=" "
              "b": table Braced leading=" "
              dangling=" "
        "#]],
    );
}

#[test]
fn json_values() {
    let text = r#"{"s": "é", "n": null, "f": -1.5e2, "big": 18446744073709551616, "t": true}"#;
    let document = parse(text, Dialect::Json, &ParseOptions::default()).unwrap();
    assert_eq!(
        document.root().to_value(),
        Value::table([
            ("s", Value::from("é")),
            ("n", Value::Null),
            ("f", Value::Float(-150.0)),
            ("big", Value::Float(18_446_744_073_709_551_616.0)),
            ("t", Value::Boolean(true)),
        ])
    );
}

#[test]
fn json_errors() {
    expect!["1:1: expected `{`, found `[`"].assert_eq(&error("[1]", Dialect::Json).to_string());
    expect!["duplicate key `a` at 1:10"].assert_eq(&error(r#"{"a": 1, "a": 2}"#, Dialect::Json).to_string());
    expect!["1:9: expected `}` or `,`, found end of file"].assert_eq(&error(r#"{"a": 1 "#, Dialect::Json).to_string());
}

#[test]
fn env_lines() {
    check(
        "# db\nexport HOST=localhost # main\nPORT=\"5432\"\n",
        Dialect::Env,
        expect![[r##"
            table Root
              export HOST: string localhost leading="# db\n" trailing=" # main\n"
              PORT: string "5432" trailing="\n"
        "##]],
    );
}

#[test]
fn env_empty_values_and_inference() {
    let text = "EMPTY=\nPORT=8080\nDEBUG=true\n";
    let document = parse(text, Dialect::Env, &ParseOptions::default()).unwrap();
    assert_eq!(
        document.root().to_value(),
        Value::table([("EMPTY", Value::from("")), ("PORT", Value::from("8080")), ("DEBUG", Value::from("true"))])
    );

    let options = ParseOptions { env: EnvOptions { infer_scalars: true }, ..ParseOptions::default() };
    let document = parse(text, Dialect::Env, &options).unwrap();
    assert_eq!(document.get(&Path::from(["PORT"])).map(|node| node.to_value()), Some(Value::Integer(8080)));
    assert_eq!(document.get(&Path::from(["DEBUG"])).map(|node| node.to_value()), Some(Value::Boolean(true)));
}

#[test]
fn env_errors() {
    expect!["duplicate key `A` at 2:1"].assert_eq(&error("A=1\nA=2\n", Dialect::Env).to_string());
    expect!["1:5: expected `=`, found newline"].assert_eq(&error("NAME\n", Dialect::Env).to_string());
}

#[test]
fn eof_trivia_goes_to_the_root() {
    check(
        "a = 1\n\n# end",
        Dialect::Toml,
        expect![[r#"
            table Root
              a: integer 1 trailing="\n"
              dangling="\n# end"
        "#]],
    );
}

#[test]
fn seven_cfg_tag() {
    let document = parse("#!7cfg env\nA=1\n", Dialect::SevenCfg, &ParseOptions::default()).unwrap();
    assert_eq!(document.syntax(), Syntax::Env);
    assert_eq!(document.tag(), Some("#!7cfg env\n"));
    assert_eq!(document.get(&Path::from(["A"])).and_then(|node| node.span()).map(|span| span.start()), Some(TextSize::new(13)));

    let document = parse("[a]\nb = 1\n", Dialect::SevenCfg, &ParseOptions::default()).unwrap();
    assert_eq!(document.syntax(), Syntax::Toml);
    assert_eq!(document.tag(), None);

    let options = ParseOptions { seven_cfg: Some(Syntax::Json), ..ParseOptions::default() };
    let document = parse("#!7cfg toml\n{}", Dialect::SevenCfg, &options).unwrap();
    assert_eq!(document.syntax(), Syntax::Json);
}

#[test]
fn invalid_utf8() {
    let error = parse_bytes(b"a = \xff\n", Dialect::Toml, &ParseOptions::default()).unwrap_err();
    assert!(matches!(error, SyntaxError::Lex(_)));
}
