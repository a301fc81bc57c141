use tinyconf::plugin::{Capability, Diagnostic as Finding, Registry};
use tinyconf::{
    Dialect, EditError, Loss, Node, ParseOptions, Path, Renderer, SyntaxError, Value, checkpoint, convert, parse, render,
};

#[test]
fn env_edit_touches_one_line() {
    let mut document = parse("# note\nname = \"x\"\nport = 8080\n", Dialect::Env).unwrap();
    document.editor().set(["port"], 9090).unwrap();
    assert_eq!(render(&document), "# note\nname = \"x\"\nport = 9090\n");
}

#[test]
fn json_delete_keeps_the_rest() {
    let mut document = parse(r#"{"a":1,"b":2}"#, Dialect::Json).unwrap();
    document.editor().delete(["a"]).unwrap();
    assert_eq!(render(&document), r#"{"b":2}"#);
}

#[test]
fn toml_duplicate_key_points_at_the_second_occurrence() {
    let text = "[t]\nx = 1\ny = 2\nx = 3\n";
    let Err(SyntaxError::DuplicateKey(error)) = parse(text, Dialect::Toml) else {
        panic!("expected a duplicate key error");
    };
    assert_eq!(error.key, "x");
    let position = error.position.unwrap();
    assert_eq!((position.line, position.column), (4, 1));

    let error = SyntaxError::DuplicateKey(error);
    let rendered = error.diagnostic().render(&Renderer::plain(), "app.toml", text).to_string();
    assert!(rendered.contains("app.toml:4:1"), "{rendered}");
}

#[test]
fn toml_to_json_drops_the_trailing_comment_block() {
    let document = parse("a = 1\nb = \"two\"\n\n# trailing\n# block\n", Dialect::Toml).unwrap();
    let rendered = convert(&document, Dialect::Json);

    assert_eq!(rendered.warnings.len(), 1);
    assert_eq!(rendered.warnings[0].loss, Loss::Comments);
    assert!(!rendered.text.contains('#'));

    let back = parse(&rendered.text, Dialect::Json).unwrap();
    assert_eq!(back.root().to_value(), document.root().to_value());
}

#[test]
fn edits_report_errors_without_changing_the_document() {
    let text = "[server]\nhost = \"h\"\n";
    let mut document = parse(text, Dialect::Toml).unwrap();

    let error = document.editor().set(["server", "host", "inner"], 1).unwrap_err();
    assert!(matches!(error, EditError::TypeMismatch(_)), "{error}");
    let error = document.editor().delete(["client"]).unwrap_err();
    assert!(matches!(error, EditError::PathNotFound(_)), "{error}");
    let error = document.editor().reorder(["server"], ["port"]).unwrap_err();
    assert!(matches!(error, EditError::InvalidPermutation(_)), "{error}");

    assert!(document.root().is_clean());
    assert_eq!(render(&document), text);
}

#[test]
fn checkpoint_makes_the_output_the_new_source() {
    let mut document = parse("[db]\nhost = \"h\" # primary\n", Dialect::Toml).unwrap();
    document.editor().insert(["db"], "port", 5432).unwrap();
    assert!(!document.root().is_clean());

    let fresh = checkpoint(&document, &ParseOptions::default()).unwrap();
    assert!(fresh.root().is_clean());
    assert_eq!(fresh.source(), render(&document));
    assert_eq!(fresh.root().to_value(), document.root().to_value());
}

#[test]
fn checkpoint_keeps_the_seven_cfg_tag() {
    let mut document = parse("#!7cfg toml\nname = \"x\"\n", Dialect::SevenCfg).unwrap();
    document.editor().set(["name"], "y").unwrap();

    let fresh = checkpoint(&document, &ParseOptions::default()).unwrap();
    assert_eq!(fresh.source(), "#!7cfg toml\nname = \"y\"\n");
    assert_eq!(fresh.tag(), Some("#!7cfg toml\n"));
}

#[test]
fn a_plugin_pipeline() {
    let mut registry = Registry::new();
    registry
        .register_transform("ports", vec![Capability::Read, Capability::Set(Path::from(["server"]))], |tree| {
            let Value::Integer(port) = tree.read_path(["server", "port"])? else {
                return Err(tree.fail("port is not an integer"));
            };
            tree.set(["server", "port"], port + 1)
        })
        .unwrap();
    registry
        .register_validator("privileged", |document| {
            let port = document.get(&Path::from(["server", "port"])).map(Node::to_value);
            match port {
                Some(Value::Integer(port)) if port < 1024 => {
                    vec![Finding::warning("privileged port").at(["server", "port"])]
                }
                _ => Vec::new(),
            }
        })
        .unwrap();

    let mut document = parse("[server]\nport = 79 # finger\n", Dialect::Toml).unwrap();
    registry.run_transform("ports", &mut document).unwrap();
    assert_eq!(render(&document), "[server]\nport = 80 # finger\n");

    let findings = registry.run_validator("privileged", &document).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].to_string(), "warning[privileged] at `server.port`: privileged port");
}

#[test]
fn children_keep_insertion_order() {
    let mut document = parse("z = 1\na = 2\n", Dialect::Toml).unwrap();
    document.editor().insert(Path::root(), "m", 3).unwrap();

    let Value::Table(entries) = document.root().to_value() else {
        panic!("root is a table");
    };
    let keys: Vec<_> = entries.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
    assert_eq!(render(&document), "z = 1\na = 2\nm = 3\n");
}
