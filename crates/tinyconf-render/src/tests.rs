use expect_test::expect;
use tinyconf_errors::Loss;
use tinyconf_parse::{ParseOptions, parse};
use tinyconf_tree::{Dialect, Document, Path, Value};

use crate::{RenderOptions, render, render_as};

fn doc(text: &str, dialect: Dialect) -> Document {
    parse(text, dialect, &ParseOptions::default()).unwrap()
}

fn rendered(document: &Document) -> String {
    render(document, &RenderOptions::default())
}

#[test]
fn untouched_documents_round_trip() {
    let cases = [
        ("{ \"a\" : [1,2 ] ,\n\"b\":{}}\n\n", Dialect::Json),
        ("# c\n\n[a] # h\nx = 1\n  y.z='q'\n[[t]]\n\n# end", Dialect::Toml),
        ("# c\nexport A = 1 # x\nB='b'\n\n", Dialect::Env),
        ("#!7cfg env\nA=1\n", Dialect::SevenCfg),
    ];
    for (text, dialect) in cases {
        assert_eq!(rendered(&doc(text, dialect)), text);
    }
}

#[test]
fn env_set_keeps_everything_else() {
    let mut document = doc("# note\nname = \"x\"\nport = 8080\n", Dialect::Env);
    document.editor().set(["port"], 9090).unwrap();
    assert_eq!(rendered(&document), "# note\nname = \"x\"\nport = 9090\n");
}

#[test]
fn json_delete_first_key() {
    let mut document = doc(r#"{"a":1,"b":2}"#, Dialect::Json);
    document.editor().delete(["a"]).unwrap();
    assert_eq!(rendered(&document), r#"{"b":2}"#);

    let mut document = doc(r#"{"a":1,"b":2}"#, Dialect::Json);
    document.editor().delete(["b"]).unwrap();
    assert_eq!(rendered(&document), r#"{"a":1}"#);
}

#[test]
fn emptied_containers_keep_their_inner_trivia() {
    let mut document = doc("{\n  \"a\": 1\n}\n", Dialect::Json);
    document.editor().delete(["a"]).unwrap();
    assert_eq!(rendered(&document), "{\n}\n");

    let mut document = doc("{\"a\": [ 1 ]}", Dialect::Json);
    document.editor().delete(Path::from(["a"]).join(0_usize)).unwrap();
    assert_eq!(rendered(&document), "{\"a\": [ ]}");

    let mut document = doc("a = [\n  1, # one\n  # keep me\n]\n", Dialect::Toml);
    document.editor().delete(Path::from(["a"]).join(0_usize)).unwrap();
    assert_eq!(rendered(&document), "a = [\n  # keep me\n]\n");

    let mut document = doc("a = { x = 1 }\n", Dialect::Toml);
    document.editor().delete(["a", "x"]).unwrap();
    assert_eq!(rendered(&document), "a = { }\n");
}

#[test]
fn json_insert_copies_sibling_layout() {
    let mut document = doc("{\n  \"a\": 1\n}\n", Dialect::Json);
    document.editor().insert(Path::root(), "b", 2).unwrap();
    assert_eq!(rendered(&document), "{\n  \"a\": 1,\n  \"b\": 2\n}\n");
}

#[test]
fn json_first_child_is_laid_out_fresh() {
    let mut document = doc("{}", Dialect::Json);
    document.editor().insert(Path::root(), "x", Value::table([("y", Value::Integer(1))])).unwrap();
    expect![[r#"
        {
          "x": {
            "y": 1
          }
        }"#]]
    .assert_eq(&rendered(&document));
}

#[test]
fn toml_set_inside_section() {
    let mut document = doc("# top\n[server]\nhost = \"a\" # main\nport = 8080\n", Dialect::Toml);
    document.editor().set(["server", "port"], 9090).unwrap();
    assert_eq!(rendered(&document), "# top\n[server]\nhost = \"a\" # main\nport = 9090\n");
}

#[test]
fn toml_new_root_keys_go_above_sections() {
    let mut document = doc("[s]\na = 1\n", Dialect::Toml);
    document.editor().insert(Path::root(), "top", true).unwrap();
    assert_eq!(rendered(&document), "top = true\n[s]\na = 1\n");
}

#[test]
fn toml_new_table_becomes_a_section() {
    let mut document = doc("a = 1\n", Dialect::Toml);
    document.editor().insert(Path::root(), "srv", Value::table([("port", Value::Integer(1))])).unwrap();
    assert_eq!(rendered(&document), "a = 1\n\n[srv]\nport = 1\n");
}

#[test]
fn toml_rename_reorder_and_delete() {
    let mut document = doc("# c\nold = 1 # t\n", Dialect::Toml);
    document.editor().rename(["old"], "new").unwrap();
    assert_eq!(rendered(&document), "# c\nnew = 1 # t\n");

    let mut document = doc("b = 2\na = 1\n", Dialect::Toml);
    document.editor().reorder(Path::root(), ["a", "b"]).unwrap();
    assert_eq!(rendered(&document), "a = 1\nb = 2\n");

    let mut document = doc("[a]\nx = 1\n\n[b]\ny = 2\n", Dialect::Toml);
    document.editor().delete(["a"]).unwrap();
    assert_eq!(rendered(&document), "\n[b]\ny = 2\n");
}

#[test]
fn toml_dotted_keys_and_arrays() {
    let mut document = doc("a.b = 1\nc = 2\n", Dialect::Toml);
    document.editor().set(["a", "b"], 5).unwrap();
    assert_eq!(rendered(&document), "a.b = 5\nc = 2\n");

    let mut document = doc("ports = [80, 443]\n", Dialect::Toml);
    document.editor().push(["ports"], 8080).unwrap();
    assert_eq!(rendered(&document), "ports = [80, 443, 8080]\n");
}

#[test]
fn interleaved_dotted_keys_keep_their_lines() {
    let mut document = doc("a.x = 1\nb = 2\na.y = 3\n", Dialect::Toml);
    document.editor().set(["b"], 5).unwrap();
    assert_eq!(rendered(&document), "a.x = 1\nb = 5\na.y = 3\n");

    document.editor().insert(["a"], "z", 4).unwrap();
    document.editor().insert(Path::root(), "c", 6).unwrap();
    assert_eq!(rendered(&document), "a.x = 1\nb = 5\na.y = 3\na.z = 4\nc = 6\n");

    let mut document = doc("b = 1\na.x = 2\n", Dialect::Toml);
    document.editor().reorder(Path::root(), ["a", "b"]).unwrap();
    assert_eq!(rendered(&document), "a.x = 2\nb = 1\n");
}

#[test]
fn missing_final_newline_stays_missing() {
    let mut document = doc("a = 1", Dialect::Toml);
    document.editor().set(["a"], 2).unwrap();
    assert_eq!(rendered(&document), "a = 2");

    let mut document = doc("# c\nA=1", Dialect::Env);
    document.editor().set(["A"], "x").unwrap();
    assert_eq!(rendered(&document), "# c\nA=x");
}

#[test]
fn new_lines_follow_crlf_documents() {
    let mut document = doc("a = 1\r\nb = 2\r\n", Dialect::Toml);
    document.editor().insert(Path::root(), "c", 3).unwrap();
    assert_eq!(rendered(&document), "a = 1\r\nb = 2\r\nc = 3\r\n");

    let mut document = doc("A=1\r\n", Dialect::Env);
    document.editor().insert(Path::root(), "B", 2).unwrap();
    assert_eq!(rendered(&document), "A=1\r\nB=2\r\n");

    let mut document = doc("{\r\n  \"a\": {}\r\n}\r\n", Dialect::Json);
    document.editor().set(["a"], Value::table([("b", Value::Integer(1))])).unwrap();
    assert_eq!(rendered(&document), "{\r\n  \"a\": {\r\n    \"b\": 1\r\n  }\r\n}\r\n");
}

#[test]
fn sections_keep_source_order() {
    let text = "[x.y]\na = 1\n[z]\nb = 2\n[x]\nc = 3\n";
    let mut document = doc(text, Dialect::Toml);
    document.editor().set(["z", "b"], 20).unwrap();
    assert_eq!(rendered(&document), "[x.y]\na = 1\n[z]\nb = 20\n[x]\nc = 3\n");
}

#[test]
fn rendering_edited_output_is_stable() {
    let mut document = doc("# a\nx = 1\n\n[t]\ny = [1, 2,]\n", Dialect::Toml);
    document.editor().push(["t", "y"], 3).unwrap();
    let once = rendered(&document);
    assert_eq!(once, "# a\nx = 1\n\n[t]\ny = [1, 2, 3,]\n");
    assert_eq!(rendered(&doc(&once, Dialect::Toml)), once);
}

#[test]
fn toml_comments_become_one_warning_in_json() {
    let document = doc("a = 1\n\n# trailing comment\n", Dialect::Toml);
    let output = render_as(&document, Dialect::Json, &RenderOptions::default());
    assert_eq!(output.text, "{\n  \"a\": 1\n}\n");
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].loss, Loss::Comments);
    assert_eq!(output.warnings[0].path, "");
}

#[test]
fn json_to_toml() {
    let document = doc(r#"{"name": "x", "server": {"port": 80}, "tags": ["a", "b"], "items": [{"n": 1}]}"#, Dialect::Json);
    let output = render_as(&document, Dialect::Toml, &RenderOptions::default());
    expect![[r#"
        name = "x"
        tags = ["a", "b"]

        [server]
        port = 80

        [[items]]
        n = 1
    "#]]
    .assert_eq(&output.text);
    assert!(output.warnings.is_empty());
}

#[test]
fn toml_to_env_keeps_comments() {
    let document = doc("# db\n[db]\nhost = \"h\" # primary\nport = 5\n", Dialect::Toml);
    let output = render_as(&document, Dialect::Env, &RenderOptions::default());
    assert_eq!(output.text, "# db\ndb_host=h # primary\ndb_port=5\n");
    let losses: Vec<Loss> = output.warnings.iter().map(|warning| warning.loss).collect();
    assert_eq!(losses, [Loss::NestedTable]);
}

#[test]
fn toml_to_env_keeps_header_comments_and_reports_nested_ones() {
    let document = doc("[server] # main\nports = [\n  # primary\n  80,\n]\n", Dialect::Toml);
    let output = render_as(&document, Dialect::Env, &RenderOptions::default());
    assert_eq!(output.text, "# main\nserver_ports=80\n");
    let warnings: Vec<(&str, Loss)> =
        output.warnings.iter().map(|warning| (warning.path.as_str(), warning.loss)).collect();
    assert_eq!(
        warnings,
        [("server", Loss::NestedTable), ("server.ports", Loss::Array), ("server.ports[0]", Loss::Comments)]
    );
}

#[test]
fn env_to_json_drops_comments() {
    let document = doc("# c\nA=1\n", Dialect::Env);
    let output = render_as(&document, Dialect::Json, &RenderOptions::default());
    assert_eq!(output.text, "{\n  \"A\": \"1\"\n}\n");
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].path, "A");
}

#[test]
fn values_without_a_literal() {
    let document = doc("x = inf\n", Dialect::Toml);
    let output = render_as(&document, Dialect::Json, &RenderOptions::default());
    assert_eq!(output.text, "{\n  \"x\": null\n}\n");
    assert_eq!(output.warnings[0].loss, Loss::Value);

    let mut document = doc("a = 1\n", Dialect::Toml);
    document.editor().set(["a"], Value::Null).unwrap();
    let output = render_as(&document, Dialect::Toml, &RenderOptions::default());
    assert_eq!(output.text, "a = \"\"\n");
    assert_eq!(output.warnings[0].loss, Loss::Value);
}

#[test]
fn seven_cfg_tags() {
    let mut document = doc("#!7cfg toml\na = 1\n", Dialect::SevenCfg);
    document.editor().set(["a"], 2).unwrap();
    assert_eq!(rendered(&document), "#!7cfg toml\na = 2\n");

    let document = doc(r#"{"a":1}"#, Dialect::Json);
    let output = render_as(&document, Dialect::SevenCfg, &RenderOptions::default());
    assert_eq!(output.text, "#!7cfg json\n{\"a\":1}");

    let document = doc("[a]\nb = 1\n", Dialect::SevenCfg);
    assert_eq!(rendered(&document), "[a]\nb = 1\n");
}
