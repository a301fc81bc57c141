use codspeed_criterion_compat::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use tinyconf_tokenizer::{LexMode, Lexer, Syntax, SyntaxKind};

static TOML: &str = r#"
# service
[server]
host = "example.org" # public
port = 8080
tags = ["a", "b", 'c']
limits = { rps = 100, burst = 2.5e3 }

[[workers]]
name = """
primary"""
started = 1979-05-27T07:32:00Z
enabled = true
"#;

static JSON: &str = r#"{
  "server": { "host": "example.org", "port": 8080, "tags": ["a", "b", "c"] },
  "workers": [{ "name": "primary\n", "enabled": true, "ratio": -0.25e-3 }, null]
}"#;

static ENV: &str = "
# service
export HOST=example.org
PORT = 8080 # public
GREETING=\"hello $USER\"
RAW='single quoted'
";

static CANDIDATES: [(&str, &str, Syntax); 3] =
    [("toml", TOML, Syntax::Toml), ("json", JSON, Syntax::Json), ("env", ENV, Syntax::Env)];

/// Switches modes the way the line-based grammars do: values after `=`,
/// keys after a newline.
fn iterate(text: &str, syntax: Syntax) {
    let mut lexer = Lexer::new(text, syntax);

    loop {
        let Ok(token) = lexer.next_token() else { break };
        match token.kind {
            SyntaxKind::EOF => break,
            SyntaxKind::EQ => lexer.set_mode(LexMode::Value),
            SyntaxKind::NEWLINE => lexer.set_mode(LexMode::Key),
            _ => {}
        }
        black_box(token);
    }
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for (name, text, syntax) in CANDIDATES {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(name, &text, |b, &text| b.iter(|| iterate(text, syntax)));
    }
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
