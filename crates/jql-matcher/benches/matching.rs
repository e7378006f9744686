use criterion::*;

use jql_matcher::Matcher;

const QUERY: &str = r#"name:"Siegfried" AND details.age:><(18,99) AND servers{port:80 OR port:443} AND created:>2020-01-01"#;

const DOC: &str = r#"{
    "name": "Siegfried the Second",
    "details": {"age": 35, "city": "Bonn"},
    "servers": [
        {"name": "web-1", "port": 80},
        {"name": "web-2", "port": 8080},
        {"name": "db-1", "port": 5432}
    ],
    "created": "2021-06-08T20:56:33+00:00"
}"#;

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", move |b| {
        b.iter(|| black_box(Matcher::new(QUERY).expect("benchmark query must compile")))
    });
}

fn bench_match_bytes(c: &mut Criterion) {
    let (matcher, _) = Matcher::new(QUERY).expect("benchmark query must compile");
    c.bench_function("match_bytes", move |b| {
        b.iter(|| black_box(matcher.match_bytes(DOC.as_bytes()).unwrap()))
    });
}

fn bench_match_parsed(c: &mut Criterion) {
    let (matcher, _) = Matcher::new(QUERY).expect("benchmark query must compile");
    let doc: serde_json::Value = serde_json::from_str(DOC).unwrap();
    c.bench_function("match_parsed", move |b| {
        b.iter(|| black_box(matcher.match_parsed(&doc)))
    });
}

criterion_group!(benches, bench_compile, bench_match_bytes, bench_match_parsed);
criterion_main!(benches);
