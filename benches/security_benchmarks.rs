use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rampart::prelude::*;
use rampart::rampart_csrf::TokenGenerator;
use serde_json::json;

fn bench_token_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("csrf");

    group.bench_function("generate", |b| b.iter(TokenGenerator::generate));

    let config = SecurityConfig::default().with_csrf(CsrfConfig::new("form"));
    let mut security =
        SecurityManager::new(config).with_session(MemorySessionStore::default().shared());
    let csrf = security.csrf().unwrap();

    group.bench_function("form_issue_validate", |b| {
        b.iter(|| {
            let token = csrf.get_token(black_box("login")).unwrap();
            csrf.validate_token("login", token.as_str()).unwrap()
        })
    });

    group.finish();
}

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");

    let payload = json!({
        "title": "<h1>Release notes</h1>",
        "body": "Fixes & improvements for \"quoted\" input <script>alert(1)</script>",
        "tags": ["<a>", "b & c", "'d'"],
        "meta": {"author": {"name": "<admin>", "id": 7}, "draft": false},
    });

    // Fresh manager per iteration so nothing is skipped as already cleaned
    group.bench_function("htmlentities_nested", |b| {
        b.iter(|| {
            let mut security = SecurityManager::new(
                SecurityConfig::default().with_input_filter(["htmlentities"]),
            );
            security
                .clean(Value::from(black_box(payload.clone())), FilterKind::Input)
                .unwrap()
        })
    });

    group.bench_function("striptags_then_htmlentities", |b| {
        b.iter(|| {
            let mut security = SecurityManager::new(
                SecurityConfig::default().with_input_filter(["striptags", "htmlentities"]),
            );
            security
                .clean(Value::from(black_box(payload.clone())), FilterKind::Input)
                .unwrap()
        })
    });

    group.finish();
}

fn bench_clean_uri(c: &mut Criterion) {
    let mut group = c.benchmark_group("uri");
    let mut security =
        SecurityManager::new(SecurityConfig::default().with_uri_filter(["htmlentities"]));

    group.bench_function("strict", |b| {
        b.iter(|| {
            security
                .clean_uri(black_box("/a/./b/../../c//d/<e>?q=1#top"), true)
                .unwrap()
        })
    });

    group.bench_function("lenient", |b| {
        b.iter(|| {
            security
                .clean_uri(black_box("/a/./b/../../c//d/<e>?q=1#top"), false)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    security_benches,
    bench_token_generation,
    bench_clean,
    bench_clean_uri
);

criterion_main!(security_benches);
