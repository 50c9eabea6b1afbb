use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agent::relay::API_KEY_HEADER;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::output::parse_post;

const PAPER: &str = "We introduce a contrastive objective for learning visual features from natural language. \
                     It scales to four hundred million image and text pairs.";

#[derive(Clone, Default)]
struct Calls {
    generate: Arc<AtomicUsize>,
    arxiv: Arc<AtomicUsize>,
}

async fn extract(Json(body): Json<Value>) -> Json<Value> {
    let text = if body["filename"] == "short.pdf" { "tiny" } else { PAPER };
    Json(json!({ "text": text, "success": true }))
}

async fn generate(State(calls): State<Calls>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    calls.generate.fetch_add(1, Ordering::SeqCst);
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let title = body["arxivMetadata"]["title"].as_str().unwrap_or("untitled");
    Json(json!({ "blogPost": format!("# {title}\n\nkey={key}\n"), "success": true }))
}

async fn arxiv_feed(State(calls): State<Calls>) -> String {
    calls.arxiv.fetch_add(1, Ordering::SeqCst);
    r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  <entry>
    <id>http://arxiv.org/abs/2103.00020v1</id>
    <published>2021-02-26T17:54:36Z</published>
    <title>Learning Transferable Visual Models</title>
    <summary>CLIP.</summary>
    <author><name>Alec Radford</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/2103.00020v1" rel="related" type="application/pdf"/>
    <category term="cs.CV"/>
  </entry>
</feed>"#
        .to_string()
}

async fn spawn_relay() -> (String, Calls) {
    let calls = Calls::default();
    let app = Router::new()
        .route("/api/v1/extract-pdf", post(extract))
        .route("/api/v1/generate", post(generate))
        .route("/arxiv", get(arxiv_feed))
        .with_state(calls.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), calls)
}

fn pipeline(base: &str, out: &Path, api_key: &str) -> Pipeline {
    Pipeline::new(
        RelayClient::new(base).unwrap(),
        PostWriter::new(out, true),
        api_key,
        GenerationRequest::new(""),
    )
}

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4 stand-in").unwrap();
    path
}

#[tokio::test]
async fn generates_post_with_frontmatter() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "My Paper.pdf");

    let outcome = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .process(&pdf)
        .await
        .unwrap();
    let Outcome::Generated(path) = outcome else { panic!("expected fresh generation") };
    assert!(path.file_name().unwrap().to_string_lossy().ends_with("_my_paper.md"));

    let doc = std::fs::read_to_string(&path).unwrap();
    let (fm, body) = parse_post(&doc);
    assert_eq!(fm["title"], "My Paper");
    assert_eq!(fm["source_pdf"], "My Paper.pdf");
    assert!(fm.get("arxiv_id").is_none());
    assert_eq!(body, "# untitled\n\nkey=sk-ant-test\n");
    assert_eq!(calls.generate.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_api_key_fails_before_any_call() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf");

    let err = pipeline(&base, dir.path(), "  ").process(&pdf).await.unwrap_err();
    assert!(matches!(err, CliError::MissingApiKey));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn short_extraction_is_rejected() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "short.pdf");

    let err = pipeline(&base, dir.path(), "sk-ant-test").process(&pdf).await.unwrap_err();
    assert!(matches!(err, CliError::NotEnoughText { chars: 4 }));
    assert!(err.to_string().starts_with("Could not extract enough text from PDF"));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_pdf_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();
    assert!(matches!(read_pdf(&path).await, Err(CliError::NotPdf(_))));
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf");
    let cache_path = dir.path().join("cache").join("cache.json");

    let mut first = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .with_cache(ResultCache::load(&cache_path).unwrap());
    assert!(matches!(first.process(&pdf).await.unwrap(), Outcome::Generated(_)));

    let mut second = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .with_cache(ResultCache::load(&cache_path).unwrap());
    assert!(matches!(second.process(&pdf).await.unwrap(), Outcome::Cached(_)));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn changed_settings_miss_the_cache() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf");
    let cache_path = dir.path().join("cache.json");

    let mut first = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .with_cache(ResultCache::load(&cache_path).unwrap());
    first.process(&pdf).await.unwrap();

    let mut template = GenerationRequest::new("");
    template.temperature = 0.3;
    let mut second = Pipeline::new(
        RelayClient::new(&base).unwrap(),
        PostWriter::new(dir.path().join("out"), true),
        "sk-ant-test",
        template,
    )
    .with_cache(ResultCache::load(&cache_path).unwrap());
    assert!(matches!(second.process(&pdf).await.unwrap(), Outcome::Generated(_)));
    assert_eq!(calls.generate.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_cache_write_is_reported() {
    let (base, _) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "paper.pdf");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let outcome = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .with_cache(ResultCache::empty(blocker.join("cache.json")))
        .process(&pdf)
        .await
        .unwrap();
    assert!(matches!(&outcome, Outcome::NotStored { .. }));
    assert!(outcome.path().exists());
    assert!(outcome.warning().unwrap().starts_with("⚠️ Result was not cached: "));
    assert!(Outcome::Generated(outcome.path().to_path_buf()).warning().is_none());
}

#[tokio::test]
async fn arxiv_file_name_pulls_metadata() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "2103.00020.pdf");
    let arxiv = ArxivClient::new(reqwest::Client::new(), format!("{base}/arxiv"));

    let outcome = pipeline(&base, dir.path(), "sk-ant-test")
        .with_arxiv(arxiv)
        .process(&pdf)
        .await
        .unwrap();
    let doc = std::fs::read_to_string(outcome.path()).unwrap();
    let (fm, body) = parse_post(&doc);
    assert_eq!(fm["title"], "Learning Transferable Visual Models");
    assert_eq!(fm["arxiv_id"], "2103.00020");
    assert_eq!(fm["arxiv_url"], "https://arxiv.org/abs/2103.00020");
    assert_eq!(fm["authors"], "Alec Radford");
    assert!(body.starts_with("# Learning Transferable Visual Models"));
    assert_eq!(calls.arxiv.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn arxiv_outage_is_not_fatal() {
    let (base, _) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdf = write_pdf(dir.path(), "2103.00020.pdf");
    let arxiv = ArxivClient::new(reqwest::Client::new(), format!("{base}/missing"));

    let outcome = pipeline(&base, dir.path(), "sk-ant-test")
        .with_arxiv(arxiv)
        .process(&pdf)
        .await
        .unwrap();
    let doc = std::fs::read_to_string(outcome.path()).unwrap();
    let (fm, _) = parse_post(&doc);
    assert_eq!(fm["title"], "2103.00020");
    assert!(fm.get("arxiv_id").is_none());
}

#[tokio::test]
async fn batch_counts_failures_and_continues() {
    let (base, calls) = spawn_relay().await;
    let dir = tempfile::tempdir().unwrap();
    let pdfs = vec![
        write_pdf(dir.path(), "a.pdf"),
        write_pdf(dir.path(), "short.pdf"),
        write_pdf(dir.path(), "b.pdf"),
    ];

    let summary = pipeline(&base, &dir.path().join("out"), "sk-ant-test")
        .run_batch(&pdfs, Duration::ZERO)
        .await;
    assert_eq!(summary, BatchSummary { succeeded: 2, failed: 1 });
    assert_eq!(calls.generate.load(Ordering::SeqCst), 2);
}
