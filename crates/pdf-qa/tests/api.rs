//! Router-level tests against in-process providers

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use pdf_qa::config::AppConfig;
use pdf_qa::providers::{CompletionProvider, DocumentExtractor, EmbeddingProvider, MemoryIndex};
use pdf_qa::retrieval::FALLBACK_ANSWER;
use pdf_qa::server::{router, state::AppState};
use pdf_qa::{AnswerPipeline, Error, ExtractedDocument, IngestPipeline, Result, TextChunker};

const BOUNDARY: &str = "----pdfqa-test-boundary";

/// Letter-frequency embedding; similar wording lands close together
struct LetterEmbedder;

impl LetterEmbedder {
    fn embed(text: &str) -> Vec<f32> {
        let mut counts = vec![0.0; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        counts
    }
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::embed(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    fn dimensions(&self) -> usize {
        26
    }
}

struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("openai embeddings: HTTP 401 Unauthorized"))
    }

    async fn embed_many(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(Error::embedding("openai embeddings: HTTP 401 Unauthorized"))
    }

    fn dimensions(&self) -> usize {
        26
    }
}

/// Records every prompt and answers with a fixed string
#[derive(Default)]
struct RecordingCompletion {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok("The warranty lasts two years.".to_string())
    }
}

/// Treats the upload bytes as UTF-8 page text, pages split on form feed
struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedDocument> {
        let text = std::str::from_utf8(data).map_err(|e| Error::extraction(e.to_string()))?;
        Ok(ExtractedDocument::from_page_texts(text.split('\u{c}')))
    }
}

struct Harness {
    app: Router,
    index: Arc<MemoryIndex>,
    completion: Arc<RecordingCompletion>,
}

fn harness_with(embedder: Arc<dyn EmbeddingProvider>) -> Harness {
    let config = AppConfig::default();
    let index = Arc::new(MemoryIndex::new());
    let completion = Arc::new(RecordingCompletion::default());

    let ingest = IngestPipeline::new(
        Arc::new(PlainTextExtractor),
        TextChunker::new(200, 40).unwrap(),
        Arc::clone(&embedder),
        index.clone(),
    );
    let answer = AnswerPipeline::new(embedder, index.clone(), completion.clone(), 5);

    Harness {
        app: router(AppState::new(config, ingest, answer)),
        index,
        completion,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(LetterEmbedder))
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload-document")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, "manual.pdf", content)))
        .unwrap()
}

fn question_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask-question")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_root_reports_running() {
    let h = harness();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Backend running successfully!" }));
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_question_is_bad_request() {
    let h = harness();
    let (status, body) = send(&h.app, question_request(json!({ "question": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(h.completion.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_missing_question_is_bad_request() {
    let h = harness();
    let (status, body) = send(&h.app, question_request(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn test_non_json_question_is_bad_request() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/ask-question")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("what?"))
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_question_against_empty_index_returns_fallback() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        question_request(json!({ "question": "How long is the warranty?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], FALLBACK_ANSWER);
    assert!(h.completion.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_upload_without_document_field_is_bad_request() {
    let h = harness();
    let (status, body) = send(&h.app, upload_request("attachment", b"some text")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("document"));
    assert!(h.index.is_empty());
}

#[tokio::test]
async fn test_upload_without_multipart_is_bad_request() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/upload-document")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_then_ask() {
    let h = harness();
    let manual = "Product manual.\nThe warranty lasts two years from purchase.\u{c}\
                  Cleaning: wipe with a dry cloth. Do not submerge the device in water.";

    let (status, body) = send(&h.app, upload_request("document", manual.as_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Document processed and indexed successfully.");
    assert_eq!(body["chunk_count"], h.index.len());
    assert!(!h.index.is_empty());

    let stored = h.index.vectors();
    assert!(stored
        .iter()
        .all(|v| v.metadata["source"] == "manual.pdf" && v.text().is_some()));

    let (status, body) = send(
        &h.app,
        question_request(json!({ "question": "How long is the warranty?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "The warranty lasts two years.");

    let prompts = h.completion.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("warranty lasts two years from purchase"));
    assert!(prompts[0].contains("How long is the warranty?"));
}

#[tokio::test]
async fn test_upload_with_no_text_is_server_error() {
    let h = harness();
    let (status, body) = send(&h.app, upload_request("document", b"   \n\t  ")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error processing document: "));
    assert!(h.index.is_empty());
}

#[tokio::test]
async fn test_embedding_failure_surfaces_as_500() {
    let h = harness_with(Arc::new(FailingEmbedder));

    let (status, body) = send(&h.app, upload_request("document", b"Some real text.")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error processing document: "));
    assert!(error.contains("401"));

    let (status, body) = send(&h.app, question_request(json!({ "question": "anything?" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error answering question: "));
}
