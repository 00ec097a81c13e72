use docchat_core::config::EngineConfig;
use docchat_core::document::DocumentVersion;
use docchat_core::error::{ChatError, InputError, NotFoundError};
use docchat_core::service::{ChatReply, ChatRequest, SectionEntry, SectionsResponse, UploadReceipt};
use docchat_core::types::{ContextSource, ContextWindow, SelectionRule};
use serde_json::{json, Value};

fn assert_key_order(json: &str, keys: &[&str]) {
    let positions: Vec<usize> = keys
        .iter()
        .map(|k| {
            json.find(&format!("\"{k}\":"))
                .unwrap_or_else(|| panic!("missing key {k} in {json}"))
        })
        .collect();

    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "keys out of order in {json}"
    );
}

#[test]
fn golden_context_window() {
    let window = ContextWindow {
        pages: vec![3, 4, 5],
        selection: SelectionRule::PageRange { start: 3, end: 5 },
        source: ContextSource::TruncatedFallback,
        chars: 5,
        text: "Heat.".to_string(),
    };

    let json = serde_json::to_string(&window).unwrap();
    assert_key_order(&json, &["pages", "selection", "source", "chars", "text"]);

    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        json!({
            "pages": [3, 4, 5],
            "selection": {"rule": "page_range", "start": 3, "end": 5},
            "source": "truncated_fallback",
            "chars": 5,
            "text": "Heat."
        })
    );
}

#[test]
fn golden_selection_rules() {
    let reference = serde_json::to_value(SelectionRule::SectionReference {
        reference: "chapter 2".to_string(),
    })
    .unwrap();
    assert_eq!(
        reference,
        json!({"rule": "section_reference", "reference": "chapter 2"})
    );

    let window = serde_json::to_value(SelectionRule::DefaultWindow { size: 10 }).unwrap();
    assert_eq!(window, json!({"rule": "default_window", "size": 10}));
}

#[test]
fn golden_error_bodies() {
    let cases: Vec<(ChatError, u16, &str)> = vec![
        (
            InputError::MissingField("message").into(),
            400,
            "Missing required field: message",
        ),
        (InputError::EmptyFilename.into(), 400, "No file selected"),
        (
            NotFoundError::Document("notes.pdf".to_string()).into(),
            404,
            "File notes.pdf not found",
        ),
        (
            ChatError::NoReadableText("scan.pdf".to_string()),
            422,
            "No readable text was extracted from scan.pdf",
        ),
    ];

    for (err, status, message) in cases {
        assert_eq!(err.status(), status);
        assert_eq!(
            serde_json::to_value(err.to_body()).unwrap(),
            json!({ "error": message })
        );
    }
}

#[test]
fn golden_upload_receipt() {
    let receipt = UploadReceipt {
        message: "File **a.pdf** uploaded successfully.".to_string(),
        redirect: "/chat.html".to_string(),
        filename: "a.pdf".to_string(),
        pages: 2,
        sections: 1,
        version: DocumentVersion::from_pages(["one", "two"]),
    };

    let json = serde_json::to_string(&receipt).unwrap();
    assert_key_order(
        &json,
        &["message", "redirect", "filename", "pages", "sections", "version"],
    );
    assert!(json.contains("\"version\":\"sha256:"));
}

#[test]
fn golden_chat_and_sections_shapes() {
    let reply = serde_json::to_value(ChatReply {
        response: "Entropy measures disorder.".to_string(),
    })
    .unwrap();
    assert_eq!(reply, json!({"response": "Entropy measures disorder."}));

    let sections = serde_json::to_value(SectionsResponse {
        sections: vec![SectionEntry {
            title: "Chapter 1 Basics".to_string(),
            page: 1,
        }],
    })
    .unwrap();
    assert_eq!(
        sections,
        json!({"sections": [{"title": "Chapter 1 Basics", "page": 1}]})
    );
}

#[test]
fn chat_request_fields_are_optional() {
    let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
    assert_eq!(request.message.as_deref(), Some("hi"));
    assert!(request.session_id.is_none());

    let empty: ChatRequest = serde_json::from_str("{}").unwrap();
    assert!(empty.message.is_none());
}

#[test]
fn version_depends_on_page_boundaries() {
    let split = DocumentVersion::from_pages(["ab", "c"]);
    let moved = DocumentVersion::from_pages(["a", "bc"]);

    assert_ne!(split, moved);
    assert_eq!(split, DocumentVersion::from_pages(["ab", "c"]));
}

#[test]
fn config_defaults_fill_missing_keys() {
    let config = EngineConfig::from_json_str(r#"{"context_budget": 1200}"#).unwrap();

    assert_eq!(config.context_budget, 1200);
    assert_eq!(config.prompt_budget, EngineConfig::v0().prompt_budget);
    assert!(EngineConfig::from_json_str(r#"{"default_window": 0}"#).is_err());
}
