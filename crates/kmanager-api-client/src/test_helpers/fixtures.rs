//! Sample payloads shared by unit tests

use kmanager_core::models::{
    ContentMetadata, ContentSection, ContentType, DocumentMetadata, DocumentUpload,
    ProcessedContent, ProcessedDocument, ProcessedTutorial,
};
use serde_json::json;

pub fn sample_content(id: Option<&str>) -> ProcessedContent {
    ProcessedContent {
        metadata: ContentMetadata {
            id: id.map(str::to_string),
            title: "Understanding Lifetimes".to_string(),
            author: "Ferris".to_string(),
            source_url: "https://example.com/post".to_string(),
            content_type: ContentType::Article,
            duration: None,
            summary: Some("Lifetimes describe how long references stay valid.".to_string()),
            processed_date: None,
        },
        sections: vec![ContentSection {
            id: "section-0".to_string(),
            title: "Section 1".to_string(),
            content: "A reference must never outlive its referent.".to_string(),
        }],
    }
}

pub fn sample_document(document_id: &str) -> ProcessedDocument {
    ProcessedDocument {
        document_id: document_id.to_string(),
        content: "Release notes for the 2.0 line.".to_string(),
        metadata: DocumentMetadata {
            id: Some(document_id.to_string()),
            title: "Release notes".to_string(),
            tags: vec!["release".to_string()],
            file_type: Some("pdf".to_string()),
            file_size: Some(2048),
            upload_date: None,
        },
    }
}

pub fn sample_upload() -> DocumentUpload {
    DocumentUpload::new(
        "notes.pdf",
        b"%PDF-1.4 sample".to_vec(),
        "Release notes",
        vec!["release".to_string(), " rust ".to_string()],
    )
}

/// Section-based tutorial with one summary, key point and code example
pub fn sample_tutorial(content_id: &str) -> ProcessedTutorial {
    serde_json::from_value(json!({
        "metadata": {
            "title": "Ownership basics",
            "content_id": content_id,
            "source_url": "https://example.com/post",
            "content_type": "article",
            "generated_date": "2024-03-01T12:00:00Z"
        },
        "sections": [
            {
                "id": "s1",
                "type": "summary",
                "title": "Summary",
                "content": "Ownership in one page"
            },
            {
                "id": "s2",
                "type": "key_points",
                "title": "Key points",
                "content": "Every value has exactly one owner"
            },
            {
                "id": "s3",
                "type": "code_example",
                "title": "Moving a String",
                "content": "let a = String::new();\nlet b = a;",
                "metadata": { "language": "rust" }
            }
        ]
    }))
    .unwrap()
}
