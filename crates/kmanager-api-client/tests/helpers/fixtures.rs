//! JSON bodies as the backend sends them

use serde_json::{json, Value};

pub fn task_json(task_id: &str, status: &str) -> Value {
    json!({ "task_id": task_id, "status": status })
}

pub fn content_json(content_id: &str) -> Value {
    json!({
        "content_id": content_id,
        "metadata": {
            "title": "Understanding Lifetimes",
            "author": "Ferris",
            "source_url": "https://example.com/post",
            "content_type": "article",
            "summary": "Lifetimes describe how long references stay valid.",
            "processed_date": "2024-03-01T12:00:00Z"
        },
        "chunks": [
            "A reference must never outlive its referent.",
            "The compiler checks this with lifetimes."
        ]
    })
}

pub fn document_json(document_id: &str) -> Value {
    json!({
        "document_id": document_id,
        "content": "Release notes for the 2.0 line.",
        "metadata": {
            "id": document_id,
            "title": "Release notes",
            "tags": ["release"],
            "file_type": "pdf",
            "file_size": 2048,
            "upload_date": "2024-03-02T08:30:00Z"
        }
    })
}

pub fn tutorial_json(content_id: &str) -> Value {
    json!({
        "metadata": {
            "title": "Ownership basics",
            "content_id": content_id,
            "source_url": "https://example.com/post",
            "content_type": "article",
            "generated_date": "2024-03-01T12:00:00Z"
        },
        "sections": [
            { "id": "s1", "type": "summary", "title": "Summary", "content": "Ownership in one page" },
            { "id": "s2", "type": "key_points", "title": "Key points", "content": "One owner per value" }
        ]
    })
}

pub fn content_list_item(id: &str, title: &str, content_type: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "type": content_type,
        "source": "web",
        "metadata": {
            "author": "Ferris",
            "source_url": format!("https://example.com/{}", id),
            "summary": "",
            "processed_date": "2024-03-01 12:00:00"
        }
    })
}
