//! Notion sink
//!
//! Appends each annotation to a fixed Notion page as a block group: a
//! divider, a bold gray header line, one bullet per sentence of the
//! selected text, and a callout holding the annotation itself.

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};

use super::{NoteError, NoteSink};
use crate::config::NotionConfig;
use crate::session::AnnotationRecord;

const NOTION_VERSION: &str = "2022-06-28";

/// Notion REST API client
pub struct NotionSink {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    page_id: String,
}

impl NotionSink {
    pub fn new(config: &NotionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_id: config.page_id.clone(),
        }
    }
}

#[async_trait]
impl NoteSink for NotionSink {
    async fn publish(&self, record: &AnnotationRecord) -> Result<(), NoteError> {
        if self.api_key.is_empty() || self.page_id.is_empty() {
            return Err(NoteError::NotConfigured);
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M").to_string();
        let blocks = build_blocks(record, &timestamp);

        let url = format!("{}/v1/blocks/{}/children", self.api_url, self.page_id);
        let response = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "children": blocks }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            document = %record.document_name,
            page = record.page_number,
            "Annotation saved to Notion"
        );
        Ok(())
    }
}

fn text_block(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

/// Build the Notion block list for one annotation
pub fn build_blocks(record: &AnnotationRecord, timestamp: &str) -> Vec<Value> {
    let header = format!(
        "📄 {} | Page {} | {}",
        record.document_name, record.page_number, timestamp
    );

    let mut blocks = vec![
        json!({
            "object": "block",
            "type": "divider",
            "divider": {}
        }),
        json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": header },
                    "annotations": { "bold": true, "color": "gray" }
                }]
            }
        }),
    ];

    for sentence in split_sentences(&record.selected_text) {
        blocks.push(json!({
            "object": "block",
            "type": "bulleted_list_item",
            "bulleted_list_item": { "rich_text": [text_block(&sentence)] }
        }));
    }

    blocks.push(json!({
        "object": "block",
        "type": "callout",
        "callout": {
            "rich_text": [text_block(&record.annotation_text)],
            "icon": { "type": "emoji", "emoji": "💬" }
        }
    }));

    blocks
}

/// Split text into sentences for bullet points.
///
/// Whitespace is normalized first; a sentence ends at `.`, `!` or `?`
/// followed by a space (or end of text). Empty fragments are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = normalized.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().map_or(true, |n| *n == ' ') {
            chars.next_if_eq(&' ');
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
