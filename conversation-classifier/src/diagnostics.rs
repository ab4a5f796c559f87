use serde::Serialize;
use serde_json::Value;

use crate::{
    category::{Category, Decision},
    message::{extract_content, RawMessage},
};

const PREVIEW_CHARS: usize = 100;

/// Observer for classification decisions. Implementations must not affect
/// the outcome; classification is identical with any sink.
pub trait ClassificationSink {
    fn record(&self, trace: &ClassificationTrace<'_>);
}

/// Discards every trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ClassificationSink for NoopSink {
    fn record(&self, _trace: &ClassificationTrace<'_>) {}
}

/// Emits each trace as a `debug` level tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ClassificationSink for TracingSink {
    fn record(&self, trace: &ClassificationTrace<'_>) {
        tracing::debug!(
            title = trace.title,
            rule = trace.rule,
            category = %trace.category,
            source = ?trace.source,
            context_type = ?trace.context_type,
            message_type = ?trace.message_type,
            has_file_selections = trace.has_file_selections,
            has_folder_selections = trace.has_folder_selections,
            has_commit_selections = trace.has_commit_selections,
            has_doc_selections = trace.has_doc_selections,
            preview = %trace.content_preview,
            "Classified conversation"
        );
    }
}

/// Everything the classifier looked at, plus what it decided.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationTrace<'a> {
    pub title: &'a str,
    pub rule: &'static str,
    pub category: Category,
    pub source: Option<&'a str>,
    pub context_type: Option<&'a Value>,
    pub message_type: Option<&'a Value>,
    pub has_file_selections: bool,
    pub has_folder_selections: bool,
    pub has_commit_selections: bool,
    pub has_doc_selections: bool,
    pub content_preview: String,
}

impl<'a> ClassificationTrace<'a> {
    pub fn new(first: &'a RawMessage, title: &'a str, decision: Decision) -> Self {
        Self {
            title,
            rule: decision.rule,
            category: decision.category,
            source: first.str_field("source"),
            context_type: first.context_field("type"),
            message_type: first.field("type"),
            has_file_selections: first.has_context_selection("fileSelections"),
            has_folder_selections: first.has_context_selection("folderSelections"),
            has_commit_selections: first.has_context_selection("selectedCommits"),
            has_doc_selections: first.has_context_selection("selectedDocs"),
            content_preview: extract_content(first).chars().take(PREVIEW_CHARS).collect(),
        }
    }
}
