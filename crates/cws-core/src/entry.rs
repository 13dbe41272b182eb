//! Transcript entry model.
//!
//! Claude Code writes session transcripts as append-only JSONL files
//! under `~/.claude/projects/<encoded-path>/<session>.jsonl`. Each line
//! is one entry; only the last line matters for live status.
//!
//! All fields except `type` are optional to handle partial records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The kind of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    Assistant,
    Summary,
    #[serde(rename = "queue-operation")]
    QueueOperation,
    /// Any record type we don't recognize; classified as skip.
    #[serde(other)]
    Other,
}

/// The kind of a message content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    ToolUse,
    ToolResult,
    #[serde(other)]
    Other,
}

/// A single transcript entry (one JSONL line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    #[serde(default)]
    pub message: Option<EntryMessage>,

    #[serde(default)]
    pub uuid: String,

    #[serde(default, rename = "parentUuid")]
    pub parent_uuid: Option<String>,

    #[serde(default)]
    pub timestamp: String,
}

/// The message payload of a user or assistant entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMessage {
    /// None both when the field is absent and when it is JSON null.
    #[serde(default)]
    pub stop_reason: Option<String>,

    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// One item of a message content array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: ContentKind,

    /// tool_use id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tool name, for tool_use items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Text body, for text items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Referenced tool_use id, for tool_result items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
}

impl EntryMessage {
    /// Kind of the first content item. An empty content array counts as text.
    pub fn first_content_kind(&self) -> ContentKind {
        self.content
            .first()
            .map(|c| c.kind)
            .unwrap_or(ContentKind::Text)
    }

    /// Name of the last named tool_use item, if any.
    pub fn last_tool_name(&self) -> Option<&str> {
        self.content
            .iter()
            .filter(|c| c.kind == ContentKind::ToolUse)
            .filter_map(|c| c.name.as_deref())
            .filter(|n| !n.is_empty())
            .last()
    }
}

/// Parses a single transcript line. Blank lines parse to `None`.
pub fn parse_entry(line: &str) -> CoreResult<Option<LogEntry>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let entry: LogEntry = serde_json::from_str(line)?;
    Ok(Some(entry))
}

/// Reads the last non-empty line of a transcript and parses it.
///
/// Returns `Ok(None)` for an empty file. Transcripts are append-only,
/// so the last line is always the most recent event.
pub fn read_last_entry(path: &Path) -> CoreResult<Option<LogEntry>> {
    let file = File::open(path).map_err(|e| CoreError::TranscriptRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = BufReader::new(file);
    let mut last_line = String::new();

    for line in reader.lines() {
        let line = line.map_err(|e| CoreError::TranscriptRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !line.trim().is_empty() {
            last_line = line;
        }
    }

    parse_entry(&last_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_assistant_entry() {
        let line = r#"{
            "type": "assistant",
            "uuid": "abc-123",
            "timestamp": "2025-01-10T10:00:00Z",
            "message": {
                "stop_reason": "tool_use",
                "content": [
                    {"type": "text", "text": "Let me check."},
                    {"type": "tool_use", "id": "toolu_1", "name": "Bash"}
                ]
            }
        }"#;

        let entry = parse_entry(line).unwrap().expect("should parse");
        assert_eq!(entry.kind, EntryKind::Assistant);
        let message = entry.message.expect("has message");
        assert_eq!(message.stop_reason.as_deref(), Some("tool_use"));
        assert_eq!(message.last_tool_name(), Some("Bash"));
    }

    #[test]
    fn test_parse_null_stop_reason() {
        let line = r#"{"type":"assistant","message":{"stop_reason":null,"content":[]}}"#;
        let entry = parse_entry(line).unwrap().expect("should parse");
        let message = entry.message.expect("has message");
        assert!(message.stop_reason.is_none());
        assert_eq!(message.first_content_kind(), ContentKind::Text);
    }

    #[test]
    fn test_parse_unknown_type_is_other() {
        let line = r#"{"type":"file-history-snapshot"}"#;
        let entry = parse_entry(line).unwrap().expect("should parse");
        assert_eq!(entry.kind, EntryKind::Other);
    }

    #[test]
    fn test_parse_queue_operation() {
        let line = r#"{"type":"queue-operation","uuid":"q-1"}"#;
        let entry = parse_entry(line).unwrap().expect("should parse");
        assert_eq!(entry.kind, EntryKind::QueueOperation);
    }

    #[test]
    fn test_parse_blank_line_is_none() {
        assert!(parse_entry("").unwrap().is_none());
        assert!(parse_entry("   \t").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_json_errors() {
        assert!(parse_entry("{not json").is_err());
    }

    #[test]
    fn test_last_tool_name_picks_last() {
        let line = r#"{"type":"assistant","message":{"stop_reason":"tool_use","content":[
            {"type":"tool_use","name":"Read"},
            {"type":"text","text":"and then"},
            {"type":"tool_use","name":"Edit"}
        ]}}"#;
        let entry = parse_entry(line).unwrap().expect("should parse");
        assert_eq!(
            entry.message.expect("has message").last_tool_name(),
            Some("Edit")
        );
    }

    #[test]
    fn test_read_last_entry_skips_trailing_blank() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"{{"type":"user","uuid":"u-1"}}"#).expect("write");
        writeln!(file, r#"{{"type":"assistant","uuid":"a-1"}}"#).expect("write");
        writeln!(file).expect("write");

        let entry = read_last_entry(file.path()).unwrap().expect("has entry");
        assert_eq!(entry.kind, EntryKind::Assistant);
        assert_eq!(entry.uuid, "a-1");
    }

    #[test]
    fn test_read_last_entry_empty_file() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        assert!(read_last_entry(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_last_entry_missing_file() {
        let result = read_last_entry(Path::new("/nonexistent/session.jsonl"));
        assert!(matches!(result, Err(CoreError::TranscriptRead { .. })));
    }
}
