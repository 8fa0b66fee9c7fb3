//! Wire messages exchanged between the popup, the recognizer process, and
//! the page injector. All frames are single-line JSON.

use serde::{Deserialize, Serialize};

/// Outbound command on the persistent recognizer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RecognizerCommand {
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "STOP")]
    Stop,
}

/// Inbound update pushed by the recognizer process.
///
/// Fields are independently optional and may co-occur in one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl StatusUpdate {
    /// Parse one JSON line into an update (used by the port and by tests).
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }
}

/// One-shot command sent to the active tab's page injector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum PageCommand {
    #[serde(rename = "SEARCH_TEXT")]
    SearchText { value: String },
    #[serde(rename = "INSERT_AT_CURSOR")]
    InsertAtCursor { value: String },
}

impl PageCommand {
    /// The text payload carried by either variant.
    pub fn value(&self) -> &str {
        match self {
            PageCommand::SearchText { value } => value,
            PageCommand::InsertAtCursor { value } => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_command_start_shape() {
        let json = serde_json::to_string(&RecognizerCommand::Start).unwrap();
        assert_eq!(json, r#"{"action":"START"}"#);
    }

    #[test]
    fn test_recognizer_command_stop_shape() {
        let json = serde_json::to_string(&RecognizerCommand::Stop).unwrap();
        assert_eq!(json, r#"{"action":"STOP"}"#);
    }

    #[test]
    fn test_recognizer_command_roundtrip() {
        let parsed: RecognizerCommand =
            serde_json::from_str(r#"{"action":"STOP"}"#).unwrap();
        assert_eq!(parsed, RecognizerCommand::Stop);
    }

    #[test]
    fn test_status_update_all_fields() {
        let update =
            StatusUpdate::parse(r#"{"status":"listening","error":"boom","transcript":"hi"}"#)
                .unwrap();
        assert_eq!(update.status.as_deref(), Some("listening"));
        assert_eq!(update.error.as_deref(), Some("boom"));
        assert_eq!(update.transcript.as_deref(), Some("hi"));
    }

    #[test]
    fn test_status_update_fields_optional() {
        let update = StatusUpdate::parse(r#"{"transcript":"hello"}"#).unwrap();
        assert_eq!(update.status, None);
        assert_eq!(update.error, None);
        assert_eq!(update.transcript.as_deref(), Some("hello"));
    }

    #[test]
    fn test_status_update_empty_object() {
        let update = StatusUpdate::parse("{}").unwrap();
        assert_eq!(update, StatusUpdate::default());
    }

    #[test]
    fn test_status_update_ignores_unknown_fields() {
        let update = StatusUpdate::parse(r#"{"status":"stopped","confidence":0.93}"#).unwrap();
        assert_eq!(update.status.as_deref(), Some("stopped"));
    }

    #[test]
    fn test_status_update_parse_trims_newline() {
        let update = StatusUpdate::parse("{\"status\":\"listening\"}\n").unwrap();
        assert_eq!(update.status.as_deref(), Some("listening"));
    }

    #[test]
    fn test_status_update_skips_none_on_serialize() {
        let update = StatusUpdate {
            transcript: Some("hi".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"transcript":"hi"}"#);
    }

    #[test]
    fn test_page_command_search_shape() {
        let cmd = PageCommand::SearchText {
            value: "cats".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"action":"SEARCH_TEXT","value":"cats"}"#);
    }

    #[test]
    fn test_page_command_insert_shape() {
        let cmd = PageCommand::InsertAtCursor {
            value: "hello".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"action":"INSERT_AT_CURSOR","value":"hello"}"#);
    }

    #[test]
    fn test_page_command_roundtrip() {
        let parsed: PageCommand =
            serde_json::from_str(r#"{"action":"INSERT_AT_CURSOR","value":"x"}"#).unwrap();
        assert_eq!(
            parsed,
            PageCommand::InsertAtCursor {
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_page_command_unknown_action_rejected() {
        let result: serde_json::Result<PageCommand> =
            serde_json::from_str(r#"{"action":"EXPLODE","value":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_command_value_accessor() {
        let cmd = PageCommand::SearchText {
            value: "dogs".to_string(),
        };
        assert_eq!(cmd.value(), "dogs");
    }
}
