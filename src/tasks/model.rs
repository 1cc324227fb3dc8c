//! Task data model and the JSON shapes used by the HTTP API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DateArgError, UpdateBodyError};

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateArgError> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(DateArgError::MalformedDateArgument(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| DateArgError::MalformedDateArgument(s.to_string()))
}

/// A titled to-do item scoped to a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-assigned id. Never reused, even after deletion.
    pub id: i64,
    pub title: String,
    /// Calendar date the task belongs to.
    pub date: NaiveDate,
    /// Completion flag, serialized as `done` on the wire.
    #[serde(rename = "done")]
    pub completed: bool,
}

/// Payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub date: NaiveDate,
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
        }
    }
}

/// Full replacement of a task's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "done")]
    pub completed: bool,
}

/// Body of `PUT /tasks/{id}` as received. Converted into an
/// [`UpdateRequest`] with [`TryFrom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateBody {
    pub title: Option<String>,
    pub date: Option<String>,
    pub done: Option<bool>,
}

/// A validated `PUT /tasks/{id}` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    /// Replace title, date and completion.
    Replace(TaskUpdate),
    /// Only set the completion flag.
    Completion { done: bool },
}

impl TryFrom<UpdateBody> for UpdateRequest {
    type Error = UpdateBodyError;

    /// A body naming `title` or `date` is a full replacement and must carry
    /// all three fields. Otherwise only `done` is expected.
    fn try_from(body: UpdateBody) -> Result<Self, Self::Error> {
        if body.title.is_none() && body.date.is_none() {
            let done = body.done.ok_or(UpdateBodyError::MissingField("done"))?;
            return Ok(Self::Completion { done });
        }

        let title = body.title.ok_or(UpdateBodyError::MissingField("title"))?;
        let date = body.date.ok_or(UpdateBodyError::MissingField("date"))?;
        let completed = body.done.ok_or(UpdateBodyError::MissingField("done"))?;

        Ok(Self::Replace(TaskUpdate {
            title,
            date: parse_date(&date)?,
            completed,
        }))
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_date_strict() {
        assert_eq!(parse_date("2026-02-28").unwrap(), date("2026-02-28"));
        for bad in ["2026-2-28", "2026-02-30", "26-02-28", "2026/02/28", "tomorrow", "", "2026-02-28 "] {
            assert_eq!(
                parse_date(bad),
                Err(DateArgError::MalformedDateArgument(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn task_serializes_with_done_field() {
        let task = Task {
            id: 7,
            title: "Buy milk".into(),
            date: date("2026-10-19"),
            completed: true,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "title": "Buy milk", "date": "2026-10-19", "done": true})
        );
    }

    #[test]
    fn new_task_parses_iso_date() {
        let parsed: NewTask =
            serde_json::from_str(r#"{"title": "Plan trip", "date": "2026-12-01"}"#).unwrap();
        assert_eq!(parsed, NewTask::new("Plan trip", date("2026-12-01")));
    }

    #[test]
    fn new_task_rejects_bad_date() {
        let parsed = serde_json::from_str::<NewTask>(r#"{"title": "x", "date": "tomorrow"}"#);
        assert!(parsed.is_err());
    }

    fn body(json: &str) -> Result<UpdateRequest, UpdateBodyError> {
        let body: UpdateBody = serde_json::from_str(json).unwrap();
        UpdateRequest::try_from(body)
    }

    #[test]
    fn update_request_completion_only() {
        assert_eq!(
            body(r#"{"done": true}"#).unwrap(),
            UpdateRequest::Completion { done: true }
        );
    }

    #[test]
    fn update_request_full_replace() {
        match body(r#"{"title": "Call mum", "date": "2026-10-20", "done": false}"#).unwrap() {
            UpdateRequest::Replace(update) => {
                assert_eq!(update.title, "Call mum");
                assert_eq!(update.date, date("2026-10-20"));
                assert!(!update.completed);
            }
            other => panic!("Expected Replace, got {other:?}"),
        }
    }

    #[test]
    fn update_request_with_title_needs_every_field() {
        assert_eq!(
            body(r#"{"title": "only title", "done": true}"#),
            Err(UpdateBodyError::MissingField("date"))
        );
        assert_eq!(
            body(r#"{"date": "2026-10-20", "done": true}"#),
            Err(UpdateBodyError::MissingField("title"))
        );
        assert_eq!(
            body(r#"{"title": "x", "date": "2026-10-20"}"#),
            Err(UpdateBodyError::MissingField("done"))
        );
    }

    #[test]
    fn update_request_rejects_malformed_date() {
        assert_eq!(
            body(r#"{"title": "New", "date": "2026/13/40", "done": true}"#),
            Err(UpdateBodyError::MalformedDate(
                DateArgError::MalformedDateArgument("2026/13/40".into())
            ))
        );
    }

    #[test]
    fn update_request_empty_body_is_rejected() {
        assert_eq!(body("{}"), Err(UpdateBodyError::MissingField("done")));
    }
}
