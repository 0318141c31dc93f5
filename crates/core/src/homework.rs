//! Validation of status API answers and rendering of status messages.

use crate::{HomeworkError, HomeworkResult, Verdict};
use serde_json::Value;

/// Validated top-level shape of a status API answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Homework entries, most recent first.
    pub homeworks: Vec<Value>,
    /// Server time of the answer, if it was an integer timestamp.
    pub current_date: Option<i64>,
}

impl ApiResponse {
    /// Most recent homework entry, if any.
    pub fn latest(&self) -> Option<&Value> {
        self.homeworks.first()
    }
}

/// Checks that `body` is an object carrying `homeworks` (an array) and
/// `current_date`.
pub fn validate_response(body: &Value) -> HomeworkResult<ApiResponse> {
    let map = body.as_object().ok_or(HomeworkError::UnexpectedType {
        field: "response",
        expected: "object",
        found: json_type(body),
    })?;

    let homeworks = map
        .get("homeworks")
        .ok_or(HomeworkError::EmptyResponse("homeworks"))?;
    let current_date = map
        .get("current_date")
        .ok_or(HomeworkError::EmptyResponse("current_date"))?;

    let homeworks = homeworks
        .as_array()
        .ok_or(HomeworkError::UnexpectedType {
            field: "homeworks",
            expected: "array",
            found: json_type(homeworks),
        })?
        .clone();

    Ok(ApiResponse {
        homeworks,
        current_date: current_date
            .as_i64()
            .or_else(|| current_date.as_f64().map(|ts| ts as i64)),
    })
}

/// One homework entry with a known verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub name: String,
    pub verdict: Verdict,
}

impl HomeworkRecord {
    /// Extracts name and verdict from a raw homework entry.
    pub fn from_value(homework: &Value) -> HomeworkResult<Self> {
        let map = homework.as_object().ok_or(HomeworkError::UnexpectedType {
            field: "homework",
            expected: "object",
            found: json_type(homework),
        })?;

        let name = map
            .get("homework_name")
            .ok_or(HomeworkError::MissingHomeworkName)?;
        let name = name
            .as_str()
            .ok_or(HomeworkError::UnexpectedType {
                field: "homework_name",
                expected: "string",
                found: json_type(name),
            })?
            .to_string();

        let verdict = match map.get("status") {
            Some(Value::String(status)) => status
                .parse::<Verdict>()
                .map_err(HomeworkError::UnknownStatus)?,
            Some(other) => return Err(HomeworkError::UnknownStatus(other.to_string())),
            None => return Err(HomeworkError::UnknownStatus("null".to_string())),
        };

        Ok(Self { name, verdict })
    }

    /// Notification text for this homework.
    pub fn status_message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.name,
            self.verdict.phrase()
        )
    }
}

/// Renders the notification text for a raw homework entry.
pub fn parse_status(homework: &Value) -> HomeworkResult<String> {
    HomeworkRecord::from_value(homework).map(|record| record.status_message())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_validate_response_ok() {
        let body = json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 1700000000
        });
        let response = validate_response(&body).unwrap();
        assert_eq!(response.homeworks.len(), 1);
        assert_eq!(response.current_date, Some(1700000000));
        assert_eq!(response.latest().unwrap()["homework_name"], "hw1");
    }

    #[test]
    fn test_validate_response_empty_homeworks() {
        let body = json!({"homeworks": [], "current_date": 10});
        let response = validate_response(&body).unwrap();
        assert!(response.latest().is_none());
    }

    #[test]
    fn test_validate_response_missing_keys() {
        for body in [json!({"current_date": 1}), json!({"homeworks": []}), json!({})] {
            let err = validate_response(&body).unwrap_err();
            assert!(matches!(err, HomeworkError::EmptyResponse(_)), "{err:?}");
        }
        assert_eq!(
            validate_response(&json!({"homeworks": []})).unwrap_err(),
            HomeworkError::EmptyResponse("current_date")
        );
    }

    #[test]
    fn test_validate_response_homeworks_not_array() {
        for homeworks in [json!({"a": 1}), json!("hw"), json!(3), json!(null)] {
            let body = json!({"homeworks": homeworks, "current_date": 1});
            let err = validate_response(&body).unwrap_err();
            assert!(
                matches!(err, HomeworkError::UnexpectedType { field: "homeworks", .. }),
                "{err:?}"
            );
        }
    }

    #[test]
    fn test_validate_response_not_object() {
        let err = validate_response(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            HomeworkError::UnexpectedType {
                field: "response",
                expected: "object",
                found: "array",
            }
        );
    }

    #[test]
    fn test_validate_response_non_integer_current_date() {
        let body = json!({"homeworks": [], "current_date": "yesterday"});
        assert_eq!(validate_response(&body).unwrap().current_date, None);

        let body = json!({"homeworks": [], "current_date": 12.7});
        assert_eq!(validate_response(&body).unwrap().current_date, Some(12));
    }

    #[test]
    fn test_parse_status_known_verdicts() {
        let expected = [
            ("approved", "Работа проверена: ревьюеру всё понравилось. Ура!"),
            ("reviewing", "Работа взята на проверку ревьюером."),
            ("rejected", "Работа проверена: у ревьюера есть замечания."),
        ];
        for (status, phrase) in expected {
            let homework = json!({"homework_name": "bot_project", "status": status});
            assert_eq!(
                parse_status(&homework).unwrap(),
                format!("Изменился статус проверки работы \"bot_project\". {phrase}")
            );
        }
    }

    #[test]
    fn test_parse_status_missing_name() {
        let homework = json!({"status": "approved"});
        assert_eq!(
            parse_status(&homework).unwrap_err(),
            HomeworkError::MissingHomeworkName
        );
    }

    #[test]
    fn test_parse_status_unknown_status() {
        let homework = json!({"homework_name": "hw", "status": "lost"});
        assert_eq!(
            parse_status(&homework).unwrap_err(),
            HomeworkError::UnknownStatus("lost".to_string())
        );

        let homework = json!({"homework_name": "hw"});
        assert!(matches!(
            parse_status(&homework).unwrap_err(),
            HomeworkError::UnknownStatus(_)
        ));

        let homework = json!({"homework_name": "hw", "status": 1});
        assert_eq!(
            parse_status(&homework).unwrap_err(),
            HomeworkError::UnknownStatus("1".to_string())
        );
    }

    #[test]
    fn test_record_ignores_extra_fields() {
        let homework = json!({
            "id": 124,
            "homework_name": "username__hw_python_oop.zip",
            "status": "rejected",
            "reviewer_comment": "Fix the tests",
            "date_updated": "2020-02-13T16:42:47Z",
            "lesson_name": "Итоговый проект"
        });
        let record = HomeworkRecord::from_value(&homework).unwrap();
        assert_eq!(record.name, "username__hw_python_oop.zip");
        assert_eq!(record.verdict, Verdict::Rejected);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(HomeworkError::EmptyResponse("homeworks").kind(), "malformed_response");
        assert_eq!(HomeworkError::MissingHomeworkName.kind(), "missing_homework_name");
        assert_eq!(HomeworkError::UnknownStatus("x".into()).kind(), "unknown_status");
    }
}
