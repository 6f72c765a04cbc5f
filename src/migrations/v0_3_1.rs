//! v0.3.1: task due dates become RFC 3339 strings and `done` becomes `completed`.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::error::TransformError;
use crate::json::{array_mut, into_object, kind_name};

pub fn migrate(document: Value) -> Result<Value, TransformError> {
    let mut doc = into_object(document)?;

    if let Some(tasks) = array_mut(&mut doc, "tasks") {
        for task in tasks.iter_mut() {
            if let Value::Object(task) = task {
                migrate_task(task)?;
            }
        }
    }

    Ok(Value::Object(doc))
}

fn migrate_task(task: &mut Map<String, Value>) -> Result<(), TransformError> {
    if let Some(due_date) = task.remove("dueDate") {
        let due = convert_due(task, due_date)?;
        task.entry("due".to_string()).or_insert(due);
    }

    let done = task.remove("done").and_then(|v| v.as_bool()).unwrap_or(false);
    task.entry("completed".to_string())
        .or_insert(Value::Bool(done));

    Ok(())
}

/// Legacy due dates were epoch milliseconds, RFC 3339 strings, or bare
/// `YYYY-MM-DD` dates (taken as midnight UTC).
fn convert_due(task: &Map<String, Value>, due_date: Value) -> Result<Value, TransformError> {
    match due_date {
        Value::Null => Ok(Value::Null),
        Value::Number(ref number) => {
            let millis = whole_millis(number).ok_or_else(|| out_of_range(task, &due_date))?;
            let parsed =
                DateTime::from_timestamp_millis(millis).ok_or_else(|| out_of_range(task, &due_date))?;
            Ok(Value::String(format_utc(parsed)))
        }
        Value::String(raw) => {
            if DateTime::parse_from_rfc3339(&raw).is_ok() {
                return Ok(Value::String(raw));
            }
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                TransformError::new(format!(
                    "task {}: dueDate '{raw}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date",
                    task_label(task)
                ))
            })?;
            Ok(Value::String(format_utc(date.and_time(NaiveTime::MIN).and_utc())))
        }
        other => Err(TransformError::new(format!(
            "task {}: dueDate must be a number or string, got {}",
            task_label(task),
            kind_name(&other)
        ))),
    }
}

/// Integer milliseconds, including floats with no fractional part.
fn whole_millis(number: &Number) -> Option<i64> {
    if let Some(millis) = number.as_i64() {
        return Some(millis);
    }
    let float = number.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}

fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn out_of_range(task: &Map<String, Value>, value: &Value) -> TransformError {
    TransformError::new(format!(
        "task {}: dueDate {value} is not a valid millisecond timestamp",
        task_label(task)
    ))
}

fn task_label(task: &Map<String, Value>) -> String {
    task.get("id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string()
}
