//! Structural validation of the current data-file shape.
//!
//! This is the gate between untyped migration output and the typed
//! [`DataFile`] model: every document handed to the rest of the application
//! goes through [`validate`], and all violations are reported at once.

use std::collections::HashSet;

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{SchemaError, Violation};
use crate::json::{kind_name, version_field};
use crate::model::DataFile;

const REQUIRED_COLLECTIONS: [&str; 3] = ["tasks", "projects", "labels"];
const THEMES: [&str; 3] = ["light", "dark", "system"];
const WEEK_STARTS: [&str; 2] = ["monday", "sunday"];

/// A document that passed [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    value: Value,
}

impl ValidatedDocument {
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn version(&self) -> Option<&str> {
        version_field(&self.value)
    }

    pub fn to_model(&self) -> Result<DataFile, serde_json::Error> {
        DataFile::deserialize(&self.value)
    }

    pub fn into_model(self) -> Result<DataFile, serde_json::Error> {
        serde_json::from_value(self.value)
    }
}

/// Validate `document`, taking ownership of it on success.
pub fn validate(document: Value) -> Result<ValidatedDocument, SchemaError> {
    let violations = check(&document);
    if violations.is_empty() {
        Ok(ValidatedDocument { value: document })
    } else {
        Err(SchemaError { violations })
    }
}

/// List every violated constraint without consuming the document.
pub fn check(document: &Value) -> Vec<Violation> {
    let mut checker = Checker::default();
    checker.document(document);
    checker.violations
}

#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    fn expected(&mut self, path: impl Into<String>, expected: &str, found: &Value) {
        self.fail(path, format!("expected {expected}, got {}", kind_name(found)));
    }

    fn document(&mut self, document: &Value) {
        let Some(doc) = document.as_object() else {
            self.expected("/", "object", document);
            return;
        };

        if let Some(version) = doc.get("version")
            && !version.is_string()
        {
            self.expected("/version", "string", version);
        }

        for key in REQUIRED_COLLECTIONS {
            let path = format!("/{key}");
            match doc.get(key) {
                None => self.fail(path, "missing required array"),
                Some(Value::Array(items)) => self.collection(key, items),
                Some(other) => self.expected(path, "array", other),
            }
        }

        if let Some(groups) = doc.get("projectGroups") {
            self.project_groups(groups);
        }

        if let Some(settings) = doc.get("settings") {
            self.settings(settings);
        }

        if doc.contains_key("ordering") {
            self.fail(
                "/ordering",
                "legacy ordering block present; expected projectGroups",
            );
        }
    }

    fn collection(&mut self, key: &str, items: &[Value]) {
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let path = format!("/{key}/{index}");
            let Some(obj) = item.as_object() else {
                self.expected(path, "object", item);
                continue;
            };

            if let Some(id) = self.required_string(obj, &path, "id")
                && !seen.insert(id)
            {
                self.fail(format!("{path}/id"), format!("duplicate id '{id}'"));
            }

            match key {
                "tasks" => self.task(obj, &path),
                _ => {
                    self.required_string(obj, &path, "name");
                }
            }
        }
    }

    fn task(&mut self, task: &Map<String, Value>, path: &str) {
        self.required_string(task, path, "title");

        if let Some(value) = task.get("description")
            && !(value.is_string() || value.is_null())
        {
            self.expected(format!("{path}/description"), "string or null", value);
        }

        if let Some(value) = task.get("completed")
            && !value.is_boolean()
        {
            self.expected(format!("{path}/completed"), "boolean", value);
        }

        if let Some(value) = task.get("projectId")
            && !(value.is_string() || value.is_null())
        {
            self.expected(format!("{path}/projectId"), "string or null", value);
        }

        if let Some(value) = task.get("labelIds") {
            self.string_array(value, &format!("{path}/labelIds"));
        }

        match task.get("due") {
            None | Some(Value::Null) => {}
            Some(Value::String(raw)) => {
                if DateTime::parse_from_rfc3339(raw).is_err() {
                    self.fail(
                        format!("{path}/due"),
                        format!("'{raw}' is not an RFC 3339 timestamp"),
                    );
                }
            }
            Some(other) => self.expected(format!("{path}/due"), "string or null", other),
        }
    }

    fn project_groups(&mut self, groups: &Value) {
        let Some(obj) = groups.as_object() else {
            self.expected("/projectGroups", "object", groups);
            return;
        };

        let items = match obj.get("items") {
            None => {
                self.fail("/projectGroups/items", "missing required array");
                return;
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.expected("/projectGroups/items", "array", other);
                return;
            }
        };

        let mut listed = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let path = format!("/projectGroups/items/{index}");
            match item {
                Value::String(id) => self.listed_once(&mut listed, id, path),
                Value::Object(group) => {
                    self.required_string(group, &path, "id");
                    self.required_string(group, &path, "name");
                    let members_path = format!("{path}/items");
                    match group.get("items") {
                        Some(value) => {
                            self.string_array(value, &members_path);
                            let members = value.as_array().map(Vec::as_slice).unwrap_or_default();
                            for (member, id) in members.iter().enumerate() {
                                if let Some(id) = id.as_str() {
                                    self.listed_once(&mut listed, id, format!("{members_path}/{member}"));
                                }
                            }
                        }
                        None => self.fail(members_path, "missing required array"),
                    }
                }
                other => self.expected(path, "project id or group object", other),
            }
        }
    }

    /// A project may appear only once across top-level items and groups.
    fn listed_once<'a>(&mut self, listed: &mut HashSet<&'a str>, id: &'a str, path: String) {
        if !listed.insert(id) {
            self.fail(path, format!("project '{id}' listed more than once"));
        }
    }

    fn settings(&mut self, settings: &Value) {
        let Some(obj) = settings.as_object() else {
            self.expected("/settings", "object", settings);
            return;
        };

        self.one_of(obj, "/settings/theme", "theme", &THEMES);
        self.one_of(obj, "/settings/startOfWeek", "startOfWeek", &WEEK_STARTS);

        if let Some(value) = obj.get("showCompleted")
            && !value.is_boolean()
        {
            self.expected("/settings/showCompleted", "boolean", value);
        }
    }

    fn one_of(&mut self, obj: &Map<String, Value>, path: &str, key: &str, allowed: &[&str]) {
        match obj.get(key) {
            None => {}
            Some(Value::String(value)) if allowed.contains(&value.as_str()) => {}
            Some(Value::String(value)) => self.fail(
                path,
                format!("'{value}' is not one of {}", allowed.join(", ")),
            ),
            Some(other) => self.expected(path, "string", other),
        }
    }

    fn required_string<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<&'a str> {
        let field_path = format!("{path}/{key}");
        match obj.get(key) {
            None => {
                self.fail(field_path, "missing required string");
                None
            }
            Some(Value::String(value)) => Some(value.as_str()),
            Some(other) => {
                self.expected(field_path, "string", other);
                None
            }
        }
    }

    fn string_array(&mut self, value: &Value, path: &str) {
        let Some(items) = value.as_array() else {
            self.expected(path, "array", value);
            return;
        };
        for (index, item) in items.iter().enumerate() {
            if !item.is_string() {
                self.expected(format!("{path}/{index}"), "string", item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current() -> Value {
        json!({
            "version": "v0.4.0",
            "tasks": [{"id": "t1", "title": "One", "completed": false, "labelIds": ["l1"]}],
            "projects": [{"id": "p1", "name": "Home"}],
            "labels": [{"id": "l1", "name": "soon"}],
            "projectGroups": {"items": ["p1", {"id": "g", "name": "Group", "items": []}]},
            "settings": {"theme": "system", "startOfWeek": "monday", "showCompleted": true}
        })
    }

    fn paths(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.path.as_str()).collect()
    }

    #[test]
    fn accepts_current_document() {
        let validated = validate(current()).unwrap();
        assert_eq!(validated.version(), Some("v0.4.0"));
        let model = validated.to_model().unwrap();
        assert_eq!(model.tasks.len(), 1);
        assert_eq!(validated.into_model().unwrap(), model);
    }

    #[test]
    fn accepts_minimal_document() {
        assert!(validate(json!({"tasks": [], "projects": [], "labels": []})).is_ok());
    }

    #[test]
    fn rejects_non_objects() {
        let err = validate(json!([])).unwrap_err();
        assert_eq!(paths(&err.violations), vec!["/"]);
    }

    #[test]
    fn reports_every_missing_collection() {
        let err = validate(json!({"tasks": {}})).unwrap_err();
        assert_eq!(paths(&err.violations), vec!["/tasks", "/projects", "/labels"]);
        assert_eq!(err.violations[0].message, "expected array, got object");
        assert_eq!(err.violations[1].message, "missing required array");
    }

    #[test]
    fn checks_nested_task_fields() {
        let mut doc = current();
        doc["tasks"] = json!([
            {"id": 7, "title": "x"},
            {"id": "t2", "completed": "yes", "labelIds": ["a", 1], "due": "tomorrow"},
            "loose"
        ]);

        let err = validate(doc).unwrap_err();
        assert_eq!(
            paths(&err.violations),
            vec![
                "/tasks/0/id",
                "/tasks/1/title",
                "/tasks/1/completed",
                "/tasks/1/labelIds/1",
                "/tasks/1/due",
                "/tasks/2",
            ]
        );
    }

    #[test]
    fn rejects_duplicate_ids_within_a_collection() {
        let mut doc = current();
        doc["projects"] = json!([{"id": "p", "name": "A"}, {"id": "p", "name": "B"}]);
        let err = validate(doc).unwrap_err();
        assert_eq!(paths(&err.violations), vec!["/projects/1/id"]);
        assert_eq!(err.violations[0].message, "duplicate id 'p'");
    }

    #[test]
    fn rejects_leftover_legacy_ordering() {
        let mut doc = current();
        doc["ordering"] = json!({"projects": []});
        let err = validate(doc).unwrap_err();
        assert_eq!(paths(&err.violations), vec!["/ordering"]);
    }

    #[test]
    fn checks_groups_and_settings() {
        let mut doc = current();
        doc["projectGroups"] = json!({"items": [3, {"id": "g", "items": "p"}]});
        doc["settings"] = json!({"theme": "neon", "startOfWeek": 1, "showCompleted": "no"});

        let err = validate(doc).unwrap_err();
        assert_eq!(
            paths(&err.violations),
            vec![
                "/projectGroups/items/0",
                "/projectGroups/items/1/name",
                "/projectGroups/items/1/items",
                "/settings/theme",
                "/settings/startOfWeek",
                "/settings/showCompleted",
            ]
        );
    }

    #[test]
    fn rejects_projects_listed_twice_in_groups() {
        let mut doc = current();
        doc["projectGroups"] = json!({"items": [
            "p1",
            {"id": "g", "name": "Group", "items": ["p2", "p1"]},
            "p2"
        ]});

        let err = validate(doc).unwrap_err();
        assert_eq!(
            paths(&err.violations),
            vec!["/projectGroups/items/1/items/1", "/projectGroups/items/2"]
        );
        assert_eq!(err.violations[0].message, "project 'p1' listed more than once");
    }

    #[test]
    fn check_does_not_consume() {
        let doc = json!({"version": 4, "tasks": [], "projects": [], "labels": []});
        let violations = check(&doc);
        assert_eq!(paths(&violations), vec!["/version"]);
        assert_eq!(doc["version"], json!(4));
    }
}
