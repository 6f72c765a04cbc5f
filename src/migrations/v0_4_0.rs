//! v0.4.0: user settings move into the data file.

use serde_json::{Value, json};

use crate::error::TransformError;
use crate::json::{insert_default, into_object, object_entry};

pub fn migrate(document: Value) -> Result<Value, TransformError> {
    let mut doc = into_object(document)?;

    let settings = object_entry(&mut doc, "settings");
    insert_default(settings, "theme", json!("system"));
    insert_default(settings, "startOfWeek", json!("monday"));
    insert_default(settings, "showCompleted", json!(true));

    Ok(Value::Object(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_default_settings() {
        let out = migrate(json!({"tasks": []})).unwrap();
        assert_eq!(
            out["settings"],
            json!({"theme": "system", "startOfWeek": "monday", "showCompleted": true})
        );
    }

    #[test]
    fn keeps_existing_setting_values() {
        let out = migrate(json!({"settings": {"theme": "dark", "extra": 1}})).unwrap();
        assert_eq!(
            out["settings"],
            json!({"theme": "dark", "extra": 1, "startOfWeek": "monday", "showCompleted": true})
        );
    }
}
