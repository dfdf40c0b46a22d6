//! Entity to record mappers

use super::entity;
use crate::contract::OptionRecord;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Decode a stored row; anything but a JSON object is rejected
pub fn record_from_model(model: entity::Model) -> anyhow::Result<OptionRecord> {
    match model.option_value {
        Value::Object(record) => Ok(record),
        other => anyhow::bail!(
            "option {} holds a non-object value: {}",
            model.option_name,
            other
        ),
    }
}

/// Active model for a fresh row
pub fn new_active_model(name: &str, record: &OptionRecord, now: DateTime<Utc>) -> entity::ActiveModel {
    use sea_orm::ActiveValue::*;

    entity::ActiveModel {
        option_name: Set(name.to_string()),
        option_value: Set(Value::Object(record.clone())),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Active model replacing the value of an existing row
pub fn updated_active_model(
    existing: entity::Model,
    record: &OptionRecord,
    now: DateTime<Utc>,
) -> entity::ActiveModel {
    use sea_orm::ActiveValue::*;

    entity::ActiveModel {
        option_name: Unchanged(existing.option_name),
        option_value: Set(Value::Object(record.clone())),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(value: Value) -> entity::Model {
        entity::Model {
            option_name: "general".to_string(),
            option_value: value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_object_row_maps_to_record() {
        let record = record_from_model(model(json!({"site": "Acme", "debug": "on"}))).unwrap();
        assert_eq!(record.get("site"), Some(&json!("Acme")));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["site", "debug"]);
    }

    #[test]
    fn test_non_object_row_is_rejected() {
        let err = record_from_model(model(json!("oops"))).unwrap_err();
        assert!(err.to_string().contains("general"));
    }

    #[test]
    fn test_update_keeps_creation_time() {
        let existing = model(json!({}));
        let created = existing.created_at;
        let active = updated_active_model(existing, &OptionRecord::new(), Utc::now());
        assert_eq!(active.created_at, sea_orm::ActiveValue::Unchanged(created));
    }
}
