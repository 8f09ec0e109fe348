//! JSON formatter for scripting

use super::formatter::{selected_categories, OutputFormatter};
use crate::{
    config::ValidationWarning,
    error::Result,
    models::{Category, ConfigKey, ConfigModel, ConfigValue, SetOutcome},
};
use serde_json::{json, Map, Value};

/// Machine-readable formatter; every method returns one JSON document
#[derive(Debug, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    fn category_object(model: &ConfigModel, category: Category) -> Result<Value> {
        let mut object = Map::new();
        for key in category.keys() {
            object.insert(key.name().to_string(), serde_json::to_value(model.get(key))?);
        }
        Ok(Value::Object(object))
    }

    fn message(&self, level: &str, message: &str) -> Result<String> {
        self.render(&json!({ "level": level, "message": message }))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        self.render(&json!({ "title": title }))
    }

    fn format_model(&self, model: &ConfigModel, category: Option<Category>) -> Result<String> {
        let value = match category {
            Some(category) => Self::category_object(model, category)?,
            None => {
                let mut object = Map::new();
                for category in selected_categories(None) {
                    object.insert(category.to_string(), Self::category_object(model, category)?);
                }
                Value::Object(object)
            }
        };
        self.render(&value)
    }

    fn format_value(&self, key: ConfigKey, value: &ConfigValue) -> Result<String> {
        self.render(&json!({ "key": key.to_string(), "value": value }))
    }

    fn format_set_outcome(&self, key: ConfigKey, outcome: &SetOutcome, stored: &ConfigValue) -> Result<String> {
        let mut value = json!({ "key": key.to_string(), "value": stored });
        match outcome {
            SetOutcome::Applied => value["outcome"] = json!("applied"),
            SetOutcome::Clamped { requested, .. } => {
                value["outcome"] = json!("clamped");
                value["requested"] = json!(requested);
            }
            SetOutcome::Rejected(reason) => {
                value["outcome"] = json!("rejected");
                value["reason"] = json!(reason);
            }
        }
        self.render(&value)
    }

    fn format_warnings(&self, warnings: &[ValidationWarning]) -> Result<String> {
        self.render(&serde_json::to_value(warnings)?)
    }

    fn format_discovery(&self, label: &str, servers: &str) -> Result<String> {
        self.render(&json!({ "label": label, "servers": servers }))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        self.message("error", error)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        self.message("warning", warning)
    }

    fn format_success(&self, message: &str) -> Result<String> {
        self.message("success", message)
    }
}
