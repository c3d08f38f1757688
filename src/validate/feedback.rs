//! Save-with-feedback workflow
//!
//! Validates input, runs lifecycle hooks, saves through the host's
//! [`Persist`] impl, and folds the result into a structured, serializable
//! outcome carrying a flash message and redirect target for the caller's
//! session layer.

use log::warn;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use super::{JsonMap, Validates, ValidationErrors, ValidationFailure, value_to_json};
use crate::events::{EventHooks, ModelEvent};
use crate::model::{Model, Persist};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Created,
    Updated,
    Invalid,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One session flash message for the caller to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Structured result of one save attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub status: SaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub payload: JsonValue,
}

impl SaveOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, SaveStatus::Created | SaveStatus::Updated)
    }
}

/// Messages and redirect targets for the outcome.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    success_message: Option<String>,
    error_message: Option<String>,
    redirect_on_success: Option<String>,
    redirect_on_error: Option<String>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn redirect_on_success(mut self, target: impl Into<String>) -> Self {
        self.redirect_on_success = Some(target.into());
        self
    }

    pub fn redirect_on_error(mut self, target: impl Into<String>) -> Self {
        self.redirect_on_error = Some(target.into());
        self
    }

    fn error_flash(&self, fallback: &str) -> Flash {
        Flash {
            level: FlashLevel::Error,
            message: self
                .error_message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// Validate `input` against the model's rules, then persist.
///
/// Validation failures come back as an `Invalid` outcome; a vetoing
/// pre-save hook or a persistence error as `Failed`. Post-save hook
/// errors are logged but do not change an already-persisted outcome.
pub fn save_with_feedback<M>(
    model: &mut M,
    input: &JsonMap,
    options: &SaveOptions,
    hooks: &EventHooks<M>,
) -> SaveOutcome
where
    M: Validates + Persist,
{
    let was_new = !model.exists();

    match model.validate_input(input) {
        Ok(()) => {}
        Err(ValidationFailure::Invalid(errors)) => {
            return SaveOutcome {
                status: SaveStatus::Invalid,
                flash: Some(options.error_flash("The given data was invalid.")),
                redirect: options.redirect_on_error.clone(),
                payload: json!({ "errors": &errors }),
                errors: Some(errors),
            };
        }
        Err(ValidationFailure::Error(e)) => {
            return failed(options, e.to_string());
        }
    }

    let pre_save = if was_new {
        ModelEvent::Creating
    } else {
        ModelEvent::Updating
    };
    if let Err(e) = hooks
        .dispatch(ModelEvent::Saving, model)
        .and_then(|_| hooks.dispatch(pre_save, model))
    {
        return failed(options, e.to_string());
    }

    if let Err(e) = model.save() {
        return failed(options, e.to_string());
    }

    let post_save = if was_new {
        ModelEvent::Created
    } else {
        ModelEvent::Updated
    };
    if let Err(e) = hooks
        .dispatch(post_save, model)
        .and_then(|_| hooks.dispatch(ModelEvent::Saved, model))
    {
        warn!("Post-save hook failed after persist: {}", e);
    }

    let (status, default_message) = if was_new {
        (SaveStatus::Created, "The record has been created.")
    } else {
        (SaveStatus::Updated, "The record has been updated.")
    };

    let attributes: serde_json::Map<String, JsonValue> = model
        .attributes()
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();

    SaveOutcome {
        status,
        errors: None,
        flash: Some(Flash {
            level: FlashLevel::Success,
            message: options
                .success_message
                .clone()
                .unwrap_or_else(|| default_message.to_string()),
        }),
        redirect: options.redirect_on_success.clone(),
        payload: JsonValue::Object(attributes),
    }
}

fn failed(options: &SaveOptions, reason: String) -> SaveOutcome {
    SaveOutcome {
        status: SaveStatus::Failed,
        errors: None,
        flash: Some(options.error_flash(&reason)),
        redirect: options.redirect_on_error.clone(),
        payload: json!({ "error": reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FromValue, ModelError, Result, Value};
    use crate::model::Model;
    use crate::validate::{AttributeRules, RuleSpec};
    use serde_json::json;

    #[derive(Default)]
    struct Note {
        id: Option<i64>,
        title: String,
        saves: usize,
        fail_save: bool,
    }

    impl Model for Note {
        fn table() -> &'static str {
            "notes"
        }

        fn attribute_names() -> &'static [&'static str] {
            &["id", "title"]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::from(self.id)),
                "title" => Some(Value::from(self.title.clone())),
                _ => None,
            }
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<()> {
            match name {
                "id" => self.id = FromValue::from_value(value)?,
                "title" => self.title = FromValue::from_value(value)?,
                other => return Err(ModelError::UnknownAttribute(other.to_string())),
            }
            Ok(())
        }
    }

    impl Validates for Note {
        fn attribute_rules() -> AttributeRules {
            AttributeRules::new().with(
                "title",
                RuleSpec::new()
                    .on_create("required")
                    .on_update("sometimes")
                    .typed("string|max:20"),
            )
        }
    }

    impl Persist for Note {
        fn save(&mut self) -> Result<()> {
            if self.fail_save {
                return Err(ModelError::Persistence("disk full".into()));
            }
            self.saves += 1;
            if self.id.is_none() {
                self.id = Some(1);
            }
            Ok(())
        }
    }

    fn payload(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_created_outcome() {
        let mut note = Note::default();
        let options = SaveOptions::new()
            .success_message("Saved!")
            .redirect_on_success("/notes");

        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({"title": "groceries"})),
            &options,
            &EventHooks::new(),
        );

        assert_eq!(outcome.status, SaveStatus::Created);
        assert!(outcome.succeeded());
        assert_eq!(outcome.redirect.as_deref(), Some("/notes"));
        assert_eq!(outcome.flash.as_ref().unwrap().message, "Saved!");
        assert_eq!(outcome.payload["title"], json!("groceries"));
        assert_eq!(note.saves, 1);
    }

    #[test]
    fn test_updated_outcome() {
        let mut note = Note {
            id: Some(5),
            title: "old".into(),
            ..Note::default()
        };
        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({"title": "new"})),
            &SaveOptions::new(),
            &EventHooks::new(),
        );
        assert_eq!(outcome.status, SaveStatus::Updated);
        assert_eq!(note.title, "new");
    }

    #[test]
    fn test_invalid_outcome_does_not_save() {
        let mut note = Note::default();
        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({})),
            &SaveOptions::new().redirect_on_error("/notes/new"),
            &EventHooks::new(),
        );

        assert_eq!(outcome.status, SaveStatus::Invalid);
        assert!(!outcome.succeeded());
        assert!(outcome.errors.is_some());
        assert_eq!(outcome.redirect.as_deref(), Some("/notes/new"));
        assert_eq!(note.saves, 0);
    }

    #[test]
    fn test_vetoing_hook_fails_before_save() {
        let hooks = EventHooks::new().on(ModelEvent::Creating, |_: &mut Note| {
            Err(ModelError::UnsupportedOperation("quota exceeded".into()))
        });

        let mut note = Note::default();
        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({"title": "x"})),
            &SaveOptions::new(),
            &hooks,
        );

        assert_eq!(outcome.status, SaveStatus::Failed);
        assert_eq!(note.saves, 0);
    }

    #[test]
    fn test_persistence_error_is_failed() {
        let mut note = Note {
            fail_save: true,
            ..Note::default()
        };
        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({"title": "x"})),
            &SaveOptions::new(),
            &EventHooks::new(),
        );

        assert_eq!(outcome.status, SaveStatus::Failed);
        assert!(outcome.flash.unwrap().message.contains("disk full"));
    }

    #[test]
    fn test_outcome_serializes() {
        let mut note = Note::default();
        let outcome = save_with_feedback(
            &mut note,
            &payload(json!({"title": "groceries"})),
            &SaveOptions::new(),
            &EventHooks::new(),
        );

        let rendered = serde_json::to_value(&outcome).unwrap();
        assert_eq!(rendered["status"], json!("created"));
        assert_eq!(rendered["flash"]["level"], json!("success"));
    }
}
