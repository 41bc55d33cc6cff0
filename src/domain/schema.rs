//! Dynamic schema compiler.
//!
//! Turns the current list of field descriptors into a validation schema: one
//! typed rule per descriptor, keyed by the label-derived attribute key. The
//! schema is compiled fresh on every request (descriptors may change between
//! requests) and is a pure function of the descriptor list.
//!
//! Validation either accepts the whole payload, producing a typed value per
//! submitted field, or rejects it with a per-field error report. There is no
//! partial acceptance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use super::field::{FieldDescriptor, FieldType};

/// Validation rule derived from a descriptor's field type
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    Text,
    Integer,
    Boolean,
    Date,
    /// Value must be one of the listed choices
    Choice(Vec<String>),
    Email,
    Password,
}

impl FieldRule {
    fn for_descriptor(descriptor: &FieldDescriptor) -> Self {
        match descriptor.field_type {
            FieldType::Text => FieldRule::Text,
            FieldType::Number => FieldRule::Integer,
            FieldType::Checkbox => FieldRule::Boolean,
            FieldType::Date => FieldRule::Date,
            FieldType::Select | FieldType::Radio => {
                FieldRule::Choice(descriptor.options.clone())
            }
            FieldType::Email => FieldRule::Email,
            FieldType::Password => FieldRule::Password,
        }
    }
}

/// One compiled field of the schema
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub rule: FieldRule,
}

/// A validated dynamic-field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    Choice(String),
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(s) | FieldValue::Choice(s) => Value::String(s),
            FieldValue::Integer(n) => Value::from(n),
            FieldValue::Boolean(b) => Value::Bool(b),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Per-field validation error report.
///
/// Serializes as a map from field key to the list of messages for that field,
/// which is the `errors` object of a 400 response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport(BTreeMap<String, Vec<String>>);

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        for (field, mut messages) in other.0 {
            self.0.entry(field).or_default().append(&mut messages);
        }
    }

    pub fn messages_for(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Compiled validation schema for the current descriptor list
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<CompiledField>,
}

impl FormSchema {
    /// Compile a schema from descriptors.
    ///
    /// Pure over its input; callers must pass the freshly loaded list so the
    /// schema reflects the latest configuration.
    pub fn compile(descriptors: &[FieldDescriptor]) -> Self {
        let fields = descriptors
            .iter()
            .map(|d| CompiledField {
                key: d.key(),
                label: d.label.clone(),
                required: d.is_required,
                rule: FieldRule::for_descriptor(d),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    /// Whether the schema declares a field for the given attribute key
    pub fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Validate a payload against the schema.
    ///
    /// Returns the typed value for every declared field that was submitted,
    /// or the full per-field error report. Keys the schema does not declare
    /// are ignored here; callers decide whether to carry them through.
    pub fn validate(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<BTreeMap<String, FieldValue>, ValidationReport> {
        let mut values = BTreeMap::new();
        let mut report = ValidationReport::new();

        for field in &self.fields {
            let raw = payload.get(&field.key);
            let absent = match raw {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                _ => false,
            };

            if absent {
                if field.required {
                    report.add(&field.key, "This field is required.");
                }
                continue;
            }

            // raw is Some and non-empty past this point
            match check_value(&field.rule, raw.unwrap()) {
                Ok(value) => {
                    values.insert(field.key.clone(), value);
                }
                Err(message) => report.add(&field.key, message),
            }
        }

        if report.is_empty() {
            Ok(values)
        } else {
            Err(report)
        }
    }
}

/// Check one raw value against a rule, coercing string forms where the value
/// arrived form-encoded rather than as typed JSON.
fn check_value(rule: &FieldRule, raw: &Value) -> Result<FieldValue, String> {
    match rule {
        FieldRule::Text | FieldRule::Password => match raw.as_str() {
            Some(s) => Ok(FieldValue::Text(s.to_string())),
            None => Err("Enter a valid string.".to_string()),
        },
        FieldRule::Integer => match raw {
            Value::Number(n) if n.is_i64() => Ok(FieldValue::Integer(n.as_i64().unwrap())),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| "Enter a whole number.".to_string()),
            _ => Err("Enter a whole number.".to_string()),
        },
        FieldRule::Boolean => match raw {
            Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Ok(FieldValue::Boolean(true)),
                "false" | "off" | "0" => Ok(FieldValue::Boolean(false)),
                _ => Err("Enter a valid boolean value.".to_string()),
            },
            _ => Err("Enter a valid boolean value.".to_string()),
        },
        FieldRule::Date => match raw.as_str() {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| "Enter a valid date in YYYY-MM-DD format.".to_string()),
            None => Err("Enter a valid date in YYYY-MM-DD format.".to_string()),
        },
        FieldRule::Choice(options) => match raw.as_str() {
            Some(s) if options.iter().any(|o| o == s) => {
                Ok(FieldValue::Choice(s.to_string()))
            }
            Some(s) => Err(format!("\"{}\" is not a valid choice.", s)),
            None => Err("Select a valid choice.".to_string()),
        },
        FieldRule::Email => match raw.as_str() {
            Some(s) if looks_like_email(s) => Ok(FieldValue::Text(s.to_string())),
            _ => Err("Enter a valid email address.".to_string()),
        },
    }
}

/// Minimal e-mail shape check: non-empty local part, one '@', dotted domain.
fn looks_like_email(value: &str) -> bool {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn descriptor(label: &str, field_type: FieldType, required: bool, options: &[&str]) -> FieldDescriptor {
        FieldDescriptor {
            id: 1,
            label: label.to_string(),
            field_type,
            is_required: required,
            order: 1,
            options: options.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_descriptor_list_accepts_anything() {
        let schema = FormSchema::compile(&[]);
        let values = schema.validate(&payload(&[("whatever", json!("x"))])).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn required_field_missing_is_reported_by_key() {
        let schema = FormSchema::compile(&[descriptor("Department", FieldType::Text, true, &[])]);
        let report = schema.validate(&payload(&[])).unwrap_err();
        assert_eq!(
            report.messages_for("department"),
            ["This field is required."]
        );
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let schema = FormSchema::compile(&[descriptor("Department", FieldType::Text, true, &[])]);
        let report = schema
            .validate(&payload(&[("department", json!(""))]))
            .unwrap_err();
        assert!(!report.is_empty());
    }

    #[test]
    fn optional_field_may_be_absent() {
        let schema = FormSchema::compile(&[descriptor("Notes", FieldType::Text, false, &[])]);
        let values = schema.validate(&payload(&[])).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn choice_outside_options_is_rejected() {
        let schema = FormSchema::compile(&[descriptor(
            "Gender",
            FieldType::Select,
            true,
            &["Male", "Female"],
        )]);

        let report = schema
            .validate(&payload(&[("gender", json!("Other"))]))
            .unwrap_err();
        assert_eq!(report.messages_for("gender").len(), 1);

        let values = schema
            .validate(&payload(&[("gender", json!("Male"))]))
            .unwrap();
        assert_eq!(values["gender"], FieldValue::Choice("Male".to_string()));
    }

    #[test]
    fn number_accepts_integer_and_numeric_string() {
        let schema = FormSchema::compile(&[descriptor("Age", FieldType::Number, true, &[])]);

        let values = schema.validate(&payload(&[("age", json!(34))])).unwrap();
        assert_eq!(values["age"], FieldValue::Integer(34));

        let values = schema.validate(&payload(&[("age", json!("34"))])).unwrap();
        assert_eq!(values["age"], FieldValue::Integer(34));

        let report = schema
            .validate(&payload(&[("age", json!("thirty"))]))
            .unwrap_err();
        assert!(!report.messages_for("age").is_empty());
    }

    #[test]
    fn checkbox_accepts_bool_and_form_strings() {
        let schema = FormSchema::compile(&[descriptor("Remote", FieldType::Checkbox, false, &[])]);

        for (raw, expected) in [
            (json!(true), true),
            (json!("on"), true),
            (json!("1"), true),
            (json!(false), false),
            (json!("off"), false),
        ] {
            let values = schema.validate(&payload(&[("remote", raw)])).unwrap();
            assert_eq!(values["remote"], FieldValue::Boolean(expected));
        }
    }

    #[test]
    fn date_requires_iso_format() {
        let schema = FormSchema::compile(&[descriptor("Joined", FieldType::Date, true, &[])]);

        let values = schema
            .validate(&payload(&[("joined", json!("2024-02-29"))]))
            .unwrap();
        assert_eq!(
            values["joined"],
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );

        assert!(schema
            .validate(&payload(&[("joined", json!("29/02/2024"))]))
            .is_err());
    }

    #[test]
    fn email_rule_checks_shape() {
        let schema = FormSchema::compile(&[descriptor("Work Email", FieldType::Email, true, &[])]);

        assert!(schema
            .validate(&payload(&[("work_email", json!("a@b.co"))]))
            .is_ok());
        assert!(schema
            .validate(&payload(&[("work_email", json!("not-an-email"))]))
            .is_err());
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let schema = FormSchema::compile(&[descriptor("Department", FieldType::Text, true, &[])]);
        let values = schema
            .validate(&payload(&[
                ("department", json!("IT")),
                ("legacy_field", json!("stale")),
            ]))
            .unwrap();
        assert_eq!(values.len(), 1);
        assert!(values.contains_key("department"));
    }

    #[test]
    fn all_failures_reported_at_once() {
        let schema = FormSchema::compile(&[
            descriptor("Department", FieldType::Text, true, &[]),
            descriptor("Age", FieldType::Number, true, &[]),
        ]);
        let report = schema
            .validate(&payload(&[("age", json!("abc"))]))
            .unwrap_err();
        assert!(!report.messages_for("department").is_empty());
        assert!(!report.messages_for("age").is_empty());
    }

    #[test]
    fn field_value_serializes_for_storage() {
        assert_eq!(Value::from(FieldValue::Integer(7)), json!(7));
        assert_eq!(Value::from(FieldValue::Boolean(true)), json!(true));
        assert_eq!(
            Value::from(FieldValue::Date(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
            )),
            json!("2024-01-02")
        );
    }
}
