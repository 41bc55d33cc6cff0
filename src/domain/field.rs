//! Dynamic form field descriptors.
//!
//! A descriptor is one administrator-defined data-entry field: label, input
//! type, required flag and position in the form. Select and radio fields
//! carry their choices in `options`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Input types an administrator can pick for a dynamic field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Select,
    Text,
    Number,
    Checkbox,
    Radio,
    Date,
    Email,
    Password,
}

impl FieldType {
    /// Whether this type carries a list of choices
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Select => "select",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Password => "password",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(FieldType::Select),
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "checkbox" => Ok(FieldType::Checkbox),
            "radio" => Ok(FieldType::Radio),
            "date" => Ok(FieldType::Date),
            "email" => Ok(FieldType::Email),
            "password" => Ok(FieldType::Password),
            other => Err(AppError::validation(format!(
                "Unknown field type: {}",
                other
            ))),
        }
    }
}

/// Derive the attribute-bag key for a field label.
///
/// "Blood Group" becomes "blood_group". Employee attributes and list filters
/// are keyed by this value.
pub fn field_key(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// An administrator-defined form field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: i64,
    pub label: String,
    pub field_type: FieldType,
    pub is_required: bool,
    /// Position in the form; a strict total order with ties broken by id
    pub order: i32,
    /// Choices for select/radio fields, empty otherwise
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FieldDescriptor {
    /// Attribute-bag key derived from the label
    pub fn key(&self) -> String {
        field_key(&self.label)
    }

    /// Options comma-joined for storage and for the config screen
    pub fn options_joined(&self) -> String {
        self.options.join(",")
    }
}

/// Split a stored comma-joined options string back into choices
pub fn split_options(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Data for creating or overwriting a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    pub label: String,
    pub field_type: FieldType,
    pub is_required: bool,
    pub order: i32,
    pub options: Vec<String>,
}

/// One operation in a bulk form-configuration update, applied in input order
#[derive(Debug, Clone)]
pub enum FieldOp {
    Create(FieldDraft),
    Update { id: i64, draft: FieldDraft },
    Delete { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn field_key_lowercases_and_underscores() {
        assert_eq!(field_key("Department"), "department");
        assert_eq!(field_key("Blood Group"), "blood_group");
        assert_eq!(field_key("date of birth"), "date_of_birth");
    }

    #[test]
    fn field_type_round_trips_through_str() {
        for t in [
            FieldType::Select,
            FieldType::Text,
            FieldType::Number,
            FieldType::Checkbox,
            FieldType::Radio,
            FieldType::Date,
            FieldType::Email,
            FieldType::Password,
        ] {
            assert_eq!(FieldType::from_str(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        assert!(FieldType::from_str("dropdown").is_err());
    }

    #[test]
    fn split_options_trims_and_drops_empties() {
        assert_eq!(split_options("Male, Female"), vec!["Male", "Female"]);
        assert_eq!(split_options(""), Vec::<String>::new());
        assert_eq!(split_options("A,,B,"), vec!["A", "B"]);
    }
}
