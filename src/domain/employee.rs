//! Employee record entity and submission types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::user::{User, UserResponse};

/// One employee: a linked staff identity, a fixed employee code and the
/// open-ended attribute bag holding dynamic-field values.
///
/// Attribute keys are expected to match the currently defined descriptors'
/// derived keys, but that is a soft contract; stale keys from deleted
/// descriptors stay in the bag and are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub user: User,
    pub employee_code: String,
    pub attributes: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity part of an employee submission.
///
/// `username` is the natural key: re-submitting an existing username updates
/// that identity in place. Password is only set when supplied.
#[derive(Debug, Clone, Default)]
pub struct IdentityDraft {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
}

/// Wire representation used by the REST employees resource
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeResponse {
    pub id: i64,
    pub uid: UserResponse,
    pub employee_id: String,
    pub extra_data: Map<String, Value>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<EmployeeRecord> for EmployeeResponse {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            uid: UserResponse::from(record.user),
            employee_id: record.employee_code,
            extra_data: record.attributes,
            created_on: record.created_at,
            updated_on: record.updated_at,
        }
    }
}

/// REST create response: identity and dynamic values reported separately
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeCreatedResponse {
    pub id: i64,
    pub employee_id: String,
    pub dynamic_fields: Map<String, Value>,
    pub user: UserResponse,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<EmployeeRecord> for EmployeeCreatedResponse {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_code,
            dynamic_fields: record.attributes,
            user: UserResponse::from(record.user),
            created_on: record.created_at,
            updated_on: record.updated_at,
        }
    }
}
