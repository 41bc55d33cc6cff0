//! Employee record service.
//!
//! Orchestrates employee creation and update: validate the submission
//! against the freshly compiled dynamic schema first, then write identity
//! and record together in one transaction. A failed validation never
//! touches storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::{
    is_identity_field, EMPLOYEE_PAGE_SIZE, MAX_EMPLOYEE_CODE_LENGTH, MAX_USERNAME_LENGTH,
    MIN_PASSWORD_LENGTH,
};
use crate::domain::{
    EmployeeRecord, FormSchema, IdentityDraft, Password, ValidationReport,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{EmployeeChanges, UnitOfWork};
use crate::types::Paginated;

/// Employee record service trait for dependency injection.
#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Form submission path: upsert identity by username, then the record.
    ///
    /// `pk` distinguishes edit from create; on create a password is
    /// required. Returns the record id.
    async fn create_or_update(
        &self,
        pk: Option<i64>,
        identity: IdentityDraft,
        employee_code: String,
        dynamic: Map<String, Value>,
    ) -> AppResult<i64>;

    /// REST create path: flat payload mixing identity fields, the employee
    /// code and dynamic keys. Fails on duplicate username.
    async fn create_from_api(&self, payload: Map<String, Value>) -> AppResult<EmployeeRecord>;

    /// REST update/patch: identity reference by id, code and raw attributes
    async fn update_record(&self, id: i64, changes: EmployeeChanges) -> AppResult<EmployeeRecord>;

    async fn get(&self, id: i64) -> AppResult<EmployeeRecord>;

    /// Page of records, newest first, exact-match filtered on attribute keys
    async fn list(
        &self,
        filters: BTreeMap<String, String>,
        page: u64,
    ) -> AppResult<Paginated<EmployeeRecord>>;

    /// Delete the record's identity (the record follows via cascade).
    /// Unknown ids are treated as already deleted.
    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of EmployeeService using Unit of Work.
pub struct EmployeeManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EmployeeManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Identity-field checks shared by both submission paths
    fn check_identity(
        report: &mut ValidationReport,
        identity: &IdentityDraft,
        employee_code: &str,
        password_required: bool,
    ) {
        if identity.username.trim().is_empty() {
            report.add("username", "This field is required.");
        } else if identity.username.len() > MAX_USERNAME_LENGTH {
            report.add("username", "Username is too long.");
        }
        if identity.first_name.trim().is_empty() {
            report.add("first_name", "This field is required.");
        }
        if identity.email.trim().is_empty() {
            report.add("email", "This field is required.");
        } else if !identity.email.contains('@') {
            report.add("email", "Enter a valid email address.");
        }
        if employee_code.trim().is_empty() {
            report.add("employee_id", "This field is required.");
        } else if employee_code.len() > MAX_EMPLOYEE_CODE_LENGTH {
            report.add("employee_id", "Employee id is too long.");
        }

        match &identity.password {
            Some(password) if password.len() < MIN_PASSWORD_LENGTH => {
                report.add(
                    "password",
                    format!("Password must be at least {} characters.", MIN_PASSWORD_LENGTH),
                );
            }
            None if password_required => {
                report.add("password", "This field is required.");
            }
            _ => {}
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> EmployeeService for EmployeeManager<U> {
    async fn create_or_update(
        &self,
        pk: Option<i64>,
        identity: IdentityDraft,
        employee_code: String,
        dynamic: Map<String, Value>,
    ) -> AppResult<i64> {
        // Validate everything before any write
        let descriptors = self.uow.fields().list().await?;
        let schema = FormSchema::compile(&descriptors);

        let mut report = ValidationReport::new();
        Self::check_identity(&mut report, &identity, &employee_code, pk.is_none());

        let validated = match schema.validate(&dynamic) {
            Ok(values) => values,
            Err(dynamic_report) => {
                report.merge(dynamic_report);
                BTreeMap::new()
            }
        };
        if !report.is_empty() {
            return Err(AppError::FieldErrors(report));
        }

        let password_hash = match &identity.password {
            Some(password) => Some(Password::new(password)?.into_string()),
            None => None,
        };

        // Validated values plus raw passthrough for keys no descriptor
        // declares; stale keys stay inert in the bag.
        let mut attributes = Map::new();
        for (key, value) in &dynamic {
            if !schema.declares(key) {
                attributes.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in validated {
            attributes.insert(key, Value::from(value));
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().upsert_identity(&identity, password_hash).await?;
                    ctx.employees()
                        .upsert_for_user(user.id, employee_code, attributes)
                        .await
                })
            })
            .await
    }

    async fn create_from_api(&self, payload: Map<String, Value>) -> AppResult<EmployeeRecord> {
        let text = |key: &str| -> Option<String> {
            payload.get(key).and_then(Value::as_str).map(str::to_string)
        };

        let identity = IdentityDraft {
            username: text("username").unwrap_or_default(),
            first_name: text("first_name").unwrap_or_default(),
            last_name: text("last_name").unwrap_or_default(),
            email: text("email").unwrap_or_default(),
            password: text("password"),
        };
        let employee_code = text("employee_id").unwrap_or_default();

        let descriptors = self.uow.fields().list().await?;
        let schema = FormSchema::compile(&descriptors);

        let mut report = ValidationReport::new();
        Self::check_identity(&mut report, &identity, &employee_code, true);
        if identity.last_name.trim().is_empty() {
            report.add("last_name", "This field is required.");
        }

        let dynamic: Map<String, Value> = payload
            .into_iter()
            .filter(|(key, _)| !is_identity_field(key))
            .collect();

        let validated = match schema.validate(&dynamic) {
            Ok(values) => values,
            Err(dynamic_report) => {
                report.merge(dynamic_report);
                BTreeMap::new()
            }
        };
        if !report.is_empty() {
            return Err(AppError::FieldErrors(report));
        }

        if self
            .uow
            .users()
            .find_by_username(&identity.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }

        let password_hash = match &identity.password {
            Some(password) => Password::new(password)?.into_string(),
            // check_identity already required the password
            None => return Err(AppError::field_error("password", "This field is required.")),
        };

        // The REST path stores declared fields only
        let attributes: Map<String, Value> = validated
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect();

        let record_id = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().create(&identity, password_hash).await?;
                    ctx.employees()
                        .upsert_for_user(user.id, employee_code, attributes)
                        .await
                })
            })
            .await?;

        self.uow
            .employees()
            .find_by_id(record_id)
            .await?
            .ok_or_else(|| AppError::internal("Created record not found"))
    }

    async fn update_record(&self, id: i64, changes: EmployeeChanges) -> AppResult<EmployeeRecord> {
        self.uow.employees().apply_changes(id, changes).await
    }

    async fn get(&self, id: i64) -> AppResult<EmployeeRecord> {
        self.uow.employees().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list(
        &self,
        filters: BTreeMap<String, String>,
        page: u64,
    ) -> AppResult<Paginated<EmployeeRecord>> {
        let page = page.max(1);
        let (records, total) = self
            .uow
            .employees()
            .list_page(filters, page, EMPLOYEE_PAGE_SIZE)
            .await?;

        Ok(Paginated::new(records, page, EMPLOYEE_PAGE_SIZE, total))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        // Idempotent: a missing record means it is already gone
        let existed = self.uow.employees().delete_with_identity(id).await?;
        if !existed {
            tracing::debug!(employee = id, "Delete of unknown employee acknowledged");
        }
        Ok(())
    }
}
