//! Employee record service unit tests.
//!
//! The writing paths run inside `UnitOfWork::transaction`; the test double
//! rejects transactions with a sentinel internal error. A submission that
//! fails validation must therefore come back as `FieldErrors` without ever
//! hitting the sentinel - storage is untouched - while a valid submission
//! surfaces the sentinel, proving validation passed and the write began.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};

use staffdesk::domain::{EmployeeRecord, FieldDescriptor, FieldType, IdentityDraft, User};
use staffdesk::errors::{AppError, AppResult};
use staffdesk::infra::{
    EmployeeRepository, FieldRepository, MockEmployeeRepository, MockFieldRepository,
    MockUserRepository, TransactionContext, UnitOfWork, UserRepository,
};
use staffdesk::services::{EmployeeManager, EmployeeService};

fn text_field(id: i64, label: &str, required: bool) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label: label.to_string(),
        field_type: FieldType::Text,
        is_required: required,
        order: id as i32,
        options: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn select_field(id: i64, label: &str, options: &[&str]) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label: label.to_string(),
        field_type: FieldType::Select,
        is_required: true,
        order: id as i32,
        options: options.iter().map(|s| s.to_string()).collect(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn record(id: i64) -> EmployeeRecord {
    let now = Utc::now();
    EmployeeRecord {
        id,
        user: User {
            id,
            username: format!("user{}", id),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hashed".to_string(),
            is_staff: false,
            created_at: now,
            updated_at: now,
        },
        employee_code: format!("E{:03}", id),
        attributes: Map::new(),
        created_at: now,
        updated_at: now,
    }
}

fn identity(username: &str) -> IdentityDraft {
    IdentityDraft {
        username: username.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john@example.com".to_string(),
        password: Some("Str0ng@123".to_string()),
    }
}

struct TestUnitOfWork {
    fields: Arc<MockFieldRepository>,
    users: Arc<MockUserRepository>,
    employees: Arc<MockEmployeeRepository>,
}

impl TestUnitOfWork {
    fn new(fields: MockFieldRepository, employees: MockEmployeeRepository) -> Self {
        Self {
            fields: Arc::new(fields),
            users: Arc::new(MockUserRepository::new()),
            employees: Arc::new(employees),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn fields(&self) -> Arc<dyn FieldRepository> {
        self.fields.clone()
    }

    fn employees(&self) -> Arc<dyn EmployeeRepository> {
        self.employees.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("transaction attempted"))
    }
}

fn service_with(
    fields: MockFieldRepository,
    employees: MockEmployeeRepository,
) -> EmployeeManager<TestUnitOfWork> {
    EmployeeManager::new(Arc::new(TestUnitOfWork::new(fields, employees)))
}

fn no_fields() -> MockFieldRepository {
    let mut fields = MockFieldRepository::new();
    fields.expect_list().returning(|| Ok(vec![]));
    fields
}

// =============================================================================
// create_or_update: validate-then-write ordering
// =============================================================================

#[tokio::test]
async fn submission_with_choice_outside_options_writes_nothing() {
    let mut fields = MockFieldRepository::new();
    fields
        .expect_list()
        .returning(|| Ok(vec![select_field(1, "Gender", &["Male", "Female"])]));

    let service = service_with(fields, MockEmployeeRepository::new());

    let mut dynamic = Map::new();
    dynamic.insert("gender".to_string(), json!("Other"));

    let err = service
        .create_or_update(None, identity("john"), "E001".to_string(), dynamic)
        .await
        .unwrap_err();

    // A per-field report, not the transaction sentinel: storage untouched
    match err {
        AppError::FieldErrors(report) => {
            assert!(!report.messages_for("gender").is_empty());
        }
        other => panic!("expected FieldErrors, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_required_dynamic_field_is_reported_by_key() {
    let mut fields = MockFieldRepository::new();
    fields
        .expect_list()
        .returning(|| Ok(vec![text_field(1, "Department", true)]));

    let service = service_with(fields, MockEmployeeRepository::new());

    let err = service
        .create_or_update(None, identity("john"), "E001".to_string(), Map::new())
        .await
        .unwrap_err();

    match err {
        AppError::FieldErrors(report) => {
            assert_eq!(
                report.messages_for("department"),
                ["This field is required."]
            );
        }
        other => panic!("expected FieldErrors, got {:?}", other),
    }
}

#[tokio::test]
async fn valid_submission_reaches_the_transaction() {
    let mut fields = MockFieldRepository::new();
    fields
        .expect_list()
        .returning(|| Ok(vec![text_field(1, "Department", true)]));

    let service = service_with(fields, MockEmployeeRepository::new());

    let mut dynamic = Map::new();
    dynamic.insert("department".to_string(), json!("IT"));

    let err = service
        .create_or_update(None, identity("john"), "E001".to_string(), dynamic)
        .await
        .unwrap_err();

    // The sentinel proves validation passed and the atomic write began
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn with_no_dynamic_fields_identity_and_code_suffice() {
    let service = service_with(no_fields(), MockEmployeeRepository::new());

    let err = service
        .create_or_update(None, identity("john"), "E001".to_string(), Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn create_requires_password_but_edit_does_not() {
    let service = service_with(no_fields(), MockEmployeeRepository::new());
    let mut draft = identity("john");
    draft.password = None;

    let err = service
        .create_or_update(None, draft.clone(), "E001".to_string(), Map::new())
        .await
        .unwrap_err();
    match err {
        AppError::FieldErrors(report) => {
            assert!(!report.messages_for("password").is_empty());
        }
        other => panic!("expected FieldErrors, got {:?}", other),
    }

    // Editing (pk given) accepts a password-less submission
    let service = service_with(no_fields(), MockEmployeeRepository::new());
    let err = service
        .create_or_update(Some(5), draft, "E001".to_string(), Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn identity_and_dynamic_errors_are_reported_together() {
    let mut fields = MockFieldRepository::new();
    fields
        .expect_list()
        .returning(|| Ok(vec![text_field(1, "Department", true)]));

    let service = service_with(fields, MockEmployeeRepository::new());

    let draft = IdentityDraft {
        username: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        email: "not-an-email".to_string(),
        password: Some("Str0ng@123".to_string()),
    };

    let err = service
        .create_or_update(None, draft, String::new(), Map::new())
        .await
        .unwrap_err();

    match err {
        AppError::FieldErrors(report) => {
            for field in ["username", "first_name", "email", "employee_id", "department"] {
                assert!(
                    !report.messages_for(field).is_empty(),
                    "missing error for {}",
                    field
                );
            }
        }
        other => panic!("expected FieldErrors, got {:?}", other),
    }
}

// =============================================================================
// REST create
// =============================================================================

#[tokio::test]
async fn api_create_rejects_duplicate_username() {
    let mut fields = MockFieldRepository::new();
    fields.expect_list().returning(|| Ok(vec![]));

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .returning(|_| Ok(Some(record(1).user)));

    let uow = TestUnitOfWork {
        fields: Arc::new(fields),
        users: Arc::new(users),
        employees: Arc::new(MockEmployeeRepository::new()),
    };
    let service = EmployeeManager::new(Arc::new(uow));

    let payload: Map<String, Value> = [
        ("username", json!("john")),
        ("first_name", json!("John")),
        ("last_name", json!("Doe")),
        ("email", json!("john@example.com")),
        ("password", json!("Str0ng@123")),
        ("employee_id", json!("E001")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let err = service.create_from_api(payload).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn api_create_requires_all_identity_fields() {
    let service = service_with(no_fields(), MockEmployeeRepository::new());

    let payload: Map<String, Value> = [("username", json!("john"))]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let err = service.create_from_api(payload).await.unwrap_err();
    match err {
        AppError::FieldErrors(report) => {
            for field in ["first_name", "last_name", "email", "password", "employee_id"] {
                assert!(
                    !report.messages_for(field).is_empty(),
                    "missing error for {}",
                    field
                );
            }
        }
        other => panic!("expected FieldErrors, got {:?}", other),
    }
}

// =============================================================================
// Listing and pagination
// =============================================================================

#[tokio::test]
async fn list_fixes_page_size_at_three_and_reports_metadata() {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_list_page()
        .withf(|filters, page, per_page| filters.is_empty() && *page == 1 && *per_page == 3)
        .returning(|_, _, _| Ok((vec![record(7), record(6), record(5)], 7)));

    let service = service_with(MockFieldRepository::new(), employees);
    let page = service.list(BTreeMap::new(), 1).await.unwrap();

    assert_eq!(page.data.len(), 3);
    assert_eq!(page.meta.total, 7);
    assert_eq!(page.meta.total_pages, 3);
    assert!(page.meta.has_next);
    assert!(!page.meta.has_previous);
    // Newest first
    assert_eq!(page.data[0].id, 7);
}

#[tokio::test]
async fn list_last_partial_page_and_past_the_end() {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_list_page()
        .withf(|_, page, _| *page == 3)
        .returning(|_, _, _| Ok((vec![record(1)], 7)));
    employees
        .expect_list_page()
        .withf(|_, page, _| *page == 4)
        .returning(|_, _, _| Ok((vec![], 7)));

    let service = service_with(MockFieldRepository::new(), employees);

    let page3 = service.list(BTreeMap::new(), 3).await.unwrap();
    assert_eq!(page3.data.len(), 1);
    assert!(!page3.meta.has_next);

    let page4 = service.list(BTreeMap::new(), 4).await.unwrap();
    assert!(page4.data.is_empty());
}

#[tokio::test]
async fn list_passes_filters_through_verbatim() {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_list_page()
        .withf(|filters, _, _| filters.get("department").map(String::as_str) == Some("IT"))
        .returning(|_, _, _| Ok((vec![], 0)));

    let service = service_with(MockFieldRepository::new(), employees);
    let filters: BTreeMap<String, String> =
        [("department".to_string(), "IT".to_string())].into();

    let page = service.list(filters, 1).await.unwrap();
    assert_eq!(page.meta.total, 0);
}

// =============================================================================
// Lookup and delete
// =============================================================================

#[tokio::test]
async fn get_unknown_record_is_not_found() {
    let mut employees = MockEmployeeRepository::new();
    employees.expect_find_by_id().returning(|_| Ok(None));

    let service = service_with(MockFieldRepository::new(), employees);
    assert!(matches!(
        service.get(1).await.unwrap_err(),
        AppError::NotFound
    ));
}

#[tokio::test]
async fn delete_removes_identity_and_is_idempotent() {
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_delete_with_identity()
        .returning(|_| Ok(true));

    let service = service_with(MockFieldRepository::new(), employees);
    assert!(service.delete(1).await.is_ok());

    // Second delete: the record is gone, still a success
    let mut employees = MockEmployeeRepository::new();
    employees
        .expect_delete_with_identity()
        .returning(|_| Ok(false));

    let service = service_with(MockFieldRepository::new(), employees);
    assert!(service.delete(1).await.is_ok());
}
