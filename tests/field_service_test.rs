//! Field definition service unit tests.
//!
//! Non-transactional paths are exercised against mock repositories. The
//! transactional reorder paths go through `UnitOfWork::transaction`, which
//! the test double cannot open; those assert orchestration order instead
//! (see the sentinel pattern in employee_service_test.rs).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;

use staffdesk::domain::{FieldDescriptor, FieldDraft, FieldType};
use staffdesk::errors::{AppError, AppResult};
use staffdesk::infra::{
    EmployeeRepository, FieldRepository, MockEmployeeRepository, MockFieldRepository,
    MockUserRepository, TransactionContext, UnitOfWork, UserRepository,
};
use staffdesk::services::{FieldManager, FieldService};

fn descriptor(id: i64, label: &str, order: i32) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label: label.to_string(),
        field_type: FieldType::Text,
        is_required: false,
        order,
        options: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Test double wrapping mock repositories; transactions are unsupported and
/// fail with a recognizable sentinel error.
struct TestUnitOfWork {
    fields: Arc<MockFieldRepository>,
    users: Arc<MockUserRepository>,
    employees: Arc<MockEmployeeRepository>,
}

impl TestUnitOfWork {
    fn with_fields(fields: MockFieldRepository) -> Self {
        Self {
            fields: Arc::new(fields),
            users: Arc::new(MockUserRepository::new()),
            employees: Arc::new(MockEmployeeRepository::new()),
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

#[tokio::test]
async fn list_returns_descriptors_in_form_order() {
    let mut repo = MockFieldRepository::new();
    repo.expect_list().returning(|| {
        Ok(vec![
            descriptor(2, "Department", 1),
            descriptor(1, "Gender", 2),
        ])
    });

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    let fields = service.list().await.unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].label, "Department");
    assert_eq!(fields[1].label, "Gender");
}

#[tokio::test]
async fn get_unknown_descriptor_is_not_found() {
    let mut repo = MockFieldRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    let result = service.get(99).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn create_passes_draft_through() {
    let draft = FieldDraft {
        label: "Department".to_string(),
        field_type: FieldType::Text,
        is_required: true,
        order: 1,
        options: vec![],
    };

    let mut repo = MockFieldRepository::new();
    repo.expect_create()
        .with(eq(draft.clone()))
        .returning(|d| {
            Ok(FieldDescriptor {
                id: 1,
                label: d.label,
                field_type: d.field_type,
                is_required: d.is_required,
                order: d.order,
                options: d.options,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    let created = service.create(draft).await.unwrap();

    assert_eq!(created.label, "Department");
    assert!(created.is_required);
}

#[tokio::test]
async fn delete_missing_descriptor_surfaces_not_found() {
    let mut repo = MockFieldRepository::new();
    repo.expect_delete()
        .with(eq(42i64))
        .returning(|_| Err(AppError::NotFound));

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    assert!(matches!(
        service.delete(42).await.unwrap_err(),
        AppError::NotFound
    ));
}

#[tokio::test]
async fn move_to_unknown_id_is_a_silent_success() {
    // The original behavior: reordering a field that does not exist
    // acknowledges without touching anything.
    let mut repo = MockFieldRepository::new();
    repo.expect_find_by_id().with(eq(7i64)).returning(|_| Ok(None));

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    assert!(service.move_to(7, 3).await.is_ok());
}

#[tokio::test]
async fn move_to_known_id_enters_a_transaction() {
    // With an existing descriptor the shift-and-move must run atomically;
    // the test double rejects the transaction with a sentinel, proving the
    // service got that far.
    let mut repo = MockFieldRepository::new();
    repo.expect_find_by_id()
        .with(eq(7i64))
        .returning(|id| Ok(Some(descriptor(id, "Department", 5))));

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(repo)));
    let err = service.move_to(7, 3).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn insert_at_is_transactional() {
    let draft = FieldDraft {
        label: "Gender".to_string(),
        field_type: FieldType::Select,
        is_required: true,
        order: 2,
        options: vec!["Male".to_string(), "Female".to_string()],
    };

    let service = FieldManager::new(Arc::new(TestUnitOfWork::with_fields(
        MockFieldRepository::new(),
    )));
    let err = service.insert_at(draft).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
}
