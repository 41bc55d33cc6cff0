//! Field descriptor repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::entities::form_field::{self, Entity as FormFieldEntity};
use crate::domain::{FieldDescriptor, FieldDraft};
use crate::errors::{AppError, AppResult};

/// Read and single-row write operations over field descriptors.
///
/// Order-shifting writes are transactional and live on the unit of work's
/// transaction-scoped repository.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait FieldRepository: Send + Sync {
    /// All descriptors ordered by (field_order, id)
    async fn list(&self) -> AppResult<Vec<FieldDescriptor>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<FieldDescriptor>>;

    /// Create at the draft's order without shifting neighbours
    async fn create(&self, draft: FieldDraft) -> AppResult<FieldDescriptor>;

    /// Overwrite an existing descriptor
    async fn update(&self, id: i64, draft: FieldDraft) -> AppResult<FieldDescriptor>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

fn active_from_draft(draft: FieldDraft) -> form_field::ActiveModel {
    form_field::ActiveModel {
        label: Set(draft.label),
        field_type: Set(draft.field_type.to_string()),
        is_required: Set(draft.is_required),
        field_order: Set(draft.order),
        options: Set(draft.options.join(",")),
        ..Default::default()
    }
}

/// SeaORM-backed field descriptor repository
pub struct FieldStore {
    db: DatabaseConnection,
}

impl FieldStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FieldRepository for FieldStore {
    async fn list(&self) -> AppResult<Vec<FieldDescriptor>> {
        let models = FormFieldEntity::find()
            .order_by_asc(form_field::Column::FieldOrder)
            .order_by_asc(form_field::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(FieldDescriptor::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<FieldDescriptor>> {
        let model = FormFieldEntity::find_by_id(id).one(&self.db).await?;
        model.map(FieldDescriptor::try_from).transpose()
    }

    async fn create(&self, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        let now = Utc::now();
        let mut active = active_from_draft(draft);
        active.created_at = Set(now);
        active.updated_at = Set(now);

        let model = active.insert(&self.db).await?;
        FieldDescriptor::try_from(model)
    }

    async fn update(&self, id: i64, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        let existing = FormFieldEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active = active_from_draft(draft);
        active.id = Set(existing.id);
        active.created_at = Set(existing.created_at);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        FieldDescriptor::try_from(model)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let result = FormFieldEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
