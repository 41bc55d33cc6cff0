//! Field definition service - manages the administrator-defined form fields.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{FieldDescriptor, FieldDraft, FieldOp};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Field definition service trait for dependency injection.
#[async_trait]
pub trait FieldService: Send + Sync {
    /// All descriptors ordered by (order, id)
    async fn list(&self) -> AppResult<Vec<FieldDescriptor>>;

    async fn get(&self, id: i64) -> AppResult<FieldDescriptor>;

    /// Create at the draft's order without touching neighbours
    async fn create(&self, draft: FieldDraft) -> AppResult<FieldDescriptor>;

    async fn update(&self, id: i64, draft: FieldDraft) -> AppResult<FieldDescriptor>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Insert at the draft's order, shifting every descriptor at or past it
    /// up by one. Atomic: shift and insert are one transaction.
    async fn insert_at(&self, draft: FieldDraft) -> AppResult<FieldDescriptor>;

    /// Move an existing descriptor to `target_order`, shifting the
    /// descriptors at or past it up by one. Unknown ids are a silent
    /// success acknowledgment.
    async fn move_to(&self, id: i64, target_order: i32) -> AppResult<()>;

    /// Apply a bulk form-configuration update, ops in input order, in a
    /// single transaction. Any failure rolls back the whole batch.
    async fn bulk_apply(&self, ops: Vec<FieldOp>) -> AppResult<()>;
}

/// Concrete implementation of FieldService using Unit of Work.
pub struct FieldManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> FieldManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> FieldService for FieldManager<U> {
    async fn list(&self) -> AppResult<Vec<FieldDescriptor>> {
        self.uow.fields().list().await
    }

    async fn get(&self, id: i64) -> AppResult<FieldDescriptor> {
        self.uow.fields().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create(&self, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        self.uow.fields().create(draft).await
    }

    async fn update(&self, id: i64, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        self.uow.fields().update(id, draft).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.uow.fields().delete(id).await
    }

    async fn insert_at(&self, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        self.uow
            .transaction(|ctx| {
                Box::pin(async move {
                    ctx.fields().shift_orders_from(draft.order).await?;
                    ctx.fields().create(draft).await
                })
            })
            .await
    }

    async fn move_to(&self, id: i64, target_order: i32) -> AppResult<()> {
        // Unknown ids are acknowledged without touching the ordering
        if self.uow.fields().find_by_id(id).await?.is_none() {
            return Ok(());
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.fields().shift_orders_from(target_order).await?;
                    ctx.fields().set_order(id, target_order).await
                })
            })
            .await
    }

    async fn bulk_apply(&self, ops: Vec<FieldOp>) -> AppResult<()> {
        self.uow
            .transaction(|ctx| {
                Box::pin(async move {
                    for op in ops {
                        match op {
                            FieldOp::Delete { id } => {
                                // Deleting an already-deleted row is fine
                                ctx.fields().delete(id).await?;
                            }
                            FieldOp::Update { id, draft } => {
                                ctx.fields().update(id, draft).await?;
                            }
                            FieldOp::Create(draft) => {
                                ctx.fields().create(draft).await?;
                            }
                        }
                    }
                    Ok(())
                })
            })
            .await
    }
}
