//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and wraps the multi-row mutations that must
//! appear atomic: the reorder-then-write sequence on field descriptors and
//! the identity-then-record upsert on employee submissions. A failure partway
//! rolls the whole transaction back, leaving no partial write visible.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::repositories::entities::{employee, form_field, user};
use super::repositories::{
    EmployeeRepository, EmployeeStore, FieldRepository, FieldStore, UserRepository, UserStore,
};
use crate::domain::{FieldDescriptor, FieldDraft, IdentityDraft, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: the generic `transaction` method makes this trait unsuitable for
/// mockall; tests mock at the repository or service level instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn fields(&self) -> Arc<dyn FieldRepository>;

    fn employees(&self) -> Arc<dyn EmployeeRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access scoped to one open transaction
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn fields(&self) -> TxFieldRepository<'_> {
        TxFieldRepository { txn: self.txn }
    }

    pub fn employees(&self) -> TxEmployeeRepository<'_> {
        TxEmployeeRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    field_repo: Arc<FieldStore>,
    employee_repo: Arc<EmployeeStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let field_repo = Arc::new(FieldStore::new(db.clone()));
        let employee_repo = Arc::new(EmployeeStore::new(db.clone()));
        Self {
            db,
            user_repo,
            field_repo,
            employee_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn fields(&self) -> Arc<dyn FieldRepository> {
        self.field_repo.clone()
    }

    fn employees(&self) -> Arc<dyn EmployeeRepository> {
        self.employee_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.db.begin().await.map_err(AppError::from)?;
        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-scoped identity repository
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.txn)
            .await?;
        Ok(result.map(User::from))
    }

    /// Upsert an identity keyed by username.
    ///
    /// An existing username has its name and email overwritten; the password
    /// hash is only replaced when one is supplied. A new identity without a
    /// password gets an empty hash, which never verifies.
    pub async fn upsert_identity(
        &self,
        draft: &IdentityDraft,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        let now = Utc::now();
        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(draft.username.as_str()))
            .one(self.txn)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut active: user::ActiveModel = found.into();
                active.first_name = Set(draft.first_name.clone());
                active.last_name = Set(draft.last_name.clone());
                active.email = Set(draft.email.clone());
                if let Some(hash) = password_hash {
                    active.password_hash = Set(hash);
                }
                active.updated_at = Set(now);
                active.update(self.txn).await?
            }
            None => {
                user::ActiveModel {
                    username: Set(draft.username.clone()),
                    first_name: Set(draft.first_name.clone()),
                    last_name: Set(draft.last_name.clone()),
                    email: Set(draft.email.clone()),
                    password_hash: Set(password_hash.unwrap_or_default()),
                    is_staff: Set(false),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.txn)
                .await?
            }
        };

        Ok(User::from(model))
    }

    /// Insert a fresh identity; fails on duplicate username
    pub async fn create(
        &self,
        draft: &IdentityDraft,
        password_hash: String,
    ) -> AppResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            username: Set(draft.username.clone()),
            first_name: Set(draft.first_name.clone()),
            last_name: Set(draft.last_name.clone()),
            email: Set(draft.email.clone()),
            password_hash: Set(password_hash),
            is_staff: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        Ok(User::from(model))
    }
}

/// Transaction-scoped employee repository
pub struct TxEmployeeRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEmployeeRepository<'a> {
    /// Upsert the record owned by an identity, replacing its attribute bag.
    /// Returns the record id.
    pub async fn upsert_for_user(
        &self,
        user_id: i64,
        employee_code: String,
        attributes: Map<String, Value>,
    ) -> AppResult<i64> {
        let now = Utc::now();
        let existing = employee::Entity::find()
            .filter(employee::Column::UserId.eq(user_id))
            .one(self.txn)
            .await?;

        let model = match existing {
            Some(found) => {
                let mut active: employee::ActiveModel = found.into();
                active.employee_code = Set(employee_code);
                active.extra_data = Set(Value::Object(attributes));
                active.updated_at = Set(now);
                active.update(self.txn).await?
            }
            None => {
                employee::ActiveModel {
                    user_id: Set(user_id),
                    employee_code: Set(employee_code),
                    extra_data: Set(Value::Object(attributes)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.txn)
                .await?
            }
        };

        Ok(model.id)
    }
}

/// Transaction-scoped field descriptor repository
pub struct TxFieldRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxFieldRepository<'a> {
    /// Shift every descriptor at or past `target` up by one position
    pub async fn shift_orders_from(&self, target: i32) -> AppResult<u64> {
        let result = form_field::Entity::update_many()
            .col_expr(
                form_field::Column::FieldOrder,
                Expr::col(form_field::Column::FieldOrder).add(1),
            )
            .filter(form_field::Column::FieldOrder.gte(target))
            .exec(self.txn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create(&self, draft: FieldDraft) -> AppResult<FieldDescriptor> {
        let now = Utc::now();
        let model = form_field::ActiveModel {
            label: Set(draft.label),
            field_type: Set(draft.field_type.to_string()),
            is_required: Set(draft.is_required),
            field_order: Set(draft.order),
            options: Set(draft.options.join(",")),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.txn)
        .await?;

        FieldDescriptor::try_from(model)
    }

    /// Overwrite an existing descriptor; silent no-op when the id is unknown
    pub async fn update(&self, id: i64, draft: FieldDraft) -> AppResult<()> {
        let Some(existing) = form_field::Entity::find_by_id(id).one(self.txn).await? else {
            return Ok(());
        };

        let mut active: form_field::ActiveModel = existing.into();
        active.label = Set(draft.label);
        active.field_type = Set(draft.field_type.to_string());
        active.is_required = Set(draft.is_required);
        active.field_order = Set(draft.order);
        active.options = Set(draft.options.join(","));
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    /// Move an existing descriptor to a new position
    pub async fn set_order(&self, id: i64, target: i32) -> AppResult<()> {
        let existing = form_field::Entity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: form_field::ActiveModel = existing.into();
        active.field_order = Set(target);
        active.updated_at = Set(Utc::now());
        active.update(self.txn).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        let result = form_field::Entity::delete_by_id(id).exec(self.txn).await?;
        Ok(result.rows_affected)
    }
}
