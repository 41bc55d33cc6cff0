//! Employee record repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde_json::{Map, Value};

use super::entities::employee::{self, Entity as EmployeeEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::domain::EmployeeRecord;
use crate::errors::{AppError, AppResult};

/// Fields of a REST employee update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub user_id: Option<i64>,
    pub employee_code: Option<String>,
    pub attributes: Option<Map<String, Value>>,
}

#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Record with its identity, or None
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EmployeeRecord>>;

    /// One page of records, newest first, with the unpaginated total.
    ///
    /// `filters` are exact-match predicates over attribute-bag keys.
    async fn list_page(
        &self,
        filters: BTreeMap<String, String>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<EmployeeRecord>, u64)>;

    /// Apply a partial REST update to an existing record
    async fn apply_changes(&self, id: i64, changes: EmployeeChanges) -> AppResult<EmployeeRecord>;

    /// Delete the record's identity row; the record itself goes via the
    /// FK cascade. Returns false when no such record exists.
    async fn delete_with_identity(&self, id: i64) -> AppResult<bool>;
}

/// SeaORM-backed employee repository
pub struct EmployeeStore {
    db: DatabaseConnection,
}

impl EmployeeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: i64) -> AppResult<Option<(employee::Model, user::Model)>> {
        let row = EmployeeEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await?;

        match row {
            Some((record, Some(identity))) => Ok(Some((record, identity))),
            Some((record, None)) => Err(AppError::internal(format!(
                "Employee {} has no identity row",
                record.id
            ))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl EmployeeRepository for EmployeeStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<EmployeeRecord>> {
        match self.load(id).await? {
            Some((record, identity)) => Ok(Some(record.into_domain(identity)?)),
            None => Ok(None),
        }
    }

    async fn list_page(
        &self,
        filters: BTreeMap<String, String>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<EmployeeRecord>, u64)> {
        let mut query = EmployeeEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(employee::Column::Id);

        for (key, value) in filters {
            query = query.filter(Expr::cust_with_values("extra_data ->> ? = ?", [key, value]));
        }

        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut records = Vec::with_capacity(rows.len());
        for (record, identity) in rows {
            let identity = identity.ok_or_else(|| {
                AppError::internal(format!("Employee {} has no identity row", record.id))
            })?;
            records.push(record.into_domain(identity)?);
        }

        Ok((records, total))
    }

    async fn apply_changes(&self, id: i64, changes: EmployeeChanges) -> AppResult<EmployeeRecord> {
        let (record, _) = self.load(id).await?.ok_or(AppError::NotFound)?;

        if let Some(user_id) = changes.user_id {
            if UserEntity::find_by_id(user_id).one(&self.db).await?.is_none() {
                return Err(AppError::field_error("uid", "Unknown identity id."));
            }
        }

        let mut active: employee::ActiveModel = record.into();
        if let Some(user_id) = changes.user_id {
            active.user_id = Set(user_id);
        }
        if let Some(code) = changes.employee_code {
            active.employee_code = Set(code);
        }
        if let Some(attributes) = changes.attributes {
            active.extra_data = Set(Value::Object(attributes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        let identity = UserEntity::find_by_id(updated.user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::internal("Employee updated to missing identity"))?;

        updated.into_domain(identity)
    }

    async fn delete_with_identity(&self, id: i64) -> AppResult<bool> {
        let Some((record, identity)) = self.load(id).await? else {
            return Ok(false);
        };

        // Deleting the identity row cascades to the employee record
        let result = UserEntity::delete_by_id(identity.id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            tracing::warn!(employee = record.id, "Identity vanished before delete");
        }
        Ok(true)
    }
}
