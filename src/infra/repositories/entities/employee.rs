//! SeaORM entity for the employees table.

use sea_orm::entity::prelude::*;
use serde_json::{Map, Value};

use crate::domain::{EmployeeRecord, User};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub employee_code: String,
    /// Dynamic-field attribute bag
    pub extra_data: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Attribute bag as a JSON object, tolerating legacy non-object values
    pub fn attributes(&self) -> Map<String, Value> {
        match &self.extra_data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }

    /// Pair this row with its identity row into a domain record
    pub fn into_domain(self, user: super::user::Model) -> AppResult<EmployeeRecord> {
        if user.id != self.user_id {
            return Err(AppError::internal("Employee joined to wrong identity"));
        }
        let attributes = self.attributes();
        Ok(EmployeeRecord {
            id: self.id,
            user: User::from(user),
            employee_code: self.employee_code,
            attributes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
