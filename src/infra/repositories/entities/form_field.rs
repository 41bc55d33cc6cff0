//! SeaORM entity for the form_fields table.

use sea_orm::entity::prelude::*;

use crate::domain::{split_options, FieldDescriptor, FieldType};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "form_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub label: String,
    pub field_type: String,
    pub is_required: bool,
    pub field_order: i32,
    /// Choices comma-joined; empty for types without options
    pub options: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FieldDescriptor {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        let field_type: FieldType = model
            .field_type
            .parse()
            .map_err(|_| AppError::internal(format!("Corrupt field type: {}", model.field_type)))?;

        Ok(Self {
            id: model.id,
            label: model.label,
            field_type,
            is_required: model.is_required,
            order: model.field_order,
            options: split_options(&model.options),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
