//! REST handlers for the dynamic form field resource.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::domain::{split_options, FieldDescriptor, FieldDraft, FieldType};
use crate::errors::{AppError, AppResult};
use crate::types::DetailResponse;

/// Options arrive either as a list or as an already comma-joined string
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum OptionsValue {
    List(Vec<String>),
    Joined(String),
}

impl OptionsValue {
    pub fn into_list(self) -> Vec<String> {
        match self {
            OptionsValue::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            OptionsValue::Joined(joined) => split_options(&joined),
        }
    }
}

/// Wire representation of a field descriptor
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldResponse {
    pub id: i64,
    pub field_label: String,
    pub field_type: String,
    pub field_is_required: bool,
    pub field_order: i32,
    pub options: Vec<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<FieldDescriptor> for FieldResponse {
    fn from(descriptor: FieldDescriptor) -> Self {
        Self {
            id: descriptor.id,
            field_label: descriptor.label,
            field_type: descriptor.field_type.to_string(),
            field_is_required: descriptor.is_required,
            field_order: descriptor.order,
            options: descriptor.options,
            created_on: descriptor.created_at,
            updated_on: descriptor.updated_at,
        }
    }
}

/// Body for creating or overwriting a descriptor through the resource
#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldBody {
    pub field_label: String,
    pub field_type: String,
    #[serde(default)]
    pub field_is_required: bool,
    #[serde(default)]
    pub field_order: i32,
    pub options: Option<OptionsValue>,
}

impl FieldBody {
    fn into_draft(self) -> AppResult<FieldDraft> {
        if self.field_label.trim().is_empty() {
            return Err(AppError::field_error("field_label", "This field is required."));
        }
        let field_type: FieldType = self.field_type.parse()?;
        Ok(FieldDraft {
            label: self.field_label,
            field_type,
            is_required: self.field_is_required,
            order: self.field_order,
            options: self.options.map(OptionsValue::into_list).unwrap_or_default(),
        })
    }
}

/// Body of the update_order custom action
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderBody {
    pub id: i64,
    pub field_order: i32,
}

/// Routes for the fields resource
pub fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_fields).post(create_field))
        .route("/update_order", put(update_order))
        .route("/add_field", post(add_field))
        .route(
            "/:id",
            get(get_field).put(update_field).delete(delete_field),
        )
}

/// List all dynamic form fields in form order
#[utoipa::path(
    get,
    path = "/api/fields",
    tag = "Fields",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All field descriptors", body = [FieldResponse]))
)]
pub async fn list_fields(State(state): State<AppState>) -> AppResult<Json<Vec<FieldResponse>>> {
    let fields = state.field_service.list().await?;
    Ok(Json(fields.into_iter().map(FieldResponse::from).collect()))
}

/// Fetch one descriptor
#[utoipa::path(
    get,
    path = "/api/fields/{id}",
    tag = "Fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Descriptor id")),
    responses(
        (status = 200, body = FieldResponse),
        (status = 404, description = "No such descriptor")
    )
)]
pub async fn get_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<FieldResponse>> {
    let field = state.field_service.get(id).await?;
    Ok(Json(FieldResponse::from(field)))
}

/// Create a descriptor at its given order without reordering neighbours
#[utoipa::path(
    post,
    path = "/api/fields",
    tag = "Fields",
    security(("bearer_auth" = [])),
    request_body = FieldBody,
    responses(
        (status = 201, body = FieldResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_field(
    State(state): State<AppState>,
    Json(body): Json<FieldBody>,
) -> AppResult<(StatusCode, Json<FieldResponse>)> {
    let field = state.field_service.create(body.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(FieldResponse::from(field))))
}

/// Overwrite a descriptor
#[utoipa::path(
    put,
    path = "/api/fields/{id}",
    tag = "Fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Descriptor id")),
    request_body = FieldBody,
    responses(
        (status = 200, body = FieldResponse),
        (status = 404, description = "No such descriptor")
    )
)]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<FieldBody>,
) -> AppResult<Json<FieldResponse>> {
    let field = state.field_service.update(id, body.into_draft()?).await?;
    Ok(Json(FieldResponse::from(field)))
}

/// Delete a descriptor.
///
/// Attribute bags of existing employees are not reflowed; keys written for
/// this field simply become inert.
#[utoipa::path(
    delete,
    path = "/api/fields/{id}",
    tag = "Fields",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Descriptor id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such descriptor")
    )
)]
pub async fn delete_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.field_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a descriptor to a new position, shifting the fields at or past it
#[utoipa::path(
    put,
    path = "/api/fields/update_order",
    tag = "Fields",
    security(("bearer_auth" = [])),
    request_body = UpdateOrderBody,
    responses((status = 200, description = "Order updated"))
)]
pub async fn update_order(
    State(state): State<AppState>,
    Json(body): Json<UpdateOrderBody>,
) -> AppResult<Json<DetailResponse>> {
    state.field_service.move_to(body.id, body.field_order).await?;
    Ok(Json(DetailResponse::new("Order updated successfully")))
}

/// Insert a new descriptor at a position, shifting the fields at or past it
#[utoipa::path(
    post,
    path = "/api/fields/add_field",
    tag = "Fields",
    security(("bearer_auth" = [])),
    request_body = FieldBody,
    responses(
        (status = 200, description = "Field added"),
        (status = 400, description = "Missing label or type")
    )
)]
pub async fn add_field(
    State(state): State<AppState>,
    Json(body): Json<FieldBody>,
) -> AppResult<Json<DetailResponse>> {
    state.field_service.insert_at(body.into_draft()?).await?;
    Ok(Json(DetailResponse::new("Field added successfully")))
}
