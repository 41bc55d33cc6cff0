//! REST handlers for the employees resource.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::api::AppState;
use crate::config::DEFAULT_PAGE_NUMBER;
use crate::domain::{EmployeeCreatedResponse, EmployeeResponse, FieldDescriptor};
use crate::errors::{AppError, AppResult};
use crate::infra::EmployeeChanges;
use crate::types::{Paginated, StatusResponse};

/// Body of a REST employee update; identity is referenced by id
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeBody {
    pub uid: Option<i64>,
    pub employee_id: Option<String>,
    pub extra_data: Option<Map<String, Value>>,
}

impl From<UpdateEmployeeBody> for EmployeeChanges {
    fn from(body: UpdateEmployeeBody) -> Self {
        Self {
            user_id: body.uid,
            employee_code: body.employee_id,
            attributes: body.extra_data,
        }
    }
}

/// Routes for the employees resource
pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/:id",
            get(get_employee)
                .put(update_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
}

/// Split the query string into the page number and attribute filters.
///
/// Only keys matching a defined descriptor become filters; anything else in
/// the query string is ignored.
pub(crate) fn page_and_filters(
    mut params: HashMap<String, String>,
    descriptors: &[FieldDescriptor],
) -> (u64, BTreeMap<String, String>) {
    let page = params
        .remove("page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PAGE_NUMBER);

    let mut filters = BTreeMap::new();
    for descriptor in descriptors {
        let key = descriptor.key();
        if let Some(value) = params.remove(&key) {
            if !value.is_empty() {
                filters.insert(key, value);
            }
        }
    }

    (page, filters)
}

/// Paginated employee listing, newest first
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "One page of employee records"))
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Paginated<EmployeeResponse>>> {
    let descriptors = state.field_service.list().await?;
    let (page, filters) = page_and_filters(params, &descriptors);

    let page_of_records = state.employee_service.list(filters, page).await?;
    Ok(Json(page_of_records.map(EmployeeResponse::from)))
}

/// Fetch one employee record with its nested identity
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Employee record"),
        (status = 404, description = "No such record")
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeResponse>> {
    let record = state.employee_service.get(id).await?;
    Ok(Json(EmployeeResponse::from(record)))
}

/// Create an employee from a flat payload of identity fields, the employee
/// code and dynamic-field keys
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Employee created"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<(StatusCode, Json<EmployeeCreatedResponse>)> {
    let Value::Object(payload) = payload else {
        return Err(AppError::BadRequest("Expected a JSON object".to_string()));
    };

    let record = state.employee_service.create_from_api(payload).await?;
    Ok((StatusCode::CREATED, Json(EmployeeCreatedResponse::from(record))))
}

/// Update an employee record; accepts partial bodies
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "No such record")
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateEmployeeBody>,
) -> AppResult<Json<EmployeeResponse>> {
    let record = state
        .employee_service
        .update_record(id, EmployeeChanges::from(body))
        .await?;
    Ok(Json(EmployeeResponse::from(record)))
}

/// Delete an employee record and its linked identity
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Record id")),
    responses((status = 200, description = "Deleted (idempotent)"))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<StatusResponse>> {
    state.employee_service.delete(id).await?;
    Ok(Json(StatusResponse::success()))
}
