//! Presentation endpoints backing the HTML screens.
//!
//! These are thin JSON translations of the form-configuration, employee
//! form and listing views: GET returns the data the screen renders, POST
//! takes the submission. Rendering itself is a client concern.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{rejection::JsonRejection, Form, Path, Query, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::employee_handler::page_and_filters;
use super::field_handler::OptionsValue;
use crate::api::AppState;
use crate::config::is_identity_field;
use crate::domain::{
    EmployeeResponse, FieldDescriptor, FieldDraft, FieldOp, FieldType, IdentityDraft,
};
use crate::errors::{AppError, AppResult};
use crate::types::{PaginationMeta, StatusResponse};

/// Presentation routes
pub fn web_routes() -> Router<AppState> {
    Router::new()
        .route("/form/config", get(form_config).post(save_form_config))
        .route("/employees/create", get(creation_form).post(create_employee))
        .route(
            "/employees/edit/:id",
            get(edit_form).post(update_employee),
        )
        .route("/employees/list", get(employee_list))
        .route("/employees/list/:id", delete(delete_employee))
}

// =============================================================================
// Form configuration screen
// =============================================================================

/// Descriptor as the configuration screen shows it: options comma-joined
#[derive(Debug, Serialize)]
struct ConfigFieldView {
    id: i64,
    field_label: String,
    field_type: String,
    field_is_required: bool,
    field_order: i32,
    options: String,
}

impl From<FieldDescriptor> for ConfigFieldView {
    fn from(descriptor: FieldDescriptor) -> Self {
        Self {
            id: descriptor.id,
            field_label: descriptor.label.clone(),
            field_type: descriptor.field_type.to_string(),
            field_is_required: descriptor.is_required,
            field_order: descriptor.order,
            options: descriptor.options_joined(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FormConfigScreen {
    dynamic_fields: Vec<ConfigFieldView>,
}

/// One entry of a bulk form-configuration submission
#[derive(Debug, Deserialize)]
struct ConfigFieldEntry {
    id: Option<i64>,
    #[serde(default)]
    label: String,
    field_type: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    order: i32,
    options: Option<OptionsValue>,
    #[serde(default)]
    deleted: bool,
}

impl ConfigFieldEntry {
    fn into_op(self) -> AppResult<Option<FieldOp>> {
        if self.deleted {
            // Entries never saved can be marked deleted; nothing to do
            return Ok(self.id.map(|id| FieldOp::Delete { id }));
        }

        let field_type = match self.field_type.as_deref() {
            Some(raw) => raw.parse::<FieldType>()?,
            None => FieldType::Text,
        };
        let draft = FieldDraft {
            label: self.label,
            field_type,
            is_required: self.required,
            order: self.order,
            options: self.options.map(OptionsValue::into_list).unwrap_or_default(),
        };

        Ok(Some(match self.id {
            Some(id) => FieldOp::Update { id, draft },
            None => FieldOp::Create(draft),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct FormConfigPayload {
    fields: Option<Vec<ConfigFieldEntry>>,
}

/// Current form configuration
async fn form_config(State(state): State<AppState>) -> AppResult<Json<FormConfigScreen>> {
    let fields = state.field_service.list().await?;
    Ok(Json(FormConfigScreen {
        dynamic_fields: fields.into_iter().map(ConfigFieldView::from).collect(),
    }))
}

/// Apply a bulk form-configuration update
async fn save_form_config(
    State(state): State<AppState>,
    payload: Result<Json<FormConfigPayload>, JsonRejection>,
) -> AppResult<Json<StatusResponse>> {
    let Json(payload) = payload.map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))?;
    let entries = payload
        .fields
        .ok_or_else(|| AppError::BadRequest("fields missing".to_string()))?;

    let mut ops = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(op) = entry.into_op()? {
            ops.push(op);
        }
    }

    state.field_service.bulk_apply(ops).await?;
    Ok(Json(StatusResponse::message("Saved Successfully")))
}

// =============================================================================
// Employee creation / edit screens
// =============================================================================

/// Descriptor as the employee form renders it: options split into choices
#[derive(Debug, Serialize)]
struct FormFieldView {
    id: i64,
    field_label: String,
    field_key: String,
    field_type: String,
    field_is_required: bool,
    options: Vec<String>,
}

impl From<FieldDescriptor> for FormFieldView {
    fn from(descriptor: FieldDescriptor) -> Self {
        Self {
            id: descriptor.id,
            field_label: descriptor.label.clone(),
            field_key: descriptor.key(),
            field_type: descriptor.field_type.to_string(),
            field_is_required: descriptor.is_required,
            options: descriptor.options,
        }
    }
}

/// Identity values prefilled when editing
#[derive(Debug, Serialize)]
struct InitialValues {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    employee_id: String,
}

#[derive(Debug, Serialize)]
struct CreationScreen {
    dynamic_fields: Vec<FormFieldView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial: Option<InitialValues>,
}

/// Data for the blank employee form
async fn creation_form(State(state): State<AppState>) -> AppResult<Json<CreationScreen>> {
    let fields = state.field_service.list().await?;
    Ok(Json(CreationScreen {
        dynamic_fields: fields.into_iter().map(FormFieldView::from).collect(),
        initial: None,
    }))
}

/// Data for the edit form, prefilled from an existing record
async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CreationScreen>> {
    let record = state.employee_service.get(id).await?;
    let fields = state.field_service.list().await?;

    Ok(Json(CreationScreen {
        dynamic_fields: fields.into_iter().map(FormFieldView::from).collect(),
        initial: Some(InitialValues {
            username: record.user.username,
            first_name: record.user.first_name,
            last_name: record.user.last_name,
            email: record.user.email,
            employee_id: record.employee_code,
        }),
    }))
}

/// Split a form submission into identity draft, employee code and the
/// dynamic remainder
fn split_submission(
    mut form: BTreeMap<String, String>,
) -> (IdentityDraft, String, Map<String, Value>) {
    let identity = IdentityDraft {
        username: form.remove("username").unwrap_or_default(),
        first_name: form.remove("first_name").unwrap_or_default(),
        last_name: form.remove("last_name").unwrap_or_default(),
        email: form.remove("email").unwrap_or_default(),
        password: form.remove("password").filter(|p| !p.is_empty()),
    };
    let employee_code = form.remove("employee_id").unwrap_or_default();

    let dynamic = form
        .into_iter()
        .filter(|(key, _)| !is_identity_field(key))
        .map(|(key, value)| (key, Value::String(value)))
        .collect();

    (identity, employee_code, dynamic)
}

/// Submit the creation form
async fn create_employee(
    State(state): State<AppState>,
    Form(form): Form<BTreeMap<String, String>>,
) -> AppResult<Json<StatusResponse>> {
    if form.is_empty() {
        return Err(AppError::BadRequest("No data received".to_string()));
    }

    let (identity, employee_code, dynamic) = split_submission(form);
    let id = state
        .employee_service
        .create_or_update(None, identity, employee_code, dynamic)
        .await?;

    Ok(Json(StatusResponse::with_id(
        "Employee Created/Updated successfully",
        id,
    )))
}

/// Submit the edit form
async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<BTreeMap<String, String>>,
) -> AppResult<Json<StatusResponse>> {
    if form.is_empty() {
        return Err(AppError::BadRequest("No data received".to_string()));
    }

    let (identity, employee_code, dynamic) = split_submission(form);
    let id = state
        .employee_service
        .create_or_update(Some(id), identity, employee_code, dynamic)
        .await?;

    Ok(Json(StatusResponse::with_id(
        "Employee Created/Updated successfully",
        id,
    )))
}

// =============================================================================
// Employee listing screen
// =============================================================================

#[derive(Debug, Serialize)]
struct ListScreen {
    employees: Vec<EmployeeResponse>,
    pagination: PaginationMeta,
    dynamic_fields: Vec<FormFieldView>,
}

/// Paginated, filterable employee listing
async fn employee_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListScreen>> {
    let descriptors = state.field_service.list().await?;
    let (page, filters) = page_and_filters(params, &descriptors);

    let page_of_records = state.employee_service.list(filters, page).await?;
    let page_of_records = page_of_records.map(EmployeeResponse::from);

    Ok(Json(ListScreen {
        employees: page_of_records.data,
        pagination: page_of_records.meta,
        dynamic_fields: descriptors.into_iter().map(FormFieldView::from).collect(),
    }))
}

/// Delete an employee and its identity; unknown ids acknowledge silently
async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<StatusResponse>> {
    state.employee_service.delete(id).await?;
    Ok(Json(StatusResponse::success()))
}
