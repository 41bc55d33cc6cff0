//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, employee_handler, field_handler};
use crate::domain::UserResponse;
use crate::services::{AccessToken, TokenPair};

/// OpenAPI documentation for the Staffdesk API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staffdesk",
        version = "0.1.0",
        description = "Employee records API with administrator-defined form fields",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::logout,
        auth_handler::profile,
        auth_handler::password_change,
        // Field descriptor endpoints
        field_handler::list_fields,
        field_handler::get_field,
        field_handler::create_field,
        field_handler::update_field,
        field_handler::delete_field,
        field_handler::update_order,
        field_handler::add_field,
        // Employee endpoints
        employee_handler::list_employees,
        employee_handler::get_employee,
        employee_handler::create_employee,
        employee_handler::update_employee,
        employee_handler::delete_employee,
    ),
    components(
        schemas(
            UserResponse,
            TokenPair,
            AccessToken,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            auth_handler::PasswordChangeRequest,
            field_handler::FieldResponse,
            field_handler::FieldBody,
            field_handler::UpdateOrderBody,
            field_handler::OptionsValue,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and tokens"),
        (name = "Fields", description = "Administrator-defined form fields"),
        (name = "Employees", description = "Employee record operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
