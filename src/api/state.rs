//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{AuthService, EmployeeService, FieldService, Services};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Field definition service
    pub field_service: Arc<dyn FieldService>,
    /// Employee record service
    pub employee_service: Arc<dyn EmployeeService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        use crate::services::ServiceContainer;
        Self {
            auth_service: container.auth(),
            field_service: container.fields(),
            employee_service: container.employees(),
            database,
        }
    }

    /// Create new application state with manually injected services
    /// (used by tests to swap in mocks).
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        field_service: Arc<dyn FieldService>,
        employee_service: Arc<dyn EmployeeService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            field_service,
            employee_service,
            database,
        }
    }
}
