//! Service Container - Centralized service access.
//!
//! Wires the concrete services to the Unit of Work and exposes them behind
//! their traits for dependency injection.

use std::sync::Arc;

use super::{AuthService, EmployeeService, FieldService};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get field definition service
    fn fields(&self) -> Arc<dyn FieldService>;

    /// Get employee record service
    fn employees(&self) -> Arc<dyn EmployeeService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    field_service: Arc<dyn FieldService>,
    employee_service: Arc<dyn EmployeeService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        field_service: Arc<dyn FieldService>,
        employee_service: Arc<dyn EmployeeService>,
    ) -> Self {
        Self {
            auth_service,
            field_service,
            employee_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, EmployeeManager, FieldManager};

        let uow = Arc::new(Persistence::new(db));
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            field_service: Arc::new(FieldManager::new(uow.clone())),
            employee_service: Arc::new(EmployeeManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn fields(&self) -> Arc<dyn FieldService> {
        self.field_service.clone()
    }

    fn employees(&self) -> Arc<dyn EmployeeService> {
        self.employee_service.clone()
    }
}
