//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and on the Unit of Work for repository access
//! and transaction management.

mod auth_service;
pub mod container;
mod employee_service;
mod field_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{
    AccessToken, AuthService, Authenticator, Claims, TokenKind, TokenPair,
};
pub use employee_service::{EmployeeManager, EmployeeService};
pub use field_service::{FieldManager, FieldService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
