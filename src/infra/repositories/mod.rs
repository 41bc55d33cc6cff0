//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod employee_repository;
pub(crate) mod entities;
mod field_repository;
mod user_repository;

pub use employee_repository::{EmployeeChanges, EmployeeRepository, EmployeeStore};
pub use field_repository::{FieldRepository, FieldStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use employee_repository::MockEmployeeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use field_repository::MockFieldRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
