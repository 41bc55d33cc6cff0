//! Infrastructure layer - External systems integration
//!
//! Database connections, SeaORM repositories and the Unit of Work for
//! transaction management.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    EmployeeChanges, EmployeeRepository, EmployeeStore, FieldRepository, FieldStore,
    UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxEmployeeRepository, TxFieldRepository, TxUserRepository,
    UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockEmployeeRepository, MockFieldRepository, MockUserRepository};
