//! Domain layer - Core business entities and logic
//!
//! Business types independent of HTTP and storage concerns: identities,
//! employee records, field descriptors and the dynamic schema compiler.

pub mod employee;
pub mod field;
pub mod password;
pub mod schema;
pub mod user;

pub use employee::{EmployeeCreatedResponse, EmployeeRecord, EmployeeResponse, IdentityDraft};
pub use field::{field_key, split_options, FieldDescriptor, FieldDraft, FieldOp, FieldType};
pub use password::Password;
pub use schema::{FieldValue, FormSchema, ValidationReport};
pub use user::{User, UserResponse};
