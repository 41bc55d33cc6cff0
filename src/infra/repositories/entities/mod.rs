//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod employee;
pub mod form_field;
pub mod user;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use employee::{ActiveModel as EmployeeActiveModel, Entity as EmployeeEntity, Model as EmployeeModel};
#[allow(unused_imports)]
pub use form_field::{ActiveModel as FormFieldActiveModel, Entity as FormFieldEntity, Model as FormFieldModel};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
