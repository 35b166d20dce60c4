pub mod password;
pub mod validation;

pub use password::{hash_password, verify_password};
pub use validation::{
    reject_primary_key, require_columns, validate, validate_new, validate_only, validate_update,
    ValidationError,
};
