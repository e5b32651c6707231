//! Request extraction and validation helpers.

mod validate;

pub use validate::{DOB_FORMAT, UserId, ValidatedJson, validate_dob, validation_details};
