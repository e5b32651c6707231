//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` - User request/response DTOs
//! - `error` - Common error response DTO

mod error;
mod user;

pub use error::ErrorResponse;
pub use user::{Age, UserPayload, UserResponse};
