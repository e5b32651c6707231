//! Service layer for business logic operations.
//!
//! Services map between boundary DTOs and store records and own derived
//! values such as a user's age.

pub mod age;
mod user_service;

pub use age::{Clock, FixedClock, SystemClock, age_on};
pub use user_service::UserService;

use std::sync::Arc;

use crate::repositories::UserStore;

/// Aggregates all services for convenient access.
///
/// Used as Axum application state; cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
}

impl Services {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserService::new(store, clock),
        }
    }
}
