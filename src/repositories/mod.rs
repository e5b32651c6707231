//! Repository layer for user persistence.
//!
//! [`UserStore`] is the seam between the domain service and storage.
//! [`PgUserStore`] talks to PostgreSQL; [`MemoryUserStore`] keeps rows in
//! process and stands in for the database in tests.

mod memory;
mod user_repo;

pub use memory::MemoryUserStore;
pub use user_repo::PgUserStore;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges};

/// Persistence operations for `User` rows keyed by an integer id.
///
/// Absence is reported as `Ok(None)`, never as an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a row and return it with its assigned id.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn get(&self, id: i32) -> AppResult<Option<User>>;

    /// All rows ordered by id.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Replace name and dob of an existing row. `None` if the id is unknown.
    async fn update(&self, id: i32, changes: UserChanges) -> AppResult<Option<User>>;

    /// Remove a row. Deleting an unknown id succeeds.
    async fn delete(&self, id: i32) -> AppResult<()>;
}
