//! User service: maps between store records and response DTOs and derives age.

use std::sync::Arc;

use jiff::civil::Date;

use crate::api::dto::{Age, UserResponse};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserStore;
use crate::services::age::{Clock, age_on};

/// User service for handling user-related business logic.
///
/// Performs no field validation; callers hand it a checked name and date.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn with_age(&self, user: User) -> UserResponse {
        let age = age_on(user.dob(), self.clock.today());
        UserResponse::from_user(user, Age::Computed(age))
    }

    /// Creates a new user.
    ///
    /// # Returns
    /// The stored user; age is not computed on this path
    pub async fn create(&self, name: &str, dob: Date) -> AppResult<UserResponse> {
        let user = self.store.create(NewUser::new(name, dob)).await?;
        Ok(UserResponse::from_user(user, Age::NotComputed))
    }

    /// Gets a user by their ID.
    ///
    /// # Returns
    /// `Some` with age computed, `None` if no row has this id
    pub async fn get(&self, id: i32) -> AppResult<Option<UserResponse>> {
        Ok(self.store.get(id).await?.map(|user| self.with_age(user)))
    }

    /// Lists all users ordered by id, each with age computed.
    pub async fn list(&self) -> AppResult<Vec<UserResponse>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(|user| self.with_age(user)).collect())
    }

    /// Replaces a user's name and date of birth.
    ///
    /// # Returns
    /// The updated user with age computed, or `NotFound` for an unknown id
    pub async fn update(&self, id: i32, name: &str, dob: Date) -> AppResult<UserResponse> {
        self.store
            .update(id, UserChanges::new(name, dob))
            .await?
            .map(|user| self.with_age(user))
            .ok_or_else(|| AppError::not_found("User", "id", id))
    }

    /// Deletes a user. Unknown ids are not an error.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.delete(id).await
    }
}
