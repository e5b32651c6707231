//! In-process user store backed by a `DashMap`.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserStore;

/// Store that keeps rows in memory, used to drive the router without a
/// database.
///
/// Ids start at 1 and are never reused, matching a `SERIAL` column.
pub struct MemoryUserStore {
    rows: DashMap<i32, User>,
    next_id: AtomicI32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            name: new_user.name,
            dob: new_user.dob,
        };
        self.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.rows.get(&id).map(|row| row.value().clone()))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.rows.iter().map(|row| row.value().clone()).collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> AppResult<Option<User>> {
        Ok(self.rows.get_mut(&id).map(|mut row| {
            row.name = changes.name;
            row.dob = changes.dob;
            row.value().clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.rows.remove(&id);
        Ok(())
    }
}
