//! PostgreSQL user store built on diesel_async.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{NewUser, User, UserChanges};
use crate::repositories::UserStore;

/// User store holding an async connection pool.
///
/// `AsyncDbPool` is reference counted, so cloning the store is cheap.
#[derive(Clone)]
pub struct PgUserStore {
    pool: AsyncDbPool,
    query_timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: AsyncDbPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Run `op` under the query deadline. On expiry the future is dropped,
    /// which abandons the checkout or the in-flight query.
    async fn with_deadline<T, F>(&self, operation: &str, op: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_secs = self.query_timeout.as_secs(),
                    "Store operation exceeded deadline"
                );
                Err(AppError::timeout(operation))
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;

        self.with_deadline("insert user", async {
            let mut conn = self.pool.get().await?;

            diesel::insert_into(users)
                .values(&new_user)
                .returning(User::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert user"))
        })
        .await
    }

    async fn get(&self, user_id: i32) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;

        self.with_deadline("get user", async {
            let mut conn = self.pool.get().await?;

            users
                .filter(id.eq(user_id))
                .select(User::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "get user"))
        })
        .await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        use crate::schema::users::dsl::*;

        self.with_deadline("list users", async {
            let mut conn = self.pool.get().await?;

            users
                .select(User::as_select())
                .order(id.asc())
                .load(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list users"))
        })
        .await
    }

    async fn update(&self, user_id: i32, changes: UserChanges) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;

        self.with_deadline("update user", async {
            let mut conn = self.pool.get().await?;

            diesel::update(users.filter(id.eq(user_id)))
                .set(&changes)
                .returning(User::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update user"))
        })
        .await
    }

    async fn delete(&self, user_id: i32) -> AppResult<()> {
        use crate::schema::users::dsl::*;

        self.with_deadline("delete user", async {
            let mut conn = self.pool.get().await?;

            let affected = diesel::delete(users.filter(id.eq(user_id)))
                .execute(&mut conn)
                .await
                .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "delete user"))?;

            if affected == 0 {
                tracing::debug!(user_id, "Delete matched no rows");
            }
            Ok(())
        })
        .await
    }
}
