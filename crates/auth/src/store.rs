use async_trait::async_trait;
use shop_database::service::DbService;
use shop_error::{AppError, AppResult};
use shop_models::user::User;

/// The user store consumed by the auth flow. `create` fails with
/// `ResourceExistsError` on a duplicate email (the store's unique index is
/// the authority); `save` persists an existing record as-is and never
/// re-derives anything from it.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>>;
    async fn create(&self, user: User) -> AppResult<User>;
    async fn save(&self, user: User) -> AppResult<User>;
}

#[async_trait]
impl UserStore for DbService<'static, User> {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.get_records_by_field("email", email.to_string()).await?;
        Ok(users.into_iter().next())
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        self.get_record_by_id(user_id).await
    }

    async fn create(&self, user: User) -> AppResult<User> {
        self.create_record(user).await?.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!("Database did not return the stored user"))
        })
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let record_id = user.id.id.to_string();
        self.update_record(&record_id, user).await?.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!("Database did not return the updated user"))
        })
    }
}
