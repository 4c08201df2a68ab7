//! User activation and review listings

use std::sync::Arc;

use crate::error::{Entity, Error, Result};
use crate::model::{User, UserReviews};
use crate::store::Store;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Toggle whether a user may be picked as a reviewer
    ///
    /// Existing assignments of the user are left in place.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User> {
        let mut uow = self.store.begin().await?;

        if !uow.set_user_active(user_id, is_active).await? {
            return Err(Error::not_found(Entity::User, user_id));
        }
        let user = uow
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::User, user_id))?;

        uow.commit().await?;
        tracing::info!(user_id = %user_id, is_active, "User activation changed");
        Ok(user)
    }

    /// Pull requests the user is currently assigned to review
    pub async fn reviews(&self, user_id: &str) -> Result<UserReviews> {
        let mut uow = self.store.begin().await?;

        if uow.find_user(user_id).await?.is_none() {
            return Err(Error::not_found(Entity::User, user_id));
        }
        let pull_requests = uow.reviews_for_user(user_id).await?;
        uow.commit().await?;

        Ok(UserReviews {
            user_id: user_id.to_string(),
            pull_requests,
        })
    }
}
