use eyre::Result;
use log::info;

use crate::domain::user::StoredUser;
use crate::repository::users::UserRepository;
use types::error::Error;

#[derive(Clone)]
pub struct UserService {
    pub user_repository: UserRepository,
}

impl UserService {
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        email: String,
    ) -> Result<StoredUser> {
        let user = self
            .user_repository
            .update_profile(user_id, name, email)
            .await?
            .ok_or(Error::UserNotFound)?;
        info!("User {} updated profile", user.id);
        Ok(user)
    }
}
