//! Admin user management commands.

use bazaar_api::db::UserRepository;
use bazaar_api::db::users::UserProfile;
use bazaar_api::services::auth::{hash_password, validate_password};
use bazaar_core::{Email, UserId};

use super::{CommandError, connect};

/// Create a new admin user with a password.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for a bad email or name, `CommandError::Auth`
/// for a weak password, and `CommandError::Repository` if the email is taken.
pub async fn create_admin(email: &str, name: &str, password: &str) -> Result<UserId, CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::Invalid("name is required".to_owned()));
    }

    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    let profile = UserProfile {
        name: name.to_owned(),
        email,
        phone: String::new(),
        is_admin: true,
        street: String::new(),
        apartment: String::new(),
        zip: String::new(),
        city: String::new(),
        country: String::new(),
    };

    let user = UserRepository::new(&pool)
        .create(&profile, &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");

    Ok(user.id)
}
