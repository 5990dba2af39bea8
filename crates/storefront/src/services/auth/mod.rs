//! Authentication service.
//!
//! Password accounts with argon2 hashes, plus the signed session tokens in
//! [`tokens`].

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{CurrentUser, SessionClaims, TokenKeys};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use aneka_citra_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registration or admin-creation request.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: Option<&'a str>,
}

/// Who is asking for a new account at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    /// A visitor, or a signed-in user without super admin rights.
    Public,
    /// A super admin, who may set the new account's role.
    SuperAdmin,
}

impl Registrar {
    /// The role the new account gets.
    ///
    /// No role means `CUSTOMER`. Only a super admin may ask for `ADMIN`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RoleNotAllowed` if a public registration asks for
    /// `ADMIN`.
    pub fn grant(self, requested: Option<Role>) -> Result<Role, AuthError> {
        match (requested.unwrap_or_default(), self) {
            (Role::Admin, Self::Public) => Err(AuthError::RoleNotAllowed(Role::Admin)),
            (role, _) => Ok(role),
        }
    }
}

/// Authentication service.
///
/// Handles registration, login and admin account management.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register an account.
    ///
    /// The role defaults to `CUSTOMER`; see [`Registrar::grant`] for who may
    /// override it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RoleNotAllowed` if the registrar may not grant the
    /// requested role.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        registration: Registration<'_>,
        requested_role: Option<Role>,
        registrar: Registrar,
    ) -> Result<User, AuthError> {
        let role = registrar.grant(requested_role)?;
        self.create_account(registration, role).await
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register), minus the role check.
    pub async fn create_admin(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        self.create_account(registration, Role::Admin).await
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// List admin accounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list_admins(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.list_by_role(Role::Admin).await?)
    }

    async fn create_account(
        &self,
        registration: Registration<'_>,
        role: Role,
    ) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;
        let password_hash = hash_password(registration.password)?;
        let name = registration
            .name
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let user = self
            .users
            .create(NewUser {
                email: &email,
                password_hash: &password_hash,
                name,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password with argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
