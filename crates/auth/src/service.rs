use std::sync::Arc;

use chrono::Utc;
use shop_error::{AppError, AppResult};
use shop_models::Role;
use shop_models::user::{
    LoginInput, LoginResponse, RegisterInput, RegisterResponse, UpdateUserInput, User, UserProfile,
};
use tracing::{error, info, warn};

use crate::{
    jwt::JwtService,
    password::{Argon2Hasher, CredentialHasher},
    store::UserStore,
    validation,
};

/// Orchestrates registration, login and profile updates: validation policy,
/// store lookups, credential hashing and token issuance, in that order.
///
/// Dependencies are injected at construction so the flow can be exercised
/// without a live database or a real (slow) hasher.
pub struct AuthService {
    jwt_service: Arc<JwtService>,
    hasher: Arc<dyn CredentialHasher>,
    user_store: Arc<dyn UserStore>,
    admin_email: String,
}

impl AuthService {
    pub fn new(jwt_secret: &[u8], user_store: Arc<dyn UserStore>) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::new(jwt_secret)),
            hasher: Arc::new(Argon2Hasher),
            user_store,
            admin_email: String::new(),
        }
    }

    /// Set the email whose logins are granted the admin role.
    pub fn with_admin_email(mut self, admin_email: impl Into<String>) -> Self {
        self.admin_email = admin_email.into();
        self
    }

    /// Swap the credential hasher (tests use a cheap counting hasher).
    pub fn with_hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    // Infrastructure failures during registration surface with the
    // register-specific boundary message.
    fn register_failure(error: AppError) -> AppError {
        match error {
            AppError::DatabaseError(e) | AppError::ServerError(e) => AppError::DatabaseError(e),
            other => other,
        }
    }

    // Login infrastructure failures surface as a generic server error.
    fn login_failure(error: AppError) -> AppError {
        match error {
            AppError::DatabaseError(e) | AppError::ServerError(e) => AppError::ServerError(e),
            other => other,
        }
    }

    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        let email = input.email.trim().to_string();

        // Policy checks run before any store access.
        validation::validate_email(&email)?;
        validation::validate_password_strength(&input.password)?;

        let existing = self
            .user_store
            .find_by_email(&email)
            .await
            .map_err(Self::register_failure)?;

        if existing.is_some() {
            return Err(AppError::ResourceExistsError("User already exists".to_string()));
        }

        let hashed_password = self
            .hasher
            .hash(&input.password)
            .map_err(Self::register_failure)?;

        let user = User::new(
            input.name,
            email,
            input.phone,
            hashed_password,
            input.gender,
        );

        // Two registrations can both pass the lookup; the store's unique
        // email index decides the race and the loser is a duplicate, not a
        // server failure.
        let stored = match self.user_store.create(user).await {
            Ok(stored) => stored,
            Err(AppError::ResourceExistsError(_)) => {
                warn!("Concurrent registration lost the unique-index race");
                return Err(AppError::ResourceExistsError("User already exists".to_string()));
            }
            Err(e) => {
                error!("Failed to store new user: {}", e);
                return Err(Self::register_failure(e));
            }
        };

        info!("Registered new user {}", stored.id.id);

        // New accounts are always plain users; the admin role is derived at
        // login time, never at registration.
        let token = self
            .jwt_service
            .issue(&stored.id.id.to_string(), Role::User)
            .map_err(Self::register_failure)?;

        Ok(RegisterResponse {
            msg: "User registered successfully".to_string(),
            token,
        })
    }

    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let user = self
            .user_store
            .find_by_email(&input.email)
            .await
            .map_err(Self::login_failure)?
            // Same rejection as a wrong password: account existence stays
            // unobservable.
            .ok_or_else(AppError::invalid_credentials)?;

        let is_match = self
            .hasher
            .verify(&input.password, &user.password)
            .map_err(Self::login_failure)?;

        if !is_match {
            return Err(AppError::invalid_credentials());
        }

        // Recomputed on every login; a role column in the store would be a
        // privilege-escalation hazard and is never consulted.
        let role = Role::for_email(&input.email, &self.admin_email);

        let user_id = user.id.id.to_string();
        let token = self
            .jwt_service
            .issue(&user_id, role)
            .map_err(Self::login_failure)?;

        info!("{} login for {}", role, user_id);

        Ok(LoginResponse {
            msg: format!("{} login successful", role.display_name()),
            token,
            user_id,
            role,
        })
    }

    /// Patch a user record. The password is re-hashed only when a new
    /// plaintext is supplied; saves that leave it untouched never invoke the
    /// hasher again.
    pub async fn update_user(
        &self,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<UserProfile> {
        let mut user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("User"))?;

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(phone) = input.phone {
            user.phone = phone;
        }
        if let Some(gender) = input.gender {
            user.gender = gender;
        }
        if let Some(password) = input.password {
            validation::validate_password_strength(&password)?;
            user.password = self.hasher.hash(&password)?;
        }
        user.updated_at = Utc::now();

        let saved = self.user_store.save(user).await?;
        Ok(saved.into())
    }
}
