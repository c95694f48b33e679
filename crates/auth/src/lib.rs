pub mod jwt;
pub mod password;
pub mod service;
pub mod store;
pub mod validation;

// Re-export key items for convenience
pub use jwt::{Claims, JwtService};
pub use password::{Argon2Hasher, CredentialHasher};
pub use service::AuthService;
pub use store::UserStore;
