//! Business logic services for admin.
//!
//! # Services
//!
//! - `accounts` - Super Admin user management (create, list, update, delete)
//! - `auth` - Email/password login
//! - `password` - Argon2id password hashing
//! - `session` - Signed session tokens

pub mod accounts;
pub mod auth;
pub mod password;
pub mod session;

pub use accounts::{AccountError, AccountService, CreateUserRequest, UpdateUserRequest};
pub use auth::{AuthError, AuthService};
pub use password::{HashError, PasswordHasher};
pub use session::{IssuedSession, SessionTokens, TokenError};
