//! Domain models for the admin portal.

pub mod session;
pub mod user;

pub use session::{CurrentUser, Session};
pub use user::{NewUser, StoredUser, UserPatch, UserProfile};
pub use berkasman_core::{Email, Role, RoleSet, UserId};
