/// User accounts
///
/// Roles, user records and the validators applied to registration and
/// profile input. Authentication and password hashing live elsewhere.

pub mod types;

pub use types::{
    normalize_email, normalize_username, validate_password, User, UserChangePassword, UserCreate, UserRole,
    UserSummary, UserUpdate,
};
