pub mod identity;
pub mod password;
pub mod token;

pub use identity::{Identity, Permission, Permissions};
pub use password::{hash_password, verify_password, PasswordError, UNKNOWN_USER_HASH};
pub use token::{Claims, IssuedToken, TokenError, TokenService};
