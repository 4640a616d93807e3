// handlers/public/mod.rs - Token acquisition and account creation
//
// Security Level: None. These are the only routes middleware::policy lets
// through without an identity, so every input is validated here.
pub mod auth;
pub mod users;

pub use auth::login;
pub use users::register;
