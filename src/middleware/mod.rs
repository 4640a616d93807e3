pub mod auth;
pub mod json;
pub mod policy;
pub mod response;

pub use auth::authenticate;
pub use json::JsonBody;
pub use policy::{enforce, require, Access};
pub use response::{ApiResponse, ApiResult};
