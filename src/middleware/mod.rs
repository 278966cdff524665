pub mod auth;
pub mod response;

pub use auth::{jwt_auth_middleware, permission_middleware, service_key_middleware, AuthUser, ServiceKind};
pub use response::{ApiResponse, ApiResult};
