pub mod actor;
pub mod authenticated_user;
pub mod authentication_request;

pub use actor::Actor;
pub use authenticated_user::AuthenticatedUser;
pub use authentication_request::{AuthMode, RequiredRole};
