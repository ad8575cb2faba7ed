pub mod config;
pub mod jwt;
pub mod password;
pub mod permissions;

pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
pub use password::PasswordService;
pub use permissions::{current_user, require_user};
