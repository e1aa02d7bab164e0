mod chirp_service;
mod password_hasher;
mod refresh_token_store;
mod session_service;
mod token_service;
mod user_service;

pub use chirp_service::*;
pub use password_hasher::*;
pub use refresh_token_store::*;
pub use session_service::*;
pub use token_service::*;
pub use user_service::*;
