mod chirp_service;
mod session_service;
mod user_service;

pub use chirp_service::*;
pub use session_service::*;
pub use user_service::*;
