mod chirp;
mod token;
mod user;

pub use chirp::*;
pub use token::*;
pub use user::*;
