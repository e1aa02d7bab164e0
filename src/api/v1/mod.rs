mod error;
mod extract;
mod handler;
mod router;

pub use error::*;
pub use extract::*;
pub use handler::*;
pub use router::*;
