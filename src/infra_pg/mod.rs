mod chirp_repo_pg;
mod refresh_token_repo_pg;
mod user_repo_pg;
mod util;

pub use chirp_repo_pg::*;
pub use refresh_token_repo_pg::*;
pub use user_repo_pg::*;
