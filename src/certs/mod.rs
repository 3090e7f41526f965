mod models;
mod storage;

pub use models::*;
pub use storage::{parse_objectives, sanitize_line, CertStore, MAX_SESSIONS};
