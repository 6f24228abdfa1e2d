pub mod health;
pub mod upload;

pub use health::liveness_check;
pub use upload::{not_found, upload};
