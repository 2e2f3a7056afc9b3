pub mod store;
pub mod types;

pub use store::{publish_config, validate_complete, write_staged_config, CONFIG_FILE_NAME};
pub use types::*;
