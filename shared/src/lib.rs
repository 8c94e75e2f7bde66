pub mod config;
pub mod types;
pub mod utils;

pub use self::config::{build_config, load_config};
pub use types::*;
pub use utils::*;
