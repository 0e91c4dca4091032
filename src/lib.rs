pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{file::FileStore, memory::InMemoryStore};
pub use config::{roster::RosterConfig, DrawPolicy};
pub use self::core::{draw_manager::DrawManager, generator::generate};
pub use domain::model::{DrawSummary, RecipientView};
pub use utils::error::{DrawError, ErrorKind, Result};
