pub mod draw_manager;
pub mod generator;
pub mod visibility;

pub use crate::domain::model::{Draw, DrawSummary, RecipientView};
pub use crate::domain::ports::{DrawStore, PolicyProvider};
pub use crate::utils::error::Result;
