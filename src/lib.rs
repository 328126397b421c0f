pub mod api;
pub mod collector;
pub mod config;
pub mod engine;
pub mod enricher;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod store;
pub mod testing;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::Result;
    pub use crate::model::{CharacterRecord, Conversation};
    pub use crate::orchestrator::{Orchestrator, RunSummary};
}
