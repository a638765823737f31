pub mod app;
pub mod topics;

pub use app::AppConfig;
pub use topics::{QueryProfile, TopicCatalog};
