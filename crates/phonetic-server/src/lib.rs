pub mod handlers;

pub use handlers::{AppState, FallbackSource, SharedAnnotator, router};
