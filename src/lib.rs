// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod logging;
pub mod placement;
pub mod render;
pub mod runtime;
pub mod settings;
pub mod trail;
pub mod ui;
pub mod util;


pub use engine::{ClickOutcome, RunPhase, TrailTest};
pub use settings::TrailSettings;
