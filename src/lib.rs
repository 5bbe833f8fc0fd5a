// Library surface for headless/integration tests and reuse.
// The TUI (screens, CLI, event loop) lives in main.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod exercise;
pub mod hints;
pub mod input;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod mistakes;
pub mod runtime;
pub mod session;
pub mod time_series;

pub use controller::{
    InputOutcome, RenderSnapshot, SessionController, SessionError, SessionOptions,
    SessionResults, TICK_RATE_MS,
};
pub use exercise::{Catalog, Exercise, ExerciseError, ExerciseSource};
pub use layout::KeyboardLayout;
