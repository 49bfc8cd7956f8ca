// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns the terminal and the CLI.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod quote;
pub mod runtime;
pub mod session;
pub mod theme;
pub mod ui;
pub mod util;

/// How often the event loop wakes up to refresh the running clock
pub const TICK_RATE_MS: u64 = 100;
