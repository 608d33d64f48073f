// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod history;
pub mod runtime;
pub mod session;
pub mod store;
pub mod typing_policy;
pub mod util;
