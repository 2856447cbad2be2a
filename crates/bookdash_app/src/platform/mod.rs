mod app;
mod artifacts;
mod effects;
mod logging;
mod render;

pub use app::run_app;
