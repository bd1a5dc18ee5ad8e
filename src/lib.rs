#![warn(clippy::all)]
pub mod core;

pub mod app;
pub use app::run;
