pub mod api;
pub mod app;
pub mod modules;
pub mod style;
