pub mod config;
pub mod display_path;
pub mod template_engine;
