// src/core/mod.rs

pub mod config_loader;
pub mod events;
pub mod output_filter;
pub mod paths;
pub mod preferences;
pub mod registry;
pub mod scripts;
