// src/cli/handlers/mod.rs

// This module contains the logic for each CLI action.

pub mod commons;
pub mod run;
pub mod scripts;
pub mod shell;
pub mod shells;
