// src/config/mod.rs
pub mod app;

pub use app::{LogFormat, Settings};
