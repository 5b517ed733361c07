pub mod cli;
pub mod config;
pub mod dataset;
pub mod draw;
pub mod events;
pub mod render;
pub mod sys;
