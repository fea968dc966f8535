pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod git_ops;
pub mod host;
pub mod menu;
pub mod orchestrator;
pub mod process;
pub mod refs;
pub mod repository;
pub mod switches;

// Make mock_host available for headless integration testing
pub mod mock_host;
