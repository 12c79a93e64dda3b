pub mod catalog;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod db;
pub mod delta;
pub mod errors;
pub mod loader;
pub mod services;
pub mod types;
pub mod utils;
