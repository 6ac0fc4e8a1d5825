pub mod analyzers;
pub mod config;
pub mod error;
pub mod features;
pub mod infra;
pub mod parser;
pub mod records;
pub mod services;
pub mod store;
pub mod web;

pub use error::{Error, Result};
