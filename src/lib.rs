pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod record;
