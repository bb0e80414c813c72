//! Configuration module for Chapter-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and owns the registry of content API configurations.
//!
//! # Example
//!
//! ```no_run
//! use chapter_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Chapter retries: {}", config.download.max_retries);
//! ```

mod parser;
mod registry;
mod types;
mod validation;

// Re-export types
pub use registry::ApiRegistry;
pub use types::{
    ApiConfig, BookApiConfig, Config, DownloadConfig, OutputConfig, BOOK_ID_PLACEHOLDER,
    CHAPTER_ID_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_text, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate_api;
