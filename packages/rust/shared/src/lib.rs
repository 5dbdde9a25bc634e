//! Shared types, error model, and configuration for ragwalk.
//!
//! This crate is the foundation depended on by all other ragwalk crates.
//! It provides:
//! - [`RagwalkError`], the unified error type
//! - Domain types ([`Locale`], [`StepId`], [`StepContent`], [`DemoHandle`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildSection, CONFIG_FILE_NAME, SiteConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{RagwalkError, Result};
pub use types::{
    DemoHandle, Locale, NavigationContext, PLACEHOLDER_TEXT, ResolvedStep, StepContent, StepId,
};
