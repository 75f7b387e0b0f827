//! Infrastructure layer
//!
//! This module contains configuration, logging and document IO.

mod config;
pub mod loader;
mod logging;

pub use config::{Config, LOG_ENV};
pub use loader::{
    DocumentFormat, load_overlay, load_project, parse_document, parse_project, render_document,
    render_project,
};
pub use logging::init_logging;
