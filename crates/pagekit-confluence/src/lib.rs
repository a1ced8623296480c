//! Confluence client for pagekit.
//!
//! This crate provides:
//! - [`ConfluenceClient`]: REST API client with bearer or basic authentication
//! - [`PageUpdater`](updater::PageUpdater): conflict-aware page update workflow
//! - [`Query`](query::Query): CQL expression builder for search
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pagekit_confluence::{ConfluenceClient, Credentials};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Credentials::Bearer("token".to_owned()),
//! );
//!
//! let page = client.get_page("123", &["body.storage", "version"])?;
//! assert!(page.version.number >= 1);
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::{ConfluenceClient, Credentials, NewPage};

// CQL builder
pub mod query;

// Repository seam used by the updater
pub mod repository;

// Wire types
pub mod types;

// Page updater
pub mod updater;

// Errors
pub mod error;
pub use error::ConfluenceError;
