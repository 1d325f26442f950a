//! Configuration error types for the Shopify webhooks library.
//!
//! This module contains the error type returned by configuration newtypes and
//! by [`ShopifyConfigBuilder::build`](crate::ShopifyConfigBuilder::build).
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{ApiSecretKey, ConfigError};
//!
//! let result = ApiSecretKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiSecretKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://myapp.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The retry count for GraphQL requests must be at least one.
    #[error("Invalid GraphQL tries '{tries}'. At least one attempt is required.")]
    InvalidTries {
        /// The rejected number of tries.
        tries: u32,
    },
}
