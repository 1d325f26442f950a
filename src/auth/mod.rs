//! Credentials for Admin API calls.
//!
//! Obtaining and storing access tokens is left to the application; this
//! module only carries a token for one shop to the clients that need it.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::{Session, ShopDomain};
//!
//! let session = Session::new(ShopDomain::new("my-store").unwrap(), "shpat_token");
//! assert!(session.is_active());
//! ```

pub mod session;

pub use session::Session;
