//! The [`Session`] handed to the Admin API clients.

use crate::config::ShopDomain;
use std::fmt;

/// An access token for one shop.
///
/// Registration only needs offline, app-level access, so a session is the
/// shop plus its token.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::{Session, ShopDomain};
///
/// let session = Session::new(ShopDomain::new("my-store").unwrap(), "access-token");
/// assert_eq!(session.shop.as_ref(), "my-store.myshopify.com");
/// assert_eq!(format!("{session:?}").contains("access-token"), false);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: String,
}

impl Session {
    /// Creates a session for `shop`.
    #[must_use]
    pub fn new(shop: ShopDomain, access_token: impl Into<String>) -> Self {
        Self {
            shop,
            access_token: access_token.into(),
        }
    }

    /// Returns `true` if the session carries a token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("shop", &self.shop)
            .field("access_token", &"*****")
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopDomain {
        ShopDomain::new("shop").unwrap()
    }

    #[test]
    fn test_session_is_active_requires_token() {
        assert!(Session::new(shop(), "token").is_active());
        assert!(!Session::new(shop(), "").is_active());
    }

    #[test]
    fn test_session_debug_masks_token() {
        let debug = format!("{:?}", Session::new(shop(), "shpat_secret"));
        assert!(debug.contains("shop.myshopify.com"));
        assert!(!debug.contains("shpat_secret"));
    }
}
