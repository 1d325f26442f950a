//! The table of application webhook handlers.
//!
//! An application fills a [`HandlerTable`] at startup, one entry per topic,
//! and passes it to [`register_all`](crate::webhooks::register_all) and to
//! [`process`](crate::webhooks::process). Topics are stored in their GraphQL
//! enum form, so `orders/create` and `ORDERS_CREATE` are the same key.
//!
//! # Example
//!
//! ```rust
//! use shopify_webhooks::webhooks::{HandlerEntry, HandlerTable};
//!
//! let mut handlers = HandlerTable::new();
//! handlers
//!     .add(
//!         "orders/create",
//!         HandlerEntry::new("/webhooks", |topic: String, shop: String, _body: Vec<u8>| async move {
//!             println!("{topic} from {shop}");
//!             Ok(())
//!         }),
//!     )
//!     .unwrap();
//!
//! assert!(handlers.get("ORDERS_CREATE").is_some());
//! assert!(handlers.has_path("/webhooks"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::webhooks::errors::HandlerError;
use crate::webhooks::WebhookError;

/// A boxed, `Send` future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler returns: success, or an opaque application error.
pub type HandlerResult = Result<(), HandlerError>;

/// Application code run for each verified delivery of a topic.
///
/// Closures taking `(topic, shop_domain, body)` by value implement this
/// trait directly.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::{BoxFuture, HandlerResult, WebhookHandler};
///
/// struct AuditLog;
///
/// impl WebhookHandler for AuditLog {
///     fn handle<'a>(
///         &'a self,
///         topic: &'a str,
///         shop_domain: &'a str,
///         body: &'a [u8],
///     ) -> BoxFuture<'a, HandlerResult> {
///         Box::pin(async move {
///             println!("{topic} {shop_domain} {} bytes", body.len());
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait WebhookHandler: Send + Sync {
    /// Handles one delivery. `topic` is the topic header as received and
    /// `body` the raw, already verified payload.
    fn handle<'a>(
        &'a self,
        topic: &'a str,
        shop_domain: &'a str,
        body: &'a [u8],
    ) -> BoxFuture<'a, HandlerResult>;
}

impl<F, Fut> WebhookHandler for F
where
    F: Fn(String, String, Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        topic: &'a str,
        shop_domain: &'a str,
        body: &'a [u8],
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(self(topic.to_string(), shop_domain.to_string(), body.to_vec()))
    }
}

/// A handler together with the path its deliveries are sent to.
///
/// For Http delivery the path is joined to the application host; for
/// EventBridge it is the ARN and for Pub/Sub the `pubsub://` address.
#[derive(Clone)]
pub struct HandlerEntry {
    path: String,
    handler: Arc<dyn WebhookHandler>,
}

impl HandlerEntry {
    /// Creates an entry.
    pub fn new(path: impl Into<String>, handler: impl WebhookHandler + 'static) -> Self {
        Self {
            path: path.into(),
            handler: Arc::new(handler),
        }
    }

    /// Creates an entry sharing an existing handler.
    pub fn from_arc(path: impl Into<String>, handler: Arc<dyn WebhookHandler>) -> Self {
        Self {
            path: path.into(),
            handler,
        }
    }

    /// Returns the delivery path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &dyn WebhookHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("path", &self.path)
            .field("handler", &"<handler>")
            .finish()
    }
}

/// Converts a topic to its GraphQL enum form.
///
/// Accepts `orders/create`, `orders_create` or `ORDERS_CREATE` and returns
/// `ORDERS_CREATE`.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidTopic`] if the result is empty or contains
/// anything other than ASCII letters, digits and underscores.
///
/// # Example
///
/// ```rust
/// use shopify_webhooks::webhooks::normalize_topic;
///
/// assert_eq!(normalize_topic("app/uninstalled").unwrap(), "APP_UNINSTALLED");
/// assert!(normalize_topic("orders create").is_err());
/// ```
pub fn normalize_topic(topic: &str) -> Result<String, WebhookError> {
    let normalized = topic.trim().to_ascii_uppercase().replace('/', "_");
    let valid = !normalized.is_empty()
        && normalized
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(normalized)
    } else {
        Err(WebhookError::InvalidTopic {
            topic: topic.to_string(),
        })
    }
}

/// Handlers keyed by normalized topic, at most one per topic.
///
/// The table is meant to be filled during startup and only read once
/// deliveries start arriving; share it behind an `Arc` once built.
#[derive(Clone, Default)]
pub struct HandlerTable {
    entries: BTreeMap<String, HandlerEntry>,
}

impl HandlerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` for `topic`, replacing any entry already there.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidTopic`] if the topic does not
    /// normalize; the table is left unchanged.
    pub fn add(&mut self, topic: &str, entry: HandlerEntry) -> Result<&mut Self, WebhookError> {
        let key = normalize_topic(topic)?;
        if self.entries.insert(key.clone(), entry).is_some() {
            tracing::debug!(topic = %key, "Replacing webhook handler");
        }
        Ok(self)
    }

    /// Adds every entry in order.
    ///
    /// Not atomic: entries added before a failing topic stay in the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`WebhookError::InvalidTopic`] encountered.
    pub fn add_many<I, T>(&mut self, entries: I) -> Result<&mut Self, WebhookError>
    where
        I: IntoIterator<Item = (T, HandlerEntry)>,
        T: AsRef<str>,
    {
        for (topic, entry) in entries {
            self.add(topic.as_ref(), entry)?;
        }
        Ok(self)
    }

    /// Returns the entry for `topic`, in any accepted spelling.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<&HandlerEntry> {
        normalize_topic(topic)
            .ok()
            .and_then(|key| self.entries.get(&key))
    }

    /// Returns the normalized topics, sorted.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns `(topic, entry)` pairs, sorted by topic.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HandlerEntry)> {
        self.entries.iter().map(|(topic, entry)| (topic.as_str(), entry))
    }

    /// Returns `true` if any entry is delivered to `path`.
    ///
    /// Lets an HTTP router tell webhook deliveries apart from ordinary
    /// routes.
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        self.entries.values().any(|entry| entry.path == path)
    }

    /// Returns the number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry. Intended for tests sharing one table.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

// Verify HandlerTable is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandlerTable>();
};
