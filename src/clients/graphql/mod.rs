//! GraphQL Admin API client.
//!
//! [`GraphqlClient`] posts `{query, variables}` documents to
//! `/admin/api/<version>/graphql.json` through an
//! [`HttpClient`](crate::clients::HttpClient). Webhook subscriptions are
//! only managed through GraphQL.
//!
//! GraphQL-level failures (`errors`, `userErrors`) arrive with HTTP 200 and
//! are left in the response body for the caller to interpret; only
//! transport failures become a [`GraphqlError`].

mod client;
mod errors;

pub use client::GraphqlClient;
pub use errors::GraphqlError;
