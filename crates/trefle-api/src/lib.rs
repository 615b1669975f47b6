//! Rust client for the Trefle botanical reference API
//!
//! This crate provides typed, retrying, paginated access to the Trefle
//! plant-data service: taxonomy browsing, species lookup, full-text
//! search, corrections and error reporting. Response bodies are treated
//! as opaque JSON; the client's job is request orchestration: endpoint
//! dispatch, URL and query construction, retry, a one-entry response
//! cache keyed on the exact parametrized URL, and link-based pagination.
//!
//! # Example
//!
//! ```no_run
//! use trefle_api::TrefleClient;
//!
//! # async fn example() -> Result<(), trefle_api::TrefleError> {
//! let mut client = TrefleClient::new("your-token").with_page_size(20);
//!
//! // List species
//! let species = client.species(None, &[]).await?;
//! println!("{}", species);
//!
//! // Look one up by primary key
//! let tomato = client.species(Some(182512.into()), &[]).await?;
//!
//! // Search, then walk to the next page if the response linked one
//! let results = client.search("tomato", None, &[]).await?;
//! if let Some(page) = client.next(&[]).await? {
//!     println!("{}", page);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API coverage
//!
//! Taxonomy endpoints, each addressable as a whole collection or a
//! single record by primary key or slug:
//!
//! - `kingdoms`, `subkingdoms`, `divisions`, `division_classes`,
//!   `division_orders`, `families`, `genus`, `plants`, `species`,
//!   `distributions`
//!
//! Special operations:
//!
//! - `GET <what>/search` - full-text search over plants or species
//! - `POST <what>/<id>/report` - report a data problem on a record
//! - `GET <modifier>/<id>/plants` - plants in a distribution or genus
//! - `GET corrections[/<id>]` and `POST corrections/species/<id>`
//! - `POST /api/auth/claim` - claim a browser-scoped JWT
//!
//! Navigation: `next`, `prev`, `first` and `last` follow the pagination
//! links of the most recently fetched page; a missing link yields
//! `Ok(None)` rather than an error.
//!
//! The client keeps at most one cached response (the most recent) and is
//! not internally synchronized; use one client per concurrent caller.

mod client;
mod endpoint;
mod error;
mod types;

pub use client::TrefleClient;
pub use endpoint::{Endpoint, Identifier, Method, Relation};
pub use error::{Result, TrefleError};
pub use types::Page;
