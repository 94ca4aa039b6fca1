//! Core library for proxycache: line-buffered I/O, URI parsing, header
//! rewriting, the concurrent LRU object cache, the request pipeline, the
//! acceptor, and the error responder. Used by the thin CLI binary in
//! `src/main.rs`; reusable by anything else that wants to embed the proxy.

pub mod cache;
pub mod config;
pub mod error_handling;
pub mod headers;
pub mod pipeline;
pub mod response;
pub mod server;
pub mod stream;
pub mod uri;
pub mod utils;

pub use cache::{Cache, CacheStats, ReadSession};
pub use config::Config;
pub use error_handling::ProxyError;
pub use server::serve;
pub use uri::{fingerprint, parse_uri, ParsedUri};
