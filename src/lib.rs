#![doc = include_str!("../README.md")]

mod config;
mod error;
/// RSS headline retrieval and decoding
pub mod fetcher;
/// Shared feed list and current selection
pub mod registry;
/// Screen model and screen layouts
pub mod screen;
/// TCP listener and per-connection dispatch
pub mod server;
/// Per-connection interaction state machine
pub mod session;
/// TN3270 telnet negotiation and 3270 data stream
pub mod tn3270;
/// Fixed character transliteration for feed titles
pub mod transliterate;
/// Fixed-width line wrapping
pub mod wrap;

pub use config::{
    DEFAULT_FEED_FILE, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_HEADLINES, DEFAULT_NEGOTIATION_TIMEOUT,
    DEFAULT_PORT, GatewayConfig, load_feed_urls, parse_feed_urls,
};
pub use error::{ConfigError, FetchError, GatewayError, Result, SelectionError};
pub use fetcher::{HeadlineSource, HttpFetcher, NO_HEADLINES};
pub use registry::FeedRegistry;
pub use screen::{Field, Screen, ScreenBuilder};
pub use server::Gateway;
pub use session::{CommandSignal, Exchange, ScreenTransport, Session, SessionState};
pub use tn3270::{Aid, Tn3270Session};
