//! Feed source registry shared by all sessions
//!
//! The registry holds the configured feed URLs in configuration order and a
//! single process-wide "current feed" selection. Every session reads the
//! selection on refresh and may replace it from the feed selection screen,
//! so a change made in one session becomes visible to all others on their
//! next refresh.
//!
//! The selection lives behind one mutex; readers clone the URL under the
//! lock and writers replace it under the lock, so no reader can observe a
//! partially updated value.

use crate::error::{ConfigError, SelectionError};
use std::sync::Mutex;
use tracing::debug;

/// Current selection: a configured position or an ad-hoc URL
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    Index(usize),
    Literal(String),
}

/// Ordered feed list plus the shared current-feed pointer
#[derive(Debug)]
pub struct FeedRegistry {
    feeds: Vec<String>,
    selection: Mutex<Selection>,
}

impl FeedRegistry {
    /// Create a registry with the first feed selected
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRegistry`] if `feeds` is empty.
    pub fn new(feeds: Vec<String>) -> Result<Self, ConfigError> {
        if feeds.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }
        Ok(Self {
            feeds,
            selection: Mutex::new(Selection::Index(0)),
        })
    }

    /// Configured feeds in configuration order
    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    /// Number of configured feeds
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Always false; construction rejects an empty list
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// URL of the currently selected feed
    pub fn current(&self) -> String {
        let selection = self.selection.lock().unwrap_or_else(|e| e.into_inner());
        match &*selection {
            Selection::Index(i) => self.feeds[*i].clone(),
            Selection::Literal(url) => url.clone(),
        }
    }

    /// Select a configured feed by its 0-based position
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::IndexOutOfRange`] and leaves the selection
    /// unchanged if `index` does not name a configured feed.
    pub fn select_by_index(&self, index: usize) -> Result<String, SelectionError> {
        let url = self
            .feeds
            .get(index)
            .ok_or(SelectionError::IndexOutOfRange {
                index,
                len: self.feeds.len(),
            })?;

        *self.selection.lock().unwrap_or_else(|e| e.into_inner()) = Selection::Index(index);
        debug!("Selected feed #{}: {}", index, url);
        Ok(url.clone())
    }

    /// Make an arbitrary URL current without adding it to the feed list
    pub fn select_by_literal(&self, url: impl Into<String>) -> String {
        let url = url.into();
        *self.selection.lock().unwrap_or_else(|e| e.into_inner()) =
            Selection::Literal(url.clone());
        debug!("Selected literal feed: {}", url);
        url
    }
}
