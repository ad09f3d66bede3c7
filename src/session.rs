//! Per-connection session state machine
//!
//! A session alternates between the headline view and the feed selection
//! screen. Each iteration performs exactly one render/input round trip with
//! the [`ScreenTransport`], then decides the next state from the returned
//! [`CommandSignal`] and field values.
//!
//! | State            | Input                          | Next state        |
//! |------------------|--------------------------------|-------------------|
//! | ViewingHeadlines | Exit / Clear / Confirm + `q`   | Terminated        |
//! | ViewingHeadlines | Confirm                        | ViewingHeadlines  |
//! | ViewingHeadlines | SwitchFeed                     | SelectingFeed     |
//! | SelectingFeed    | Exit / Clear                   | ViewingHeadlines  |
//! | SelectingFeed    | Confirm with valid URL/choice  | ViewingHeadlines  |
//! | SelectingFeed    | Confirm with invalid choice    | SelectingFeed     |
//!
//! SwitchFeed with `q` typed still shows the selection screen; the session
//! ends once that screen is left. Transport failures end the session with an
//! error.

use crate::error::{Result, SelectionError};
use crate::fetcher::{HeadlineSource, headlines_or_diagnostic};
use crate::registry::FeedRegistry;
use crate::screen::{
    FIELD_CHOICE, FIELD_CMD, FIELD_FEED_URL, Screen, build_feed_selection_screen,
    build_headline_screen,
};
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Discrete user action returned with a screen's field values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSignal {
    /// Enter: refresh, or confirm a selection
    Confirm,
    /// PF4: open the feed selection screen
    SwitchFeed,
    /// PF3: leave the current screen
    Exit,
    /// Clear: same effect as [`CommandSignal::Exit`]
    Clear,
}

/// Result of one render/input round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Key the user pressed
    pub signal: CommandSignal,
    /// Writable field values keyed by field name
    pub values: HashMap<String, String>,
}

impl Exchange {
    /// Exchange with no field values
    pub fn new(signal: CommandSignal) -> Self {
        Self {
            signal,
            values: HashMap::new(),
        }
    }

    /// Add a field value
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Trimmed value of a field, empty if absent
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map_or("", |v| v.trim())
    }
}

/// Renders a screen and waits for the user's next action
pub trait ScreenTransport: Send {
    /// Show `screen` and return the key pressed plus the field values
    ///
    /// # Errors
    ///
    /// Any error is fatal to the session (e.g., the peer disconnected).
    fn exchange(&mut self, screen: &Screen) -> impl Future<Output = Result<Exchange>> + Send;
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Showing headlines of the current feed
    ViewingHeadlines,
    /// Showing the feed selection screen
    SelectingFeed,
    /// Session finished; the connection should be released
    Terminated,
}

/// Whether the command field holds the quit command
pub fn is_quit_command(exchange: &Exchange) -> bool {
    exchange.value(FIELD_CMD).eq_ignore_ascii_case("q")
}

/// Next state after a round trip on the headline screen
///
/// A quit typed together with SwitchFeed is deferred until the selection
/// screen is left; see [`Session::step`].
pub fn on_headlines(exchange: &Exchange) -> SessionState {
    match exchange.signal {
        CommandSignal::Exit | CommandSignal::Clear => SessionState::Terminated,
        CommandSignal::Confirm if is_quit_command(exchange) => SessionState::Terminated,
        CommandSignal::Confirm => SessionState::ViewingHeadlines,
        CommandSignal::SwitchFeed => SessionState::SelectingFeed,
    }
}

/// Apply a round trip on the selection screen to the registry
///
/// A typed URL wins over a numeric choice. With neither filled in, the
/// session returns to the headlines unchanged.
///
/// # Errors
///
/// Returns a [`SelectionError`] when the choice is not a number or names no
/// configured feed; the registry is left unchanged and the caller should
/// show the selection screen again with the error message.
pub fn on_selection(
    registry: &FeedRegistry,
    exchange: &Exchange,
) -> std::result::Result<SessionState, SelectionError> {
    match exchange.signal {
        CommandSignal::Exit | CommandSignal::Clear => Ok(SessionState::ViewingHeadlines),
        CommandSignal::Confirm | CommandSignal::SwitchFeed => {
            let url = exchange.value(FIELD_FEED_URL);
            if !url.is_empty() {
                registry.select_by_literal(url);
                return Ok(SessionState::ViewingHeadlines);
            }

            let choice = exchange.value(FIELD_CHOICE);
            if !choice.is_empty() {
                let index: usize = choice
                    .parse()
                    .map_err(|_| SelectionError::InvalidChoice(choice.to_string()))?;
                registry.select_by_index(index)?;
            }
            Ok(SessionState::ViewingHeadlines)
        }
    }
}

/// One client's interaction loop
pub struct Session<T, F> {
    transport: T,
    source: Arc<F>,
    registry: Arc<FeedRegistry>,
    max_headlines: usize,
    state: SessionState,
    selection_error: Option<String>,
    quit_after_selection: bool,
}

impl<T, F> Session<T, F>
where
    T: ScreenTransport,
    F: HeadlineSource,
{
    /// New session starting in [`SessionState::ViewingHeadlines`]
    pub fn new(
        transport: T,
        source: Arc<F>,
        registry: Arc<FeedRegistry>,
        max_headlines: usize,
    ) -> Self {
        Self {
            transport,
            source,
            registry,
            max_headlines,
            state: SessionState::ViewingHeadlines,
            selection_error: None,
            quit_after_selection: false,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Perform one round trip and move to the next state
    ///
    /// A quit command sent with SwitchFeed ends the session after the
    /// selection screen is left, with the new selection already applied.
    ///
    /// # Errors
    ///
    /// Returns the transport error; the session is then terminated.
    pub async fn step(&mut self) -> Result<SessionState> {
        let next = match self.state {
            SessionState::ViewingHeadlines => {
                let url = self.registry.current();
                let result = self.source.fetch(&url, self.max_headlines).await;
                if let Err(e) = &result {
                    warn!("Fetching {} failed: {}", url, e);
                }
                let headlines = headlines_or_diagnostic(result);

                let screen = build_headline_screen(&url, &headlines, Utc::now());
                let exchange = self.exchange(&screen).await?;
                self.quit_after_selection =
                    exchange.signal == CommandSignal::SwitchFeed && is_quit_command(&exchange);
                on_headlines(&exchange)
            }
            SessionState::SelectingFeed => {
                let screen = build_feed_selection_screen(
                    self.registry.feeds(),
                    self.selection_error.as_deref(),
                );
                let exchange = self.exchange(&screen).await?;
                match on_selection(&self.registry, &exchange) {
                    Ok(_) if self.quit_after_selection => {
                        self.selection_error = None;
                        SessionState::Terminated
                    }
                    Ok(next) => {
                        self.selection_error = None;
                        next
                    }
                    Err(e) => {
                        debug!("Rejected feed selection: {}", e);
                        self.selection_error = Some(e.to_string());
                        SessionState::SelectingFeed
                    }
                }
            }
            SessionState::Terminated => SessionState::Terminated,
        };

        if next != self.state {
            debug!("Session state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    async fn exchange(&mut self, screen: &Screen) -> Result<Exchange> {
        match self.transport.exchange(screen).await {
            Ok(exchange) => Ok(exchange),
            Err(e) => {
                self.state = SessionState::Terminated;
                Err(e)
            }
        }
    }

    /// Run until the user exits
    ///
    /// # Errors
    ///
    /// Returns the transport error that ended the session early.
    pub async fn run(mut self) -> Result<()> {
        while self.step().await? != SessionState::Terminated {}
        info!("Session ended by user");
        Ok(())
    }
}
