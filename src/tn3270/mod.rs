//! Minimal TN3270 screen transport
//!
//! Supports plain TN3270 (no TN3270E) on a 24x80 model 2 screen:
//! - [`telnet`]: option negotiation and `IAC EOR` record framing
//! - [`ebcdic`]: CP037 codepage
//! - [`datastream`]: Erase/Write encoding and inbound read parsing

mod datastream;
mod ebcdic;
mod telnet;

pub use datastream::{
    Aid, Response, buffer_address, decode_address, encode_address, encode_screen, parse_response,
};
pub use ebcdic::{decode as ebcdic_decode, encode_char as ebcdic_encode_char};

use crate::error::{GatewayError, Result};
use crate::screen::Screen;
use crate::session::{CommandSignal, Exchange, ScreenTransport};
use std::time::Duration;
use telnet::Telnet;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, trace};

/// Keys that return input to the session
const ACCEPT_KEYS: [Aid; 2] = [Aid::Enter, Aid::Pf(4)];
/// Keys that leave the current screen
const EXIT_KEYS: [Aid; 2] = [Aid::Pf(3), Aid::Clear];

/// A negotiated TN3270 connection
pub struct Tn3270Session<S> {
    telnet: Telnet<S>,
    terminal_type: String,
}

impl<S> Tn3270Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Negotiate TN3270 on a freshly accepted stream
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Negotiation`] if the client refuses a required
    /// option or does not finish within `budget`, and I/O errors as usual.
    pub async fn negotiate(stream: S, budget: Duration) -> Result<Self> {
        let mut telnet = Telnet::new(stream);
        let terminal_type = timeout(budget, telnet.negotiate())
            .await
            .map_err(|_| GatewayError::Negotiation("timed out".to_string()))??;

        debug!("TN3270 negotiated, terminal type {}", terminal_type);
        Ok(Self {
            telnet,
            terminal_type,
        })
    }

    /// Terminal type reported by the client
    pub fn terminal_type(&self) -> &str {
        &self.terminal_type
    }

    /// Send a screen
    pub async fn show(&mut self, screen: &Screen) -> Result<()> {
        let data = encode_screen(screen);
        self.telnet.send_record(&data).await
    }

    /// Read the next inbound record, interpreted against `screen`
    pub async fn read_response(&mut self, screen: &Screen) -> Result<Response> {
        let record = self.telnet.read_record().await?;
        trace!("Inbound record: {} bytes", record.len());
        parse_response(&record, screen)
    }

    /// Show `screen` until the user presses an accepted or exit key
    ///
    /// Other keys redisplay the same screen; a Clear or PA key would
    /// otherwise leave the terminal blank.
    pub async fn handle_screen(
        &mut self,
        screen: &Screen,
        accept: &[Aid],
        exit: &[Aid],
    ) -> Result<Response> {
        loop {
            self.show(screen).await?;
            let response = self.read_response(screen).await?;
            if accept.contains(&response.aid) || exit.contains(&response.aid) {
                return Ok(response);
            }
            debug!("Ignoring key {:?}", response.aid);
        }
    }
}

impl<S> ScreenTransport for Tn3270Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn exchange(&mut self, screen: &Screen) -> Result<Exchange> {
        let response = self.handle_screen(screen, &ACCEPT_KEYS, &EXIT_KEYS).await?;
        let signal = match response.aid {
            Aid::Enter => CommandSignal::Confirm,
            Aid::Pf(4) => CommandSignal::SwitchFeed,
            Aid::Pf(3) => CommandSignal::Exit,
            Aid::Clear => CommandSignal::Clear,
            other => {
                return Err(GatewayError::InvalidStream(format!(
                    "unexpected key {:?}",
                    other
                )));
            }
        };
        Ok(Exchange {
            signal,
            values: response.values,
        })
    }
}
