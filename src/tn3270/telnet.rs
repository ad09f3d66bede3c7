//! Telnet layer for TN3270: option negotiation and record framing
//!
//! 3270 data travels as telnet records in binary mode, each terminated by
//! `IAC EOR`. A literal 0xFF inside a record is doubled on the wire.

use super::datastream::BUFFER_SIZE;
use crate::error::{GatewayError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace};

pub(super) const IAC: u8 = 255;
pub(super) const DONT: u8 = 254;
pub(super) const DO: u8 = 253;
pub(super) const WONT: u8 = 252;
pub(super) const WILL: u8 = 251;
pub(super) const SB: u8 = 250;
pub(super) const SE: u8 = 240;
pub(super) const EOR: u8 = 239;

pub(super) const OPT_BINARY: u8 = 0;
pub(super) const OPT_TERMINAL_TYPE: u8 = 24;
pub(super) const OPT_EOR: u8 = 25;

pub(super) const TT_IS: u8 = 0;
pub(super) const TT_SEND: u8 = 1;

/// Largest inbound record accepted: a full read of every cell with room
/// for SBA orders, plus the AID and cursor
pub(super) const MAX_RECORD_LEN: usize = 4 * BUFFER_SIZE + 64;

/// Largest subnegotiation payload accepted (terminal type names are short)
pub(super) const MAX_SUBNEGOTIATION_LEN: usize = 256;

/// One unit read from the telnet stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TelnetEvent {
    Data(u8),
    Will(u8),
    Wont(u8),
    Do(u8),
    Dont(u8),
    Subnegotiation(u8, Vec<u8>),
    EndOfRecord,
    Command(u8),
}

/// Telnet connection wrapping a byte stream
pub(super) struct Telnet<S> {
    stream: BufReader<S>,
}

impl<S> Telnet<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(super) fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    async fn next_byte(&mut self) -> Result<u8> {
        match self.stream.read_u8().await {
            Ok(b) => Ok(b),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(GatewayError::ConnectionClosed)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the next data byte or telnet command
    pub(super) async fn read_event(&mut self) -> Result<TelnetEvent> {
        let b = self.next_byte().await?;
        if b != IAC {
            return Ok(TelnetEvent::Data(b));
        }

        let event = match self.next_byte().await? {
            IAC => TelnetEvent::Data(IAC),
            WILL => TelnetEvent::Will(self.next_byte().await?),
            WONT => TelnetEvent::Wont(self.next_byte().await?),
            DO => TelnetEvent::Do(self.next_byte().await?),
            DONT => TelnetEvent::Dont(self.next_byte().await?),
            SB => {
                let option = self.next_byte().await?;
                let mut payload = Vec::new();
                loop {
                    let b = self.next_byte().await?;
                    if b == IAC {
                        match self.next_byte().await? {
                            SE => break,
                            other => payload.push(other),
                        }
                    } else {
                        payload.push(b);
                    }
                    if payload.len() > MAX_SUBNEGOTIATION_LEN {
                        return Err(GatewayError::Negotiation(format!(
                            "subnegotiation for option {} exceeds {} bytes",
                            option, MAX_SUBNEGOTIATION_LEN
                        )));
                    }
                }
                TelnetEvent::Subnegotiation(option, payload)
            }
            EOR => TelnetEvent::EndOfRecord,
            other => TelnetEvent::Command(other),
        };
        trace!("Telnet event: {:?}", event);
        Ok(event)
    }

    /// Write raw bytes (already telnet-encoded)
    pub(super) async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.get_mut().write_all(bytes).await?;
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Send one record, doubling IAC bytes and appending `IAC EOR`
    pub(super) async fn send_record(&mut self, data: &[u8]) -> Result<()> {
        let mut framed = Vec::with_capacity(data.len() + 16);
        for &b in data {
            framed.push(b);
            if b == IAC {
                framed.push(IAC);
            }
        }
        framed.extend_from_slice(&[IAC, EOR]);
        trace!("Sending record of {} bytes", data.len());
        self.send_raw(&framed).await
    }

    /// Read one record, skipping any telnet commands inside it
    pub(super) async fn read_record(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(256);
        loop {
            match self.read_event().await? {
                TelnetEvent::Data(b) => {
                    if data.len() == MAX_RECORD_LEN {
                        return Err(GatewayError::InvalidStream(format!(
                            "inbound record exceeds {} bytes",
                            MAX_RECORD_LEN
                        )));
                    }
                    data.push(b);
                }
                TelnetEvent::EndOfRecord => return Ok(data),
                other => debug!("Ignoring telnet event inside record: {:?}", other),
            }
        }
    }

    /// Wait until every `(verb, option)` pair in `wanted` has been received
    ///
    /// A refusal (WONT/DONT) of a wanted option fails negotiation.
    async fn await_options(&mut self, wanted: &[(u8, u8)]) -> Result<()> {
        let mut pending: Vec<(u8, u8)> = wanted.to_vec();
        while !pending.is_empty() {
            let (verb, option) = match self.read_event().await? {
                TelnetEvent::Will(o) => (WILL, o),
                TelnetEvent::Do(o) => (DO, o),
                TelnetEvent::Wont(o) | TelnetEvent::Dont(o) => {
                    if pending.iter().any(|&(_, want)| want == o) {
                        return Err(GatewayError::Negotiation(format!(
                            "client refused option {}",
                            o
                        )));
                    }
                    continue;
                }
                other => {
                    debug!("Ignoring during negotiation: {:?}", other);
                    continue;
                }
            };
            pending.retain(|&p| p != (verb, option));
        }
        Ok(())
    }

    /// Negotiate terminal type, end-of-record and binary modes
    ///
    /// Returns the terminal type reported by the client (e.g., "IBM-3278-2").
    pub(super) async fn negotiate(&mut self) -> Result<String> {
        self.send_raw(&[IAC, DO, OPT_TERMINAL_TYPE]).await?;
        self.await_options(&[(WILL, OPT_TERMINAL_TYPE)]).await?;

        self.send_raw(&[IAC, SB, OPT_TERMINAL_TYPE, TT_SEND, IAC, SE])
            .await?;
        let terminal_type = loop {
            match self.read_event().await? {
                TelnetEvent::Subnegotiation(OPT_TERMINAL_TYPE, payload)
                    if payload.first() == Some(&TT_IS) =>
                {
                    break String::from_utf8_lossy(&payload[1..]).to_string();
                }
                other => debug!("Waiting for terminal type, got {:?}", other),
            }
        };
        debug!("Client terminal type: {}", terminal_type);

        self.send_raw(&[
            IAC, DO, OPT_EOR, IAC, WILL, OPT_EOR, IAC, DO, OPT_BINARY, IAC, WILL, OPT_BINARY,
        ])
        .await?;
        self.await_options(&[
            (WILL, OPT_EOR),
            (DO, OPT_EOR),
            (WILL, OPT_BINARY),
            (DO, OPT_BINARY),
        ])
        .await?;

        Ok(terminal_type)
    }
}
