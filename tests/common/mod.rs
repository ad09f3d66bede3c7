//! Scripted TN3270 terminal used by the integration tests
#![allow(dead_code)]

use rss3270::tn3270::{buffer_address, ebcdic_decode, ebcdic_encode_char, encode_address};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const IAC: u8 = 255;
pub const SB: u8 = 250;
pub const SE: u8 = 240;
pub const EOR: u8 = 239;
pub const WILL: u8 = 251;
pub const DO: u8 = 253;
pub const WONT: u8 = 252;

pub const AID_ENTER: u8 = 0x7D;
pub const AID_PF3: u8 = 0xF3;
pub const AID_PF4: u8 = 0xF4;
pub const AID_PF1: u8 = 0xF1;
pub const AID_CLEAR: u8 = 0x6D;

/// Every reply a cooperative terminal sends during negotiation
///
/// The server asks in a fixed order, so the whole answer can be written up
/// front.
pub fn negotiation_replies(terminal_type: &str) -> Vec<u8> {
    let mut out = vec![IAC, WILL, 24, IAC, SB, 24, 0];
    out.extend_from_slice(terminal_type.as_bytes());
    out.extend_from_slice(&[IAC, SE]);
    out.extend_from_slice(&[IAC, WILL, 25, IAC, DO, 25, IAC, WILL, 0, IAC, DO, 0]);
    out
}

/// Client half of a TN3270 connection
pub struct Terminal<S> {
    stream: S,
}

impl<S> Terminal<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub async fn answer_negotiation(&mut self) {
        self.stream
            .write_all(&negotiation_replies("IBM-3278-2-E"))
            .await
            .unwrap();
    }

    /// Next 3270 record, skipping telnet commands in between
    pub async fn read_record(&mut self) -> Vec<u8> {
        let mut record = Vec::new();
        loop {
            let b = self.stream.read_u8().await.unwrap();
            if b != IAC {
                record.push(b);
                continue;
            }
            match self.stream.read_u8().await.unwrap() {
                IAC => record.push(IAC),
                EOR => return record,
                SB => loop {
                    if self.stream.read_u8().await.unwrap() == IAC
                        && self.stream.read_u8().await.unwrap() == SE
                    {
                        break;
                    }
                },
                _ => {
                    self.stream.read_u8().await.unwrap();
                }
            }
        }
    }

    /// Send an AID with modified fields given as `(row, col, text)` of their
    /// first data cell
    pub async fn send(&mut self, aid: u8, cursor: (usize, usize), fields: &[(usize, usize, &str)]) {
        let mut record = vec![aid];
        record.extend_from_slice(&encode_address(buffer_address(cursor.0, cursor.1)));
        for (row, col, text) in fields {
            record.push(0x11);
            record.extend_from_slice(&encode_address(buffer_address(*row, *col)));
            record.extend(text.chars().map(ebcdic_encode_char));
        }
        self.send_raw_record(&record).await;
    }

    pub async fn send_raw_record(&mut self, record: &[u8]) {
        let mut out = Vec::with_capacity(record.len() + 2);
        for &b in record {
            out.push(b);
            if b == IAC {
                out.push(IAC);
            }
        }
        out.extend_from_slice(&[IAC, EOR]);
        self.stream.write_all(&out).await.unwrap();
    }

    pub async fn write_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Text of an outbound Erase/Write record with orders and attributes blanked
pub fn screen_text(record: &[u8]) -> String {
    let mut text = Vec::new();
    let mut i = 2;
    while i < record.len() {
        let order_len = match record[i] {
            0x11 => 3,
            0x1D => 2,
            0x29 => 2 + 2 * record[i + 1] as usize,
            0x13 => 1,
            b => {
                text.push(b);
                i += 1;
                continue;
            }
        };
        text.push(0x40);
        i += order_len;
    }
    ebcdic_decode(&text)
}
