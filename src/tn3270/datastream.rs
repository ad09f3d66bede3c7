//! 3270 data stream encoding (outbound) and read parsing (inbound)

use super::ebcdic;
use crate::error::{GatewayError, Result};
use crate::screen::{COLS, Color, Field, Highlight, ROWS, Screen};
use std::collections::HashMap;

/// Erase/Write command
pub const CMD_ERASE_WRITE: u8 = 0xF5;

/// Write control character: reset, restore keyboard, reset modified flags
pub const WCC_RESET_RESTORE: u8 = 0xC3;

/// Set Buffer Address order
pub const ORDER_SBA: u8 = 0x11;
/// Start Field order
pub const ORDER_SF: u8 = 0x1D;
/// Start Field Extended order
pub const ORDER_SFE: u8 = 0x29;
/// Insert Cursor order
pub const ORDER_IC: u8 = 0x13;

const XA_BASIC: u8 = 0xC0;
const XA_HIGHLIGHTING: u8 = 0x41;
const XA_COLOR: u8 = 0x42;

const ATTR_PROTECTED: u8 = 1 << 5;
const ATTR_NUMERIC: u8 = 1 << 4;
const ATTR_INTENSIFIED: u8 = 1 << 3;

/// Total cells on the 24x80 grid
pub const BUFFER_SIZE: usize = ROWS * COLS;

/// 6-bit values as 3270 graphic codes, used for addresses and attributes
const CODES: [u8; 64] = [
    0x40, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F,
    0x50, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0x5A, 0x5B, 0x5C, 0x5D, 0x5E, 0x5F,
    0x60, 0x61, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0x6A, 0x6B, 0x6C, 0x6D, 0x6E, 0x6F,
    0xF0, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0x7A, 0x7B, 0x7C, 0x7D, 0x7E, 0x7F,
];

/// Attention identifier: the key that sent the inbound record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aid {
    /// No AID generated (e.g., read buffer response)
    NoAid,
    /// Enter key
    Enter,
    /// Program function key 1..=24
    Pf(u8),
    /// Program attention key 1..=3
    Pa(u8),
    /// Clear key
    Clear,
}

impl Aid {
    /// Parse an AID byte
    pub fn from_byte(b: u8) -> Option<Self> {
        let aid = match b {
            0x60 => Aid::NoAid,
            0x7D => Aid::Enter,
            0x6D => Aid::Clear,
            0x6C => Aid::Pa(1),
            0x6E => Aid::Pa(2),
            0x6B => Aid::Pa(3),
            0xF1..=0xF9 => Aid::Pf(b - 0xF0),
            0x7A..=0x7C => Aid::Pf(b - 0x7A + 10),
            0xC1..=0xC9 => Aid::Pf(b - 0xC1 + 13),
            0x4A..=0x4C => Aid::Pf(b - 0x4A + 22),
            _ => return None,
        };
        Some(aid)
    }

    /// Wire value of this AID
    pub fn to_byte(self) -> u8 {
        match self {
            Aid::NoAid => 0x60,
            Aid::Enter => 0x7D,
            Aid::Clear => 0x6D,
            Aid::Pa(1) => 0x6C,
            Aid::Pa(2) => 0x6E,
            Aid::Pa(_) => 0x6B,
            Aid::Pf(n @ 1..=9) => 0xF0 + n,
            Aid::Pf(n @ 10..=12) => 0x7A + n - 10,
            Aid::Pf(n @ 13..=21) => 0xC1 + n - 13,
            Aid::Pf(n) => 0x4A + n.clamp(22, 24) - 22,
        }
    }

    /// Keys that send only the AID byte, without cursor or field data
    pub fn is_short_read(self) -> bool {
        matches!(self, Aid::Clear | Aid::Pa(_))
    }
}

/// Decoded inbound record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Key that was pressed
    pub aid: Aid,
    /// Cursor position as (row, col)
    pub cursor: (usize, usize),
    /// Writable named field values; unmodified fields keep their original content
    pub values: HashMap<String, String>,
}

/// Buffer address of a grid position, wrapping past the last cell
pub fn buffer_address(row: usize, col: usize) -> usize {
    (row * COLS + col) % BUFFER_SIZE
}

/// Encode a buffer address in 12-bit form
pub fn encode_address(addr: usize) -> [u8; 2] {
    let addr = addr % BUFFER_SIZE;
    [CODES[(addr >> 6) & 0x3F], CODES[addr & 0x3F]]
}

/// Decode a 12-bit or 14-bit buffer address
pub fn decode_address(hi: u8, lo: u8) -> usize {
    if hi & 0xC0 == 0 {
        // 14-bit binary form
        ((hi as usize & 0x3F) << 8) | lo as usize
    } else {
        ((hi as usize & 0x3F) << 6) | (lo as usize & 0x3F)
    }
}

fn field_attribute(field: &Field) -> u8 {
    let mut attr = 0u8;
    if !field.writable {
        attr |= ATTR_PROTECTED;
    } else if field.numeric {
        attr |= ATTR_NUMERIC;
    }
    if field.intense {
        attr |= ATTR_INTENSIFIED;
    }
    if field.autoskip {
        attr |= ATTR_PROTECTED | ATTR_NUMERIC;
    }
    CODES[attr as usize]
}

fn color_code(color: Color) -> u8 {
    match color {
        Color::Default => 0x00,
        Color::Blue => 0xF1,
        Color::Red => 0xF2,
        Color::Pink => 0xF3,
        Color::Green => 0xF4,
        Color::Turquoise => 0xF5,
        Color::Yellow => 0xF6,
        Color::White => 0xF7,
    }
}

fn highlight_code(highlight: Highlight) -> u8 {
    match highlight {
        Highlight::Default => 0x00,
        Highlight::Blink => 0xF1,
        Highlight::Reverse => 0xF2,
        Highlight::Underscore => 0xF4,
    }
}

/// Encode a screen as an Erase/Write data stream
pub fn encode_screen(screen: &Screen) -> Vec<u8> {
    let mut out = Vec::with_capacity(BUFFER_SIZE + screen.fields().len() * 8);
    out.push(CMD_ERASE_WRITE);
    out.push(WCC_RESET_RESTORE);

    for field in screen.fields() {
        out.push(ORDER_SBA);
        out.extend_from_slice(&encode_address(buffer_address(field.row, field.col)));

        let attr = field_attribute(field);
        if field.color != Color::Default || field.highlight != Highlight::Default {
            let mut pairs = vec![(XA_BASIC, attr)];
            if field.color != Color::Default {
                pairs.push((XA_COLOR, color_code(field.color)));
            }
            if field.highlight != Highlight::Default {
                pairs.push((XA_HIGHLIGHTING, highlight_code(field.highlight)));
            }
            out.push(ORDER_SFE);
            out.push(pairs.len() as u8);
            for (kind, value) in pairs {
                out.push(kind);
                out.push(value);
            }
        } else {
            out.push(ORDER_SF);
            out.push(attr);
        }

        ebcdic::encode_into(&field.content, &mut out);
    }

    let (row, col) = screen.cursor();
    out.push(ORDER_SBA);
    out.extend_from_slice(&encode_address(buffer_address(row, col)));
    out.push(ORDER_IC);
    out
}

/// Parse an inbound read record against the screen that produced it
///
/// Each `SBA addr data` group is matched to the writable named field whose
/// first data cell is `addr`; groups for unknown addresses are ignored.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidStream`] for an empty record, an unknown
/// AID, or a truncated address.
pub fn parse_response(record: &[u8], screen: &Screen) -> Result<Response> {
    let (&aid_byte, rest) = record
        .split_first()
        .ok_or_else(|| GatewayError::InvalidStream("empty inbound record".to_string()))?;
    let aid = Aid::from_byte(aid_byte)
        .ok_or_else(|| GatewayError::InvalidStream(format!("unknown AID {:#04x}", aid_byte)))?;

    let mut by_address: HashMap<usize, &str> = HashMap::new();
    let mut values = HashMap::new();
    for field in screen.fields().iter().filter(|f| f.writable) {
        if let Some(name) = field.name.as_deref() {
            by_address.insert(buffer_address(field.row, field.col + 1), name);
            values.insert(name.to_string(), field.content.clone());
        }
    }

    if aid.is_short_read() || rest.len() < 2 {
        return Ok(Response {
            aid,
            cursor: screen.cursor(),
            values,
        });
    }

    let cursor_addr = decode_address(rest[0], rest[1]);
    let cursor = (cursor_addr / COLS, cursor_addr % COLS);

    let mut i = 2;
    while i < rest.len() {
        if rest[i] != ORDER_SBA {
            return Err(GatewayError::InvalidStream(format!(
                "expected SBA at offset {}, got {:#04x}",
                i + 1,
                rest[i]
            )));
        }
        if i + 2 >= rest.len() {
            return Err(GatewayError::InvalidStream(
                "truncated buffer address".to_string(),
            ));
        }
        let addr = decode_address(rest[i + 1], rest[i + 2]);
        i += 3;

        let start = i;
        while i < rest.len() && rest[i] != ORDER_SBA {
            i += 1;
        }
        if let Some(name) = by_address.get(&addr) {
            values.insert(name.to_string(), ebcdic::decode(&rest[start..i]));
        }
    }

    Ok(Response {
        aid,
        cursor,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenBuilder;

    fn input_screen() -> Screen {
        let mut builder = ScreenBuilder::new();
        builder
            .push(Field::text(0, 0, "Title").intense())
            .push(Field::input(22, 69, "cmd"))
            .push(Field::text(23, 0, "Error").color(Color::Red))
            .cursor(22, 70);
        builder.build()
    }

    #[test]
    fn test_address_round_trip_whole_grid() {
        for addr in 0..BUFFER_SIZE {
            let [hi, lo] = encode_address(addr);
            assert_eq!(decode_address(hi, lo), addr);
        }
    }

    #[test]
    fn test_known_addresses() {
        assert_eq!(encode_address(0), [0x40, 0x40]);
        assert_eq!(encode_address(buffer_address(22, 70)), [0x5C, 0xE6]);
        assert_eq!(decode_address(0x07, 0x80), 0x780);
    }

    #[test]
    fn test_aid_byte_round_trip() {
        let mut aids = vec![Aid::NoAid, Aid::Enter, Aid::Clear, Aid::Pa(1), Aid::Pa(2), Aid::Pa(3)];
        aids.extend((1..=24).map(Aid::Pf));
        for aid in aids {
            assert_eq!(Aid::from_byte(aid.to_byte()), Some(aid));
        }
        assert_eq!(Aid::from_byte(0xF3), Some(Aid::Pf(3)));
        assert_eq!(Aid::from_byte(0xF4), Some(Aid::Pf(4)));
        assert_eq!(Aid::from_byte(0x00), None);
    }

    #[test]
    fn test_field_attributes() {
        assert_eq!(field_attribute(&Field::text(0, 0, "x")), CODES[0x20]);
        assert_eq!(field_attribute(&Field::text(0, 0, "x").intense()), CODES[0x28]);
        assert_eq!(field_attribute(&Field::input(0, 0, "a")), CODES[0x00]);
        assert_eq!(field_attribute(&Field::input(0, 0, "a").numeric()), CODES[0x10]);
        assert_eq!(field_attribute(&Field::stop(0, 79)), CODES[0x30]);
    }

    #[test]
    fn test_encode_screen_layout() {
        let data = encode_screen(&input_screen());
        assert_eq!(&data[..2], &[CMD_ERASE_WRITE, WCC_RESET_RESTORE]);

        // First field: SBA(0,0) SF attr "Title"
        assert_eq!(&data[2..5], &[ORDER_SBA, 0x40, 0x40]);
        assert_eq!(data[5], ORDER_SF);
        assert_eq!(data[6], CODES[0x28]);
        assert_eq!(&data[7..12], &[0xE3, 0x89, 0xA3, 0x93, 0x85]);

        // Colored field uses SFE with basic + color pairs
        let sfe = data.iter().position(|&b| b == ORDER_SFE).unwrap();
        assert_eq!(&data[sfe + 1..sfe + 6], &[2, XA_BASIC, CODES[0x20], XA_COLOR, 0xF2]);

        // Ends with cursor placement
        assert_eq!(&data[data.len() - 4..], &[ORDER_SBA, 0x5C, 0xE6, ORDER_IC]);
    }

    #[test]
    fn test_parse_enter_with_field_data() {
        let screen = input_screen();
        let [c1, c2] = encode_address(buffer_address(22, 71));
        let [f1, f2] = encode_address(buffer_address(22, 70));
        let record = [0x7D, c1, c2, ORDER_SBA, f1, f2, 0x98];

        let response = parse_response(&record, &screen).unwrap();
        assert_eq!(response.aid, Aid::Enter);
        assert_eq!(response.cursor, (22, 71));
        assert_eq!(response.values.get("cmd").map(String::as_str), Some("q"));
    }

    #[test]
    fn test_parse_short_read_keeps_original_values() {
        let response = parse_response(&[0x6D], &input_screen()).unwrap();
        assert_eq!(response.aid, Aid::Clear);
        assert_eq!(response.values.get("cmd").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_ignores_unknown_address() {
        let [f1, f2] = encode_address(buffer_address(5, 5));
        let record = [0x7D, 0x40, 0x40, ORDER_SBA, f1, f2, 0xC1];
        let response = parse_response(&record, &input_screen()).unwrap();
        assert_eq!(response.values.get("cmd").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response(&[], &input_screen()).is_err());
        assert!(parse_response(&[0x01], &input_screen()).is_err());
        assert!(parse_response(&[0x7D, 0x40, 0x40, 0xC1], &input_screen()).is_err());
        assert!(parse_response(&[0x7D, 0x40, 0x40, ORDER_SBA, 0x40], &input_screen()).is_err());
    }
}
