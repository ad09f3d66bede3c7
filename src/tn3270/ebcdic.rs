//! CP037 (US/Canada EBCDIC) codepage
//!
//! Only the graphic range 0x40..=0xFF is mapped; control codes decode to a
//! space except NUL, which callers strip before decoding.

/// EBCDIC substitute for characters with no CP037 mapping ('?')
pub const SUBSTITUTE: u8 = 0x6F;

/// Characters for EBCDIC 0x40..=0xFF
const GRAPHICS: [char; 192] = [
    // 0x40
    ' ', '\u{A0}', 'â', 'ä', 'à', 'á', 'ã', 'å', 'ç', 'ñ', '¢', '.', '<', '(', '+', '|',
    // 0x50
    '&', 'é', 'ê', 'ë', 'è', 'í', 'î', 'ï', 'ì', 'ß', '!', '$', '*', ')', ';', '¬',
    // 0x60
    '-', '/', 'Â', 'Ä', 'À', 'Á', 'Ã', 'Å', 'Ç', 'Ñ', '¦', ',', '%', '_', '>', '?',
    // 0x70
    'ø', 'É', 'Ê', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', '`', ':', '#', '@', '\'', '=', '"',
    // 0x80
    'Ø', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', '«', '»', 'ð', 'ý', 'þ', '±',
    // 0x90
    '°', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 'ª', 'º', 'æ', '¸', 'Æ', '¤',
    // 0xA0
    'µ', '~', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '¡', '¿', 'Ð', 'Ý', 'Þ', '®',
    // 0xB0
    '^', '£', '¥', '·', '©', '§', '¶', '¼', '½', '¾', '[', ']', '¯', '¨', '´', '×',
    // 0xC0
    '{', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', '\u{AD}', 'ô', 'ö', 'ò', 'ó', 'õ',
    // 0xD0
    '}', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', '¹', 'û', 'ü', 'ù', 'ú', 'ÿ',
    // 0xE0
    '\\', '÷', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '²', 'Ô', 'Ö', 'Ò', 'Ó', 'Õ',
    // 0xF0
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '³', 'Û', 'Ü', 'Ù', 'Ú', '\u{9F}',
];

/// Encode one character, substituting '?' when unmappable
pub fn encode_char(c: char) -> u8 {
    GRAPHICS
        .iter()
        .position(|&g| g == c)
        .map_or(SUBSTITUTE, |i| 0x40 + i as u8)
}

/// Decode one EBCDIC byte
pub fn decode_byte(b: u8) -> char {
    if b < 0x40 {
        ' '
    } else {
        GRAPHICS[(b - 0x40) as usize]
    }
}

/// Encode a string into `out`
pub fn encode_into(s: &str, out: &mut Vec<u8>) {
    out.extend(s.chars().map(encode_char));
}

/// Decode field data, dropping NUL padding
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|&&b| b != 0x00)
        .map(|&b| decode_byte(b))
        .collect()
}
