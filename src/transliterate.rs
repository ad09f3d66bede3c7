//! Fixed transliteration table for feed titles
//!
//! 3270 terminals display a single-byte EBCDIC codepage, so Scandinavian
//! and German letters plus typographic punctuation are spelled out in ASCII
//! before titles reach the screen.

/// Characters replaced in titles and their ASCII spellings
const TABLE: &[(char, &str)] = &[
    ('å', "aa"),
    ('ø', "oe"),
    ('æ', "ae"),
    ('Å', "AA"),
    ('Ø', "OE"),
    ('Æ', "AE"),
    ('ö', "oe"),
    ('ä', "ae"),
    ('ü', "ue"),
    ('\u{2013}', "-"),   // en dash
    ('\u{2014}', "-"),   // em dash
    ('\u{2018}', "'"),   // left single quote
    ('\u{2019}', "'"),   // right single quote
    ('\u{201C}', "\""),  // left double quote
    ('\u{201D}', "\""),  // right double quote
    ('\u{2026}', "..."), // ellipsis
    ('\u{00A0}', " "),   // no-break space
];

/// Replace every table character in `s`
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match TABLE.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scandinavian_letters() {
        assert_eq!(transliterate("æøå test"), "aeoeaa test");
        assert_eq!(transliterate("ÆØÅ"), "AEOEAA");
    }

    #[test]
    fn test_german_umlauts() {
        assert_eq!(transliterate("Müller plädiert für Öl"), "Mueller plaediert fuer Öl");
    }

    #[test]
    fn test_typographic_punctuation() {
        assert_eq!(
            transliterate("\u{201C}It\u{2019}s 9\u{2013}5\u{201D}\u{2026}"),
            "\"It's 9-5\"..."
        );
    }

    #[test]
    fn test_plain_ascii_untouched() {
        assert_eq!(transliterate("Hello, World!"), "Hello, World!");
        assert_eq!(transliterate(""), "");
    }
}
