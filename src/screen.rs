//! Screen model and the two gateway screens
//!
//! A [`Screen`] is an ordered list of positioned [`Field`]s plus the initial
//! cursor position, built once with [`ScreenBuilder`] and handed to the
//! transport for a single render/input round trip.
//!
//! Each field's attribute byte occupies the cell at its (row, col), so text
//! placed at column 0 has [`CONTENT_WIDTH`] cells available on that row.

use crate::wrap::{pad_center, wrap};
use chrono::{DateTime, Utc};

/// Screen rows (3278 model 2)
pub const ROWS: usize = 24;
/// Screen columns (3278 model 2)
pub const COLS: usize = 80;
/// Usable text width of a row-wide field starting at column 0
pub const CONTENT_WIDTH: usize = COLS - 1;

/// First row of the headline body
pub const HEADLINE_FIRST_ROW: usize = 3;
/// Row of the closing separator; headline body stops before it
pub const HEADLINE_LAST_ROW: usize = 21;
/// First row of the feed list on the selection screen
pub const FEED_LIST_FIRST_ROW: usize = 5;
/// Row of the error message; the feed list stops before it
pub const FEED_LIST_LAST_ROW: usize = 20;

/// Free-text command field on the headline screen
pub const FIELD_CMD: &str = "cmd";
/// Literal URL field on the selection screen
pub const FIELD_FEED_URL: &str = "feedURL";
/// Numeric feed choice field on the selection screen
pub const FIELD_CHOICE: &str = "choice";
/// Error message field on the selection screen
pub const FIELD_ERROR: &str = "errormsg";

const HEADLINE_TITLE: &str = "RSS Feed";
const HEADLINE_PROMPT: &str =
    "Command (Enter=refresh, q+Enter=quit, PF3/Clear=exit, PF4=RSS url):";
const SELECTION_TITLE: &str = "Change RSS URL Feed";
const SELECTION_URL_LABEL: &str = "Enter URL:";
const SELECTION_HINT: &str = "Or select from one of the below URL's";
const SELECTION_PROMPT: &str = "Press Enter to save, PF3 Exit, # of new url:";

/// Extended color of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Terminal default
    #[default]
    Default,
    /// Blue
    Blue,
    /// Red
    Red,
    /// Pink
    Pink,
    /// Green
    Green,
    /// Turquoise
    Turquoise,
    /// Yellow
    Yellow,
    /// White
    White,
}

/// Extended highlighting of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// Terminal default
    #[default]
    Default,
    /// Blinking text
    Blink,
    /// Reverse video
    Reverse,
    /// Underlined
    Underscore,
}

/// A positioned, styled region of the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Row of the attribute byte (0-based)
    pub row: usize,
    /// Column of the attribute byte (0-based)
    pub col: usize,
    /// Literal content; empty for blank input fields
    pub content: String,
    /// Unprotected (user may type here)
    pub writable: bool,
    /// Cursor skips to the next field at this boundary
    pub autoskip: bool,
    /// Numeric-only input
    pub numeric: bool,
    /// Intensified display
    pub intense: bool,
    /// Extended color
    pub color: Color,
    /// Extended highlighting
    pub highlight: Highlight,
    /// Name used to read the value back
    pub name: Option<String>,
}

impl Field {
    /// Protected text field
    pub fn text(row: usize, col: usize, content: impl Into<String>) -> Self {
        Self {
            row,
            col,
            content: content.into(),
            writable: false,
            autoskip: false,
            numeric: false,
            intense: false,
            color: Color::Default,
            highlight: Highlight::Default,
            name: None,
        }
    }

    /// Empty writable field whose value is returned under `name`
    pub fn input(row: usize, col: usize, name: impl Into<String>) -> Self {
        Self {
            writable: true,
            name: Some(name.into()),
            ..Self::text(row, col, "")
        }
    }

    /// Protected autoskip field ending the preceding input field
    pub fn stop(row: usize, col: usize) -> Self {
        Self {
            autoskip: true,
            ..Self::text(row, col, "")
        }
    }

    /// Display intensified
    pub fn intense(mut self) -> Self {
        self.intense = true;
        self
    }

    /// Restrict input to digits
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    /// Set the extended color
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the extended highlighting
    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }

    /// Attach a name to a protected field
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Immutable screen: fields in emission order plus the cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    fields: Vec<Field>,
    cursor: (usize, usize),
}

impl Screen {
    /// Fields in emission order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Initial cursor position as (row, col)
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Field with the given name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }

    /// Protected text fields placed on `row`
    pub fn text_on_row(&self, row: usize) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |f| f.row == row && !f.writable)
            .map(|f| f.content.as_str())
    }
}

/// Accumulates fields and finalizes an immutable [`Screen`]
#[derive(Debug, Default)]
pub struct ScreenBuilder {
    fields: Vec<Field>,
    cursor: (usize, usize),
}

impl ScreenBuilder {
    /// Empty builder with the cursor at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn push(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Set the initial cursor position
    pub fn cursor(&mut self, row: usize, col: usize) -> &mut Self {
        self.cursor = (row, col);
        self
    }

    /// Finish the screen
    pub fn build(self) -> Screen {
        Screen {
            fields: self.fields,
            cursor: self.cursor,
        }
    }
}

/// Push wrapped, numbered entries starting at `row`, stopping before `last_row`
///
/// Returns the next free row.
fn push_numbered<'a>(
    builder: &mut ScreenBuilder,
    entries: impl Iterator<Item = (usize, &'a str)>,
    mut row: usize,
    last_row: usize,
) -> usize {
    'entries: for (n, text) in entries {
        for line in wrap(&format!("{:2}. {}", n, text.trim()), CONTENT_WIDTH) {
            if row >= last_row {
                break 'entries;
            }
            builder.push(Field::text(row, 0, line));
            row += 1;
        }
    }
    row
}

fn rule() -> String {
    "-".repeat(CONTENT_WIDTH)
}

/// Build the headline screen
///
/// Headlines are numbered from 1 and wrapped; those that do not fit above
/// [`HEADLINE_LAST_ROW`] are dropped.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use rss3270::screen::{build_headline_screen, FIELD_CMD};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
/// let screen = build_headline_screen("http://feed", &["Hello".to_string()], now);
/// assert!(screen.field(FIELD_CMD).is_some());
/// ```
pub fn build_headline_screen(
    current_url: &str,
    headlines: &[String],
    now: DateTime<Utc>,
) -> Screen {
    let subtitle = format!("{}  -  Updated: {}", current_url, now.format("%H:%M UTC"));

    let mut builder = ScreenBuilder::new();
    builder
        .push(Field::text(0, 0, pad_center(HEADLINE_TITLE, CONTENT_WIDTH)).intense())
        .push(Field::text(1, 0, pad_center(&subtitle, CONTENT_WIDTH)))
        .push(Field::text(2, 0, rule()));

    push_numbered(
        &mut builder,
        headlines
            .iter()
            .enumerate()
            .map(|(i, h)| (i + 1, h.as_str())),
        HEADLINE_FIRST_ROW,
        HEADLINE_LAST_ROW,
    );

    builder
        .push(Field::text(HEADLINE_LAST_ROW, 0, rule()))
        .push(Field::text(22, 0, HEADLINE_PROMPT))
        .push(Field::input(22, 69, FIELD_CMD))
        .cursor(22, 70);
    builder.build()
}

/// Build the feed selection screen
///
/// Feeds are numbered from 0, matching the index typed into the choice
/// field. `error` fills the reserved message row.
pub fn build_feed_selection_screen(feeds: &[String], error: Option<&str>) -> Screen {
    let mut builder = ScreenBuilder::new();
    builder
        .push(Field::text(0, 0, pad_center(SELECTION_TITLE, CONTENT_WIDTH)).intense())
        .push(Field::text(1, 0, rule()))
        .push(Field::text(2, 0, SELECTION_URL_LABEL))
        .push(Field::input(2, 11, FIELD_FEED_URL).highlight(Highlight::Underscore))
        .push(Field::stop(2, 79))
        .push(Field::text(3, 0, SELECTION_HINT));

    push_numbered(
        &mut builder,
        feeds.iter().enumerate().map(|(i, url)| (i, url.as_str())),
        FEED_LIST_FIRST_ROW,
        FEED_LIST_LAST_ROW,
    );

    builder
        .push(
            Field::text(FEED_LIST_LAST_ROW, 0, error.unwrap_or_default())
                .intense()
                .color(Color::Red)
                .named(FIELD_ERROR),
        )
        .push(Field::text(21, 0, rule()))
        .push(Field::text(22, 0, SELECTION_PROMPT))
        .push(Field::input(22, 45, FIELD_CHOICE).numeric())
        .cursor(22, 46);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap()
    }

    fn body_rows(screen: &Screen, first: usize, last: usize) -> Vec<&Field> {
        screen
            .fields()
            .iter()
            .filter(|f| f.row >= first && f.row < last && !f.writable && f.name.is_none())
            .collect()
    }

    fn numbered_entries(screen: &Screen) -> usize {
        body_rows(screen, HEADLINE_FIRST_ROW, HEADLINE_LAST_ROW)
            .iter()
            .filter(|f| {
                let head = f.content.trim_start();
                let digits: String = head.chars().take_while(char::is_ascii_digit).collect();
                !digits.is_empty() && head[digits.len()..].starts_with(". ")
            })
            .count()
    }

    #[test]
    fn test_headline_screen_header() {
        let screen = build_headline_screen("http://feed", &["One".to_string()], noon());
        let fields = screen.fields();

        assert_eq!(fields[0].row, 0);
        assert!(fields[0].intense);
        assert_eq!(fields[0].content.trim(), "RSS Feed");
        assert_eq!(fields[0].content.len(), CONTENT_WIDTH);

        assert_eq!(fields[1].content.trim(), "http://feed  -  Updated: 12:05 UTC");
        assert_eq!(fields[2].content, "-".repeat(CONTENT_WIDTH));
    }

    #[test]
    fn test_headline_numbering_and_footer() {
        let headlines = vec!["First".to_string(), "Second".to_string()];
        let screen = build_headline_screen("u", &headlines, noon());

        assert_eq!(screen.text_on_row(3).next().unwrap().trim_end(), " 1. First");
        assert_eq!(screen.text_on_row(4).next().unwrap().trim_end(), " 2. Second");
        assert_eq!(screen.text_on_row(5).count(), 0);
        assert_eq!(
            screen.text_on_row(21).next().unwrap(),
            "-".repeat(CONTENT_WIDTH)
        );

        let cmd = screen.field(FIELD_CMD).unwrap();
        assert!(cmd.writable);
        assert_eq!((cmd.row, cmd.col), (22, 69));
        assert_eq!(screen.cursor(), (22, 70));
    }

    #[test]
    fn test_long_headline_wraps() {
        let long = "word ".repeat(30);
        let screen = build_headline_screen("u", &[long], noon());
        let body = body_rows(&screen, HEADLINE_FIRST_ROW, HEADLINE_LAST_ROW);
        assert_eq!(body.len(), 2);
        assert!(body.iter().all(|f| f.content.len() == CONTENT_WIDTH));
    }

    #[test]
    fn test_headline_body_truncated_at_last_row() {
        let headlines: Vec<String> = (0..40).map(|i| format!("Headline {}", i)).collect();
        let screen = build_headline_screen("u", &headlines, noon());
        let body = body_rows(&screen, HEADLINE_FIRST_ROW, HEADLINE_LAST_ROW);
        assert_eq!(body.len(), HEADLINE_LAST_ROW - HEADLINE_FIRST_ROW);
        assert_eq!(body.last().unwrap().content.trim_end(), "18. Headline 17");
    }

    #[test]
    fn test_selection_screen_layout() {
        let feeds = vec!["http://a".to_string(), "http://b".to_string()];
        let screen = build_feed_selection_screen(&feeds, None);

        assert_eq!(screen.text_on_row(5).next().unwrap().trim_end(), " 0. http://a");
        assert_eq!(screen.text_on_row(6).next().unwrap().trim_end(), " 1. http://b");

        let url = screen.field(FIELD_FEED_URL).unwrap();
        assert!(url.writable);
        assert_eq!(url.highlight, Highlight::Underscore);

        let choice = screen.field(FIELD_CHOICE).unwrap();
        assert!(choice.writable && choice.numeric);
        assert_eq!((choice.row, choice.col), (22, 45));

        let error = screen.field(FIELD_ERROR).unwrap();
        assert!(!error.writable);
        assert_eq!(error.row, FEED_LIST_LAST_ROW);
        assert_eq!(error.color, Color::Red);
        assert!(error.content.is_empty());

        assert_eq!(screen.cursor(), (22, 46));
    }

    #[test]
    fn test_selection_screen_shows_error() {
        let screen = build_feed_selection_screen(&["http://a".to_string()], Some("No feed #5"));
        assert_eq!(screen.field(FIELD_ERROR).unwrap().content, "No feed #5");
    }

    #[test]
    fn test_feed_list_truncated_before_error_row() {
        let feeds: Vec<String> = (0..30).map(|i| format!("http://feed{}", i)).collect();
        let screen = build_feed_selection_screen(&feeds, None);
        let body = body_rows(&screen, FEED_LIST_FIRST_ROW, FEED_LIST_LAST_ROW);
        assert_eq!(body.len(), FEED_LIST_LAST_ROW - FEED_LIST_FIRST_ROW);
        assert!(screen.fields().iter().all(|f| f.row < ROWS && f.col < COLS));
    }

    proptest! {
        #[test]
        fn headline_screen_respects_row_budget(
            headlines in proptest::collection::vec("[a-zA-Z ]{0,200}", 0..=23),
        ) {
            let screen = build_headline_screen("http://feed", &headlines, noon());
            prop_assert!(numbered_entries(&screen) <= crate::config::DEFAULT_MAX_HEADLINES);

            // Only the closing rule, prompt and command field sit at or below row 21
            let below: Vec<&Field> = screen
                .fields()
                .iter()
                .filter(|f| f.row >= HEADLINE_LAST_ROW)
                .collect();
            prop_assert_eq!(below.len(), 3);
            prop_assert!(screen.fields().iter().all(|f| f.row < ROWS));
        }
    }
}
