//! Splitting a document into its `---` delimited header and its body.
//!
//! The header is a flat list of `key: value` lines. Values are not YAML:
//! they are trimmed and lose one layer of matching quotes, nothing more.

const DELIMITER: &str = "---";

/// Field names the pipeline knows how to coerce.
pub mod field {
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const CATEGORY: &str = "category";
    pub const ORDER: &str = "order";
    pub const PUBLISHED: &str = "published";
    pub const THUMBNAIL: &str = "thumbnail";
    pub const EXCERPT: &str = "excerpt";
    pub const SLUG: &str = "slug";
}

/// Ordered mapping of header field names to their raw string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterBlock {
    fields: Vec<(String, String)>,
}

impl FrontmatterBlock {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// A repeated key keeps its first position but takes the later value.
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = unquote(value.trim()).to_owned();
        if let Some((_, existing)) = self.fields.iter_mut().find(|(k, _)| k == key) {
            *existing = value;
        } else {
            self.fields.push((key.to_owned(), value));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for FrontmatterBlock {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut block = FrontmatterBlock::default();
        for (key, value) in iter {
            block.insert(key.as_ref(), value.as_ref());
        }
        block
    }
}

/// Removes a single layer of matching `"` or `'` quotes.
#[must_use]
pub fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Splits `raw` into its header and body.
///
/// A header is only recognised when the very first line is a delimiter and
/// a later line closes it. Anything else yields an empty block and the
/// untouched input as body; this function never fails.
#[must_use]
pub fn parse(raw: &str) -> (FrontmatterBlock, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (FrontmatterBlock::default(), raw);
    };
    if !is_delimiter(first) {
        return (FrontmatterBlock::default(), raw);
    }

    let mut offset = first.len();
    let mut block = FrontmatterBlock::default();
    for line in lines {
        offset += line.len();
        if is_delimiter(line) {
            return (block, &text[offset..]);
        }
        if let Some((key, value)) = split_field(line) {
            block.insert(key, value);
        }
    }

    // unterminated header
    (FrontmatterBlock::default(), raw)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{parse, unquote, FrontmatterBlock};

    #[test]
    fn header_and_body() {
        let (block, body) = parse("---\ntitle: Hello\ndate: 2024-03-01\n---\nBody text");
        assert_eq!(Some("Hello"), block.get("title"));
        assert_eq!(Some("2024-03-01"), block.get("date"));
        assert_eq!(2, block.len());
        assert_eq!("Body text", body);
    }

    #[test]
    fn no_header_keeps_whole_text() {
        let raw = "\n  Just text\n";
        let (block, body) = parse(raw);
        assert!(block.is_empty());
        assert_eq!(raw, body);
    }

    #[test]
    fn unterminated_header_is_not_a_header() {
        let raw = "---\ntitle: Half\nno closing line";
        let (block, body) = parse(raw);
        assert!(block.is_empty());
        assert_eq!(raw, body);
    }

    #[test]
    fn delimiter_must_open_the_document() {
        let raw = "intro\n---\ntitle: Late\n---\n";
        let (block, body) = parse(raw);
        assert!(block.is_empty());
        assert_eq!(raw, body);
    }

    #[test]
    fn empty_input() {
        let (block, body) = parse("");
        assert!(block.is_empty());
        assert_eq!("", body);
    }

    #[test]
    fn later_colons_belong_to_the_value() {
        let (block, _) = parse("---\nthumbnail: https://example.org/a.png\ntime: 10:30:00\n---\n");
        assert_eq!(Some("https://example.org/a.png"), block.get("thumbnail"));
        assert_eq!(Some("10:30:00"), block.get("time"));
    }

    #[test]
    fn lines_without_colon_are_skipped() {
        let (block, body) = parse("---\njust words\ntitle: Kept\n: no key\n---\nrest");
        assert_eq!(vec![("title", "Kept")], block.iter().collect::<Vec<_>>());
        assert_eq!("rest", body);
    }

    #[test]
    fn crlf_and_trailing_space_delimiters() {
        let (block, body) = parse("--- \r\ntitle: Windows\r\n---\r\nBody\r\n");
        assert_eq!(Some("Windows"), block.get("title"));
        assert_eq!("Body\r\n", body);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let (block, body) = parse("\u{feff}---\ntitle: Marked\n---\nBody");
        assert_eq!(Some("Marked"), block.get("title"));
        assert_eq!("Body", body);
    }

    #[test]
    fn quotes_are_stripped_once() {
        let (block, _) = parse("---\na: \"quoted\"\nb: 'single'\nc: \"'nested'\"\nd: \"mismatch'\n---\n");
        assert_eq!(Some("quoted"), block.get("a"));
        assert_eq!(Some("single"), block.get("b"));
        assert_eq!(Some("'nested'"), block.get("c"));
        assert_eq!(Some("\"mismatch'"), block.get("d"));
    }

    #[test]
    fn values_round_trip() {
        for value in ["plain", "with: colon", "  padded  ", "\"quoted value\"", "'x'"] {
            let raw = format!("---\nkey: {value}\n---\n");
            let (block, _) = parse(&raw);
            assert_eq!(Some(unquote(value.trim())), block.get("key"), "{value}");
        }
    }

    #[test]
    fn repeated_key_takes_last_value() {
        let block: FrontmatterBlock = [("title", "One"), ("order", "1"), ("title", "Two")]
            .into_iter()
            .collect();
        assert_eq!(
            vec![("title", "Two"), ("order", "1")],
            block.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn unquote_leaves_lone_quote() {
        assert_eq!("\"", unquote("\""));
        assert_eq!("", unquote("''"));
    }
}
