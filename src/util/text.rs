use std::borrow::Cow;

/// Returns true for characters XML 1.0 does not allow in documents.
///
/// Covers the C0 controls except tab, newline and carriage return, plus the
/// two non-characters U+FFFE and U+FFFF.
fn is_forbidden_in_xml(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Strips characters that cannot appear in an XML 1.0 document.
///
/// Content records come from arbitrary files, and a single stray control
/// byte in a title makes the whole feed unparseable for strict readers.
///
/// Returns `Cow::Borrowed` when the input is already clean (common case).
///
/// # Examples
///
/// ```
/// use atomfeed::util::strip_invalid_xml_chars;
///
/// assert_eq!(strip_invalid_xml_chars("tab\tok"), "tab\tok");
/// assert_eq!(strip_invalid_xml_chars("bell\x07gone"), "bellgone");
/// ```
pub fn strip_invalid_xml_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_forbidden_in_xml) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|&c| !is_forbidden_in_xml(c)).collect())
}

/// Keeps the first `words` whitespace-separated pieces of `text`.
///
/// Splits on every single whitespace character, so consecutive whitespace
/// yields empty pieces that count towards the limit. Pieces are re-joined
/// with one space.
///
/// # Examples
///
/// ```
/// use atomfeed::util::truncate_words;
///
/// assert_eq!(truncate_words("one two three four", 2), "one two");
/// assert_eq!(truncate_words("short", 20), "short");
/// ```
pub fn truncate_words(text: &str, words: usize) -> String {
    text.split(char::is_whitespace)
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}
