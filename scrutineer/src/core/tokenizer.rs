//! Word splitting for command strings.
//!
//! Build and clean commands arrive as single strings (`-b "make {}"`) and
//! are split here before anything else sees them. The rules are a small
//! subset of shell quoting: whitespace separates tokens, single- and
//! double-quoted runs join into the surrounding token with the quote
//! characters stripped, and an unterminated quote is treated as implicitly
//! closed at end-of-string rather than rejected.

/// Split a command string into whitespace-delimited, quote-aware tokens.
///
/// An all-whitespace input yields an empty vector; callers that need a
/// runnable command must reject that themselves.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.get_or_insert_with(String::new).push(ch),
            None if ch == '\'' || ch == '"' => {
                quote = Some(ch);
                // An opening quote starts a token even when the quoted run
                // turns out to be empty.
                current.get_or_insert_with(String::new);
            }
            None if ch.is_whitespace() => {
                if let Some(word) = current.take() {
                    words.push(word);
                }
            }
            None => current.get_or_insert_with(String::new).push(ch),
        }
    }
    if let Some(word) = current.take() {
        words.push(word);
    }
    words
}
