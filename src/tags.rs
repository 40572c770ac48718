/// Characters that separate tags besides whitespace.
const DELIMITERS: [char; 5] = [',', '，', '、', ';', '；'];

fn is_delimiter(c: char) -> bool {
    // `char::is_whitespace` already covers the ideographic space (U+3000).
    c.is_whitespace() || DELIMITERS.contains(&c)
}

/// Splits free-text tag input into trimmed, non-empty tags, keeping order.
pub fn split_tags(input: Option<&str>) -> Vec<String> {
    let Some(input) = input else {
        return Vec::new();
    };

    input
        .split(is_delimiter)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
