//! Tolerant markup tokenizer and escaping helpers.
//!
//! Good enough for rendered templates: tags with quoted or bare attributes,
//! comments, void elements and raw-text `script`/`style` bodies. Anything
//! that does not look like a tag is kept as text.

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Whether `tag` is a void element.
#[must_use]
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Whether `tag` holds raw, unescaped text.
#[must_use]
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// A lexical unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="v">` or `<name/>`.
    StartTag {
        /// Lower-case tag name.
        name: String,
        /// Attributes in source order, names lower-cased, values decoded.
        attributes: Vec<(String, String)>,
        /// Written with a trailing `/`.
        self_closing: bool,
    },
    /// `</name>`.
    EndTag(String),
    /// Character data with entities decoded.
    Text(String),
    /// Body of a `script` or `style` element, verbatim.
    RawText(String),
    /// `<!-- ... -->` body.
    Comment(String),
}

/// Split `input` into tokens. Never fails.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let tail = &rest[lt..];

        if let Some(body) = tail.strip_prefix("<!--") {
            flush_text(&mut text, &mut tokens);
            let (comment, after) = match body.find("-->") {
                Some(end) => (&body[..end], &body[end + 3..]),
                None => (body, ""),
            };
            tokens.push(Token::Comment(comment.to_string()));
            rest = after;
            continue;
        }

        if tail.starts_with("<!") || tail.starts_with("<?") {
            // doctype and processing instructions carry nothing we keep
            flush_text(&mut text, &mut tokens);
            rest = tail.find('>').map_or("", |end| &tail[end + 1..]);
            continue;
        }

        if let Some(body) = tail.strip_prefix("</") {
            if body.starts_with(|c: char| c.is_ascii_alphabetic()) {
                flush_text(&mut text, &mut tokens);
                let (inner, after) = match body.find('>') {
                    Some(end) => (&body[..end], &body[end + 1..]),
                    None => (body, ""),
                };
                let name = inner
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                tokens.push(Token::EndTag(name));
                rest = after;
                continue;
            }
        }

        let Some((token, after)) = start_tag(tail) else {
            text.push('<');
            rest = &tail[1..];
            continue;
        };
        flush_text(&mut text, &mut tokens);

        let raw_name = match &token {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } if is_raw_text(name) => Some(name.clone()),
            _ => None,
        };
        tokens.push(token);
        rest = after;

        if let Some(name) = raw_name {
            let (body, after) = split_raw_text(rest, &name);
            if !body.is_empty() {
                tokens.push(Token::RawText(body.to_string()));
            }
            rest = after;
        }
    }

    text.push_str(rest);
    flush_text(&mut text, &mut tokens);
    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(text)));
        text.clear();
    }
}

/// Parse a start tag at the beginning of `input` (which starts with `<`).
fn start_tag(input: &str) -> Option<(Token, &str)> {
    let body = &input[1..];
    if !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(body.len());
    let name = body[..name_end].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;
    let mut rest = &body[name_end..];

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix("/>") {
            self_closing = true;
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix('/') {
            rest = after;
            continue;
        }

        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len())
            .max(1);
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            let (raw, next) = match after.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let inner = &after[1..];
                    match inner.find(quote) {
                        Some(end) => (&inner[..end], &inner[end + 1..]),
                        None => (inner, ""),
                    }
                }
                _ => {
                    let end = after
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(after.len());
                    (&after[..end], &after[end..])
                }
            };
            rest = next;
            decode_entities(raw)
        } else {
            String::new()
        };

        if !attributes.iter().any(|(k, _): &(String, String)| *k == key) {
            attributes.push((key, value));
        }
    }

    Some((
        Token::StartTag {
            name,
            attributes,
            self_closing,
        },
        rest,
    ))
}

/// Split raw text at the first case-insensitive `</name`.
fn split_raw_text<'a>(input: &'a str, name: &str) -> (&'a str, &'a str) {
    let needle = format!("</{name}");
    let lower = input.to_ascii_lowercase();
    match lower.find(&needle) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    }
}

/// Decode the common named entities and numeric character references.
///
/// Unknown or malformed references are left as written.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));
        if let Some((c, semi)) = decoded {
            out.push(c);
            rest = &tail[semi + 1..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escape character data for serialization.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted serialization.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
