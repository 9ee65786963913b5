//! Minimal tokenizer for raw HTML fragments
//!
//! Markdown may carry inline or block HTML verbatim. The projector does not
//! interpret HTML beyond line structure: tags are split off by a small
//! tokenizer, line-level tags become newlines, everything else is dropped,
//! and character entities in the remaining text are decoded once.

/// A piece of an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text between tags, still entity-encoded
    Text(&'a str),
    /// A tag, lowercased name without brackets or attributes
    Tag { name: String, closing: bool },
    /// `<!-- ... -->`
    Comment,
}

/// Split an HTML fragment into text, tag and comment tokens
///
/// A `<` that does not start a well-formed tag is kept as text.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &input[i..];
        let consumed = if rest.starts_with("<!--") {
            let end = rest[4..].find("-->").map(|p| p + 4 + 3).unwrap_or(rest.len());
            Some((Token::Comment, end))
        } else {
            scan_tag(rest)
        };

        match consumed {
            Some((token, len)) => {
                if text_start < i {
                    tokens.push(Token::Text(&input[text_start..i]));
                }
                tokens.push(token);
                i += len;
                text_start = i;
            }
            None => i += 1,
        }
    }

    if text_start < input.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    tokens
}

fn scan_tag(rest: &str) -> Option<(Token<'static>, usize)> {
    let body = rest.strip_prefix('<')?;
    let (closing, body) = match body.strip_prefix('/') {
        Some(b) => (true, b),
        None => (false, body),
    };

    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(body.len());
    if name_len == 0 || !body.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name = body[..name_len].to_ascii_lowercase();

    // Skip attributes, honoring quotes so a '>' inside a value does not end the tag
    let mut quote: Option<char> = None;
    for (offset, c) in body[name_len..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => {
                let prefix = if closing { 2 } else { 1 };
                let len = prefix + name_len + offset + 1;
                return Some((Token::Tag { name, closing }, len));
            }
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

/// Tags that end a line of text
const LINE_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre",
];

/// True when the fragment is a line break tag such as `<br>` or `<br/>`
pub fn is_line_break(fragment: &str) -> bool {
    let tokens = tokenize(fragment.trim());
    matches!(tokens.as_slice(), [Token::Tag { name, closing: false }] if name == "br")
}

/// Reduce an HTML fragment to plain text
///
/// Line-level tags become `\n`, other tags and comments are removed,
/// runs of blank lines collapse, and entities are decoded once.
pub fn to_text(fragment: &str) -> String {
    let mut out = String::new();
    for token in tokenize(fragment) {
        match token {
            Token::Text(text) => out.push_str(&unescape_entities(text)),
            Token::Tag { name, closing } => {
                let breaks = LINE_TAGS.contains(&name.as_str()) && (closing || name == "br");
                if breaks && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Token::Comment => {}
        }
    }

    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode character entities once
///
/// Handles `&lt;`, `&gt;`, `&amp;`, `&quot;`, `&apos;`, `&nbsp;` and numeric
/// references. Unknown entities are kept verbatim, and the output of a
/// decoded entity is never decoded again, so `&amp;lt;` yields `&lt;`.
pub fn unescape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match candidate.find(';').filter(|end| *end <= 10) {
            Some(end) => match decode_entity(&candidate[1..end]) {
                Some(c) => {
                    out.push(c);
                    rest = &candidate[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &candidate[1..];
                }
            },
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let hex = digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'));
            let code = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
