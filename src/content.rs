//! Post body rendering
//!
//! Mastodon delivers post bodies as HTML. For display we need two things from
//! it: the plain text (paragraphs and line breaks only) and the list of links
//! a user can open, numbered in document order. Both are produced by
//! sanitizing the body against an allow-list and then reading the result.
//!
//! Parsing is fail-soft: markup the tokenizer cannot make sense of (an
//! unterminated tag or comment) ends the scan, and whatever was read up to
//! that point is used.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::models::Link;

/// Text and links extracted from a post body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// Plain display text, paragraphs separated by a blank line
    pub text: String,
    /// External links in document order (hashtags excluded)
    pub links: Vec<Link>,
}

/// Extract display text and links from an HTML post body
pub fn extract(html: &str) -> Rendered {
    let linkable = sanitize(html, &LINK_POLICY);
    let links = harvest_links(&linkable);

    let displayable = sanitize(html, &TEXT_POLICY);
    let text = to_plain_text(&displayable);

    Rendered { text, links }
}

fn harvest_links(sanitized: &str) -> Vec<Link> {
    let mut links = Vec::new();
    for token in Tokenizer::new(sanitized) {
        let Token::Start { name, attrs, .. } = token else {
            continue;
        };
        if name != "a" {
            continue;
        }

        let mut link = Link {
            text: String::new(),
            url: String::new(),
            classes: Vec::new(),
        };
        let mut keep = true;
        for (key, value) in attrs {
            match key.as_str() {
                "href" => {
                    link.text.clone_from(&value);
                    link.url = value;
                }
                "class" => {
                    // Hashtags open inside the client, not in a browser
                    if value.contains("hashtag") {
                        keep = false;
                    }
                    link.classes = value.split_whitespace().map(String::from).collect();
                }
                _ => {}
            }
        }
        if keep {
            links.push(link);
        }
    }
    links
}

fn to_plain_text(sanitized: &str) -> String {
    let text = sanitized
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<p>", "")
        .replace("</p>", "\n\n");
    html_escape::decode_html_entities(text.trim()).into_owned()
}

// ==================== Sanitizer ====================

/// Elements whose content is never text
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Allow-list for one sanitizing pass
struct Policy {
    elements: &'static [&'static str],
    anchor_attrs: &'static [&'static str],
}

impl Policy {
    fn allows(&self, element: &str) -> bool {
        self.elements.contains(&element)
    }
}

const LINK_POLICY: Policy = Policy {
    elements: &["p", "br", "a"],
    anchor_attrs: &["href", "class"],
};

const TEXT_POLICY: Policy = Policy {
    elements: &["p", "br"],
    anchor_attrs: &[],
};

/// Re-emit `html` keeping only the markup `policy` allows.
///
/// Dropped elements keep their text content, except raw-text elements like
/// `script`, which are dropped whole. Anchors that end up without any
/// allowed attribute are dropped too.
fn sanitize(html: &str, policy: &Policy) -> String {
    let mut out = String::with_capacity(html.len());
    let mut skipping: Option<String> = None;
    let mut open_anchors = 0usize;

    for token in Tokenizer::new(html) {
        if let Some(raw) = &skipping {
            if matches!(&token, Token::End { name } if name == raw) {
                skipping = None;
            }
            continue;
        }

        match token {
            Token::Text(text) => push_text(&mut out, text),
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    if !self_closing {
                        skipping = Some(name);
                    }
                    continue;
                }
                if !policy.allows(&name) {
                    continue;
                }
                if name == "a" {
                    let kept: Vec<_> = attrs
                        .iter()
                        .filter(|(key, _)| policy.anchor_attrs.contains(&key.as_str()))
                        .collect();
                    if kept.is_empty() {
                        continue;
                    }
                    out.push_str("<a");
                    for (key, value) in kept {
                        out.push_str(&format!(
                            " {key}=\"{}\"",
                            html_escape::encode_double_quoted_attribute(value)
                        ));
                    }
                    out.push('>');
                    open_anchors += 1;
                } else if self_closing {
                    out.push_str(&format!("<{name}/>"));
                } else {
                    out.push_str(&format!("<{name}>"));
                }
            }
            Token::End { name } => {
                if !policy.allows(&name) || name == "br" {
                    continue;
                }
                if name == "a" {
                    if open_anchors == 0 {
                        continue;
                    }
                    open_anchors -= 1;
                }
                out.push_str(&format!("</{name}>"));
            }
        }
    }
    out
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

// ==================== Tokenizer ====================

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/?)\s*([A-Za-z][A-Za-z0-9:-]*)").expect("valid tag name regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
}

/// Streaming HTML tokenizer. Yields `None` at end of input or at the first
/// unrecoverable error.
struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    const fn new(html: &'a str) -> Self {
        Self { rest: html }
    }

    fn fail(&mut self, what: &str) -> Option<Token<'a>> {
        tracing::warn!("Stopping HTML scan at {what}");
        self.rest = "";
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }

            let Some(lt) = self.rest.find('<') else {
                let text = self.rest;
                self.rest = "";
                return Some(Token::Text(text));
            };
            if lt > 0 {
                let (text, rest) = self.rest.split_at(lt);
                self.rest = rest;
                return Some(Token::Text(text));
            }

            let after = &self.rest[1..];
            let starts_markup = after
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
            if !starts_markup {
                // A lone `<` is plain text
                let (text, rest) = self.rest.split_at(1);
                self.rest = rest;
                return Some(Token::Text(text));
            }

            if let Some(body) = after.strip_prefix("!--") {
                let Some(end) = body.find("-->") else {
                    return self.fail("unterminated comment");
                };
                self.rest = &body[end + 3..];
                continue;
            }

            let Some(end) = find_tag_end(after) else {
                return self.fail("unterminated tag");
            };
            let inner = &after[..end];
            self.rest = &after[end + 1..];

            // Doctypes, processing instructions and `</>` carry nothing we keep
            if let Some(token) = parse_tag(inner) {
                return Some(token);
            }
        }
    }
}

/// Byte offset of the `>` closing a tag, skipping quoted attribute values
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut after_equals = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '>' => return Some(i),
            '"' | '\'' if after_equals => quote = Some(c),
            _ => {}
        }
        if !c.is_whitespace() {
            after_equals = c == '=';
        }
    }
    None
}

fn parse_tag(inner: &str) -> Option<Token<'static>> {
    let caps = TAG_NAME.captures(inner)?;
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();

    if closing {
        return Some(Token::End { name });
    }

    let rest = &inner[caps.get(0).map_or(0, |m| m.end())..];
    let self_closing = rest.trim_end().ends_with('/');
    let attrs = ATTRIBUTE
        .captures_iter(rest)
        .map(|c| {
            let key = c[1].to_ascii_lowercase();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map_or(String::new(), |m| {
                    html_escape::decode_html_entities(m.as_str()).into_owned()
                });
            (key, value)
        })
        .collect();

    Some(Token::Start {
        name,
        attrs,
        self_closing,
    })
}
