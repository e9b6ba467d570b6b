//! Text values of a feed: unescaping and description markup.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

const BACKSLASH_PLACEHOLDER: char = '\0';

lazy_static! {
    static ref LINE_BREAK: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref ANCHOR: Regex = Regex::new(r#"(?i)<a\s+href="([^"]+)"[^>]*>([^<]+)</a>"#).unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap();
    static ref BARE_URL: Regex = Regex::new(r"https?://[^\s<]+").unwrap();
}

static NAMED_ENTITIES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "amp" => "&",
    "lt" => "<",
    "gt" => ">",
    "quot" => "\"",
    "apos" => "'",
    "nbsp" => "\u{a0}",
    "ndash" => "\u{2013}",
    "mdash" => "\u{2014}",
    "hellip" => "\u{2026}",
    "lsquo" => "\u{2018}",
    "rsquo" => "\u{2019}",
    "ldquo" => "\u{201c}",
    "rdquo" => "\u{201d}",
    "bull" => "\u{2022}",
    "middot" => "\u{b7}",
    "copy" => "\u{a9}",
    "reg" => "\u{ae}",
    "trade" => "\u{2122}",
    "deg" => "\u{b0}",
};

/// Undo TEXT escaping (`\\`, `\n`, `\,`, `\;`) and trim the result.
///
/// An escaped backslash is resolved last, so `\\n` stays a backslash followed by `n`.
pub fn unescape_text(text: &str) -> String {
    text.replace("\\\\", &BACKSLASH_PLACEHOLDER.to_string())
        .replace("\\n", "\n")
        .replace("\\N", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace(BACKSLASH_PLACEHOLDER, "\\")
        .trim()
        .to_owned()
}

pub fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity.strip_prefix('#') {
            Some(number) => {
                let code = match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => number.parse().ok(),
                };
                code.and_then(char::from_u32).map(String::from)
            }
            None => NAMED_ENTITIES.get(entity).map(|value| (*value).to_owned()),
        };
        decoded.unwrap_or_else(|| caps[0].to_owned())
    })
}

/// Schemes an anchor may keep its link for.
const LINK_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

/// Escape decoded text for insertion into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `href` and `text` are already escaped.
fn anchor(href: &str, text: &str) -> String {
    format!(r#"<a href="{href}" target="_blank">{text}</a>"#)
}

fn is_link(href: &str) -> bool {
    LINK_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Strip markup outside of anchors, decode entities and link bare URLs.
fn clean_plain(segment: &str, out: &mut String) {
    let stripped = TAG.replace_all(segment, "");
    let escaped = escape_html(&decode_entities(&stripped));
    let linked = BARE_URL.replace_all(&escaped, |caps: &Captures| anchor(&caps[0], &caps[0]));
    out.push_str(&linked);
}

/// Turn the markup of an already unescaped description into display HTML.
///
/// Line breaks become newlines. `<a href="...">text</a>` anchors with an
/// `http(s):` or `mailto:` target are kept and open in a new tab, other
/// anchors keep only their text and every other tag is removed. Text is
/// entity-decoded and then escaped, so encoded markup never becomes live.
/// Bare `http(s)://` URLs are linked.
pub fn clean_markup(text: &str) -> String {
    let text = LINE_BREAK.replace_all(text, "\n");
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in ANCHOR.captures_iter(&text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        clean_plain(&text[last..whole.start()], &mut out);
        let href = decode_entities(caps[1].trim());
        let label = escape_html(&decode_entities(&caps[2]));
        if is_link(&href) {
            out.push_str(&anchor(&escape_html(&href), &label));
        } else {
            tracing::debug!(%href, "dropping link with unsupported scheme");
            out.push_str(&label);
        }
        last = whole.end();
    }
    clean_plain(&text[last..], &mut out);
    out
}

/// Unescape a raw `DESCRIPTION` value and clean its markup.
pub fn clean_description(raw: &str) -> String {
    clean_markup(&unescape_text(raw))
}
