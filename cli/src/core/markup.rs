//! # PriceBot Reply Markup
//!
//! File: cli/src/core/markup.rs
//! Author: Christi Mahu
//!
//! Replies are built once and rendered for the front-end that delivers them:
//! Telegram gets HTML (its `parse_mode=HTML` subset), the console gets plain text.
//!

/// Output flavor for reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    /// Telegram HTML: `<b>`, `<i>`, `<code>`, `<a>`, with `&`, `<`, `>` escaped.
    Html,
    /// Plain terminal text, no tags.
    #[default]
    Plain,
}

impl Markup {
    pub fn bold(self, text: &str) -> String {
        self.wrap("b", text)
    }

    pub fn italic(self, text: &str) -> String {
        self.wrap("i", text)
    }

    pub fn code(self, text: &str) -> String {
        self.wrap("code", text)
    }

    /// A hyperlink. Plain output shows the label followed by the URL.
    pub fn link(self, label: &str, url: &str) -> String {
        match self {
            Self::Html => format!("<a href='{}'>{}</a>", escape_html(url), escape_html(label)),
            Self::Plain => format!("{} ({})", label, url),
        }
    }

    fn wrap(self, tag: &str, text: &str) -> String {
        match self {
            Self::Html => format!("<{tag}>{}</{tag}>", escape_html(text)),
            Self::Plain => text.to_string(),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_tags_and_escaping() {
        assert_eq!(Markup::Html.bold("Bitcoin"), "<b>Bitcoin</b>");
        assert_eq!(Markup::Html.code("1 BTC = 5 USD"), "<code>1 BTC = 5 USD</code>");
        assert_eq!(Markup::Html.bold("Cats & <Dogs>"), "<b>Cats &amp; &lt;Dogs&gt;</b>");
    }

    #[test]
    fn test_plain_is_untouched() {
        assert_eq!(Markup::Plain.italic("3 minutes ago"), "3 minutes ago");
        assert_eq!(Markup::Plain.bold("Cats & Dogs"), "Cats & Dogs");
        assert_eq!(
            Markup::Plain.link("this link", "https://example.test"),
            "this link (https://example.test)"
        );
    }
}
