//! Rendering configuration shared by the serializer and the span annotator.
//!
//! Both passes must agree on every delimiter and on how keys are quoted,
//! otherwise computed spans drift from the rendered text. A single [`Format`]
//! value is therefore handed to both.
//!
//! All lengths are measured in chars (Unicode scalar values), see [`text_len`].

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Text between a quoted key and its value in keyed nodes.
pub const KEY_VALUE_SEPARATOR: &str = ": ";

/// Length of rendered text in the unit spans are computed in.
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Prefix, separator and suffix wrapped around a composite node's children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Delimiters {
    pub prefix: Cow<'static, str>,
    pub separator: Cow<'static, str>,
    pub suffix: Cow<'static, str>,
}

impl Delimiters {
    pub fn new(
        prefix: impl Into<Cow<'static, str>>,
        separator: impl Into<Cow<'static, str>>,
        suffix: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
            suffix: suffix.into(),
        }
    }

    pub const fn from_static(
        prefix: &'static str,
        separator: &'static str,
        suffix: &'static str,
    ) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            separator: Cow::Borrowed(separator),
            suffix: Cow::Borrowed(suffix),
        }
    }

    /// `prefix + join(items, separator) + suffix`.
    pub fn wrap<I, S>(&self, items: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::from(&*self.prefix);
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                out.push_str(&self.separator);
            }
            out.push_str(item.as_ref());
        }
        out.push_str(&self.suffix);
        out
    }
}

/// How keys of keyed nodes are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyStyle {
    /// `"key"` with the key copied as-is, even if it contains quotes.
    #[default]
    Verbatim,
    /// `"key"` with `"`, `\` and control characters backslash-escaped.
    Escaped,
}

/// Delimiters for both composite shapes plus the key quoting rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Format {
    pub indexed: Delimiters,
    pub keyed: Delimiters,
    pub key_style: KeyStyle,
}

impl Default for Format {
    fn default() -> Self {
        Self::legacy()
    }
}

impl Format {
    /// Indexed delimiters of the legacy rendering.
    pub const INDEXED: Delimiters = Delimiters::from_static("[\n\t", ",\n\t", "\n]");
    /// Keyed delimiters of the legacy rendering. The opening bracket is `[`
    /// while the closing one is `}`.
    pub const KEYED: Delimiters = Delimiters::from_static("[\n\t", ",\n\t", "\n}");

    /// The legacy rendering, byte for byte: verbatim keys and the
    /// mismatched `[ ... }` brackets around keyed nodes.
    pub fn legacy() -> Self {
        Self {
            indexed: Self::INDEXED,
            keyed: Self::KEYED,
            key_style: KeyStyle::Verbatim,
        }
    }

    /// Matching `{ ... }` brackets for keyed nodes and escaped keys.
    pub fn balanced() -> Self {
        Self {
            indexed: Self::INDEXED,
            keyed: Delimiters::from_static("{\n\t", ",\n\t", "\n}"),
            key_style: KeyStyle::Escaped,
        }
    }

    pub fn with_indexed(mut self, delimiters: Delimiters) -> Self {
        self.indexed = delimiters;
        self
    }

    pub fn with_keyed(mut self, delimiters: Delimiters) -> Self {
        self.keyed = delimiters;
        self
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    /// The key exactly as it appears in rendered output, quotes included.
    pub fn render_key(&self, key: &str) -> String {
        let mut out = String::with_capacity(key.len() + 2);
        out.push('"');
        match self.key_style {
            KeyStyle::Verbatim => out.push_str(key),
            KeyStyle::Escaped => escape_into(key, &mut out),
        }
        out.push('"');
        out
    }

    /// Rendered length of a keyed entry's `"key": ` lead-in.
    pub fn key_lead_len(&self, key: &str) -> usize {
        text_len(&self.render_key(key)) + text_len(KEY_VALUE_SEPARATOR)
    }
}

fn escape_into(key: &str, out: &mut String) {
    for c in key.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}
