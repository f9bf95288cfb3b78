//! Sectioned key/value text parser.
//!
//! Responsibilities:
//! - Split configuration text into ordered sections of ordered key/value pairs.
//! - Apply configparser-compatible rules: `=` or `:` delimiters, lowercase keys,
//!   `#`/`;` comment lines, indented continuation lines.
//!
//! Does NOT handle:
//! - Interpolation of `%(name)s` placeholders (see `loader/interpolate.rs`).
//! - Interpretation of reserved sections or keys (see `loader/chain.rs`).
//!
//! Invariants:
//! - Values are stored raw; nothing is substituted at parse time.
//! - A repeated section is merged into the first occurrence; a repeated key
//!   overwrites the earlier value in place.

use thiserror::Error;

/// A syntax error, reported with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct IniError {
    pub line: usize,
    pub message: String,
}

impl IniError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One `[name]` block of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: String) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// The section name, case preserved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a raw value by (lowercase) key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: String) -> usize {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries[pos].1 = value;
            pos
        } else {
            self.entries.push((key, value));
            self.entries.len() - 1
        }
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut doc = IniDocument::default();
        let mut current_section: Option<usize> = None;
        // (section index, entry index) of the value a continuation line extends.
        let mut continued: Option<(usize, usize)> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                continued = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with(char::is_whitespace);
            if indented {
                if let Some((s, e)) = continued {
                    let value = &mut doc.sections[s].entries[e].1;
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| IniError::new(line_no, "unterminated section header"))?
                    .trim();
                if name.is_empty() {
                    return Err(IniError::new(line_no, "empty section name"));
                }
                current_section = Some(doc.section_index_or_insert(name));
                continued = None;
                continue;
            }

            let section = current_section.ok_or_else(|| {
                IniError::new(line_no, "key/value pair appears before any section header")
            })?;
            let delim = trimmed.find(['=', ':']).ok_or_else(|| {
                IniError::new(line_no, format!("expected `key = value`, found {trimmed:?}"))
            })?;
            let key = trimmed[..delim].trim();
            if key.is_empty() {
                return Err(IniError::new(line_no, "empty key"));
            }
            let value = trimmed[delim + 1..].trim();
            let entry = doc.sections[section].insert(key.to_lowercase(), value.to_string());
            continued = Some((section, entry));
        }

        Ok(doc)
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(pos) = self.sections.iter().position(|s| s.name == name) {
            pos
        } else {
            self.sections.push(Section::new(name.to_string()));
            self.sections.len() - 1
        }
    }

    /// Find a section by exact name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Iterate sections in file order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_keys() {
        let doc = IniDocument::parse(
            "[DEFAULT]\ndebug = false\n\n[app:main]\nKey1 = one\nkey2: two\n",
        )
        .unwrap();

        let defaults = doc.section("DEFAULT").unwrap();
        assert_eq!(defaults.get("debug"), Some("false"));

        let main = doc.section("app:main").unwrap();
        assert_eq!(main.get("key1"), Some("one"), "keys are lowercased");
        assert_eq!(main.get("key2"), Some("two"));
        assert!(doc.section("App:Main").is_none(), "section names keep case");
    }

    #[test]
    fn test_first_delimiter_wins() {
        let doc = IniDocument::parse("[app:main]\nuse = config:base.ini\nurl: http://x=y\n")
            .unwrap();
        let main = doc.section("app:main").unwrap();
        assert_eq!(main.get("use"), Some("config:base.ini"));
        assert_eq!(main.get("url"), Some("http://x=y"));
    }

    #[test]
    fn test_comments_and_continuations() {
        let text = "\
# leading comment
[app:main]
; another comment
plugins = a
    b
    c
after = x
";
        let doc = IniDocument::parse(text).unwrap();
        let main = doc.section("app:main").unwrap();
        assert_eq!(main.get("plugins"), Some("a\nb\nc"));
        assert_eq!(main.get("after"), Some("x"));
    }

    #[test]
    fn test_blank_line_ends_continuation() {
        let doc = IniDocument::parse("[s]\na = 1\n\n  b = 2\n").unwrap();
        let s = doc.section("s").unwrap();
        assert_eq!(s.get("a"), Some("1"));
        assert_eq!(s.get("b"), Some("2"));
    }

    #[test]
    fn test_repeated_section_and_key() {
        let doc = IniDocument::parse("[s]\na = 1\nb = 2\n[t]\nc = 3\n[s]\na = 9\n").unwrap();
        let s = doc.section("s").unwrap();
        let entries: Vec<_> = s.entries().collect();
        assert_eq!(entries, vec![("a", "9"), ("b", "2")]);
        assert_eq!(doc.sections().count(), 2);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let doc = IniDocument::parse("[s]\nempty =\n").unwrap();
        assert_eq!(doc.section("s").unwrap().get("empty"), Some(""));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = IniDocument::parse("key = value\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("before any section"));

        let err = IniDocument::parse("[s]\n\nnot a pair\n").unwrap_err();
        assert_eq!(err.line, 3);

        let err = IniDocument::parse("[s\n").unwrap_err();
        assert!(err.message.contains("unterminated"));

        let err = IniDocument::parse("[s]\n = value\n").unwrap_err();
        assert!(err.message.contains("empty key"));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let doc = IniDocument::parse("\u{feff}[s]\na = 1\n").unwrap();
        assert_eq!(doc.section("s").unwrap().get("a"), Some("1"));
    }
}
