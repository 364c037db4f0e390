//! `%key` substitution in declarations and outgoing messages

use parking_lot::RwLock;
use tracing::debug;

/// Replacement table for `%key` and `%{key}` tokens
///
/// Matching is ASCII case-insensitive. Longer keys are tried first so
/// `%base` never clobbers `%basename`.
#[derive(Debug, Default)]
pub struct CommandReplacements {
    entries: RwLock<Vec<(String, String)>>,
}

impl CommandReplacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one key
    pub fn add(&self, key: &str, value: &str) {
        let key = key.trim_start_matches('%').to_ascii_lowercase();
        let mut entries = self.entries.write();

        for token in [format!("%{{{key}}}"), format!("%{key}")] {
            if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == token) {
                existing.1 = value.to_string();
            } else {
                entries.push((token, value.to_string()));
            }
        }
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        debug!("Added command replacement %{} -> {}", key, value);
    }

    /// Add several `(key, value)` pairs
    pub fn add_all(&self, pairs: &[(&str, &str)]) {
        for (key, value) in pairs {
            self.add(key, value);
        }
    }

    /// Substitute every known token in `text`
    pub fn replace(&self, text: &str) -> String {
        if !text.contains('%') {
            return text.to_string();
        }

        let entries = self.entries.read();
        let mut out = text.to_string();
        for (token, value) in entries.iter() {
            out = replace_ignore_ascii_case(&out, token, value);
        }
        out
    }

    pub(crate) fn replace_opt(&self, text: &mut Option<String>) {
        if let Some(t) = text {
            *t = self.replace(t);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn replace_ignore_ascii_case(haystack: &str, needle: &str, value: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in lower.match_indices(needle) {
        out.push_str(&haystack[last..start]);
        out.push_str(value);
        last = start + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_token_forms() {
        let r = CommandReplacements::new();
        r.add("staff", "acf.staff");
        assert_eq!(r.replace("%staff"), "acf.staff");
        assert_eq!(r.replace("%{staff}.kick"), "acf.staff.kick");
        assert_eq!(r.replace("%STAFF"), "acf.staff");
        assert_eq!(r.replace("plain"), "plain");
    }

    #[test]
    fn test_longest_key_first() {
        let r = CommandReplacements::new();
        r.add_all(&[("base", "a"), ("basename", "b")]);
        assert_eq!(r.replace("%basename %base"), "b a");
    }

    #[test]
    fn test_overwrite() {
        let r = CommandReplacements::new();
        r.add("x", "1");
        r.add("%x", "2");
        assert_eq!(r.replace("%x"), "2");
    }
}
