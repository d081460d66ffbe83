//! Substitution engine
//!
//! Rewrites placeholder tokens in text with resolved values. One
//! `Substitutions` value is built per stage from function versions and
//! resolved exports, then applied to the stack template and to any uploaded
//! file that asks for it.

use std::collections::BTreeMap;

/// Token → value map applied to text documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: BTreeMap<String, String>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` to `value`; empty tokens are ignored
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() {
            self.values.insert(token, value.into());
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every bound token in `input`.
    ///
    /// Single left-to-right pass: at each position the longest matching token
    /// wins, and substituted values are never scanned again. Tokens without a
    /// binding stay verbatim.
    pub fn render(&self, input: &str) -> String {
        if self.values.is_empty() {
            return input.to_string();
        }

        let mut tokens: Vec<(&str, &str)> = self.iter().collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while !rest.is_empty() {
            if let Some((token, value)) = tokens.iter().find(|(t, _)| rest.starts_with(t)) {
                out.push_str(value);
                rest = &rest[token.len()..];
                continue;
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                out.push(ch);
            }
            rest = chars.as_str();
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut subs = Substitutions::new();
        for (token, value) in iter {
            subs.insert(token, value);
        }
        subs
    }
}
