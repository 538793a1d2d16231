//! NATS-style subject matching.
//!
//! Subjects are `.`-separated tokens. In a pattern `*` matches exactly one
//! token and a trailing `>` matches one or more tokens.

use super::PublishError;

/// A parsed subscription pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicPattern {
    raw: String,
    tokens: Vec<String>,
}

impl TopicPattern {
    /// Parse a pattern, rejecting empty tokens and a `>` that is not last.
    pub fn parse(pattern: &str) -> Result<Self, PublishError> {
        if pattern.is_empty() {
            return Err(PublishError::InvalidTopic(pattern.to_string()));
        }
        let tokens: Vec<String> = pattern.split('.').map(str::to_string).collect();
        let last = tokens.len() - 1;
        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() || (token == ">" && i != last) {
                return Err(PublishError::InvalidTopic(pattern.to_string()));
            }
        }
        Ok(Self {
            raw: pattern.to_string(),
            tokens,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern contains `*` or `>`.
    pub fn has_wildcards(&self) -> bool {
        self.tokens.iter().any(|t| t == "*" || t == ">")
    }

    /// Anchored regular expression accepting the same topics.
    ///
    /// Used where a broker only understands regex subscriptions
    /// (`order.*` becomes `^order\.[^.]+$`).
    pub fn to_regex(&self) -> String {
        let mut regex = String::from("^");
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                regex.push_str("\\.");
            }
            match token.as_str() {
                "*" => regex.push_str("[^.]+"),
                ">" => regex.push_str(".+"),
                literal => {
                    for c in literal.chars() {
                        if "\\.+*?()|[]{}^$".contains(c) {
                            regex.push('\\');
                        }
                        regex.push(c);
                    }
                }
            }
        }
        regex.push('$');
        regex
    }

    /// Whether `topic` is matched by this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        let mut subject = topic.split('.');
        for token in &self.tokens {
            match token.as_str() {
                ">" => return subject.next().is_some_and(|t| !t.is_empty()),
                "*" => match subject.next() {
                    Some(t) if !t.is_empty() => {}
                    _ => return false,
                },
                literal => {
                    if subject.next() != Some(literal) {
                        return false;
                    }
                }
            }
        }
        subject.next().is_none()
    }
}
