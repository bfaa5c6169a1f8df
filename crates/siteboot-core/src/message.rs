//! Interpolated log and error messages.
//!
//! Templates carry `!name` placeholders that are substituted literally at
//! render time. Parameters are kept separate so loggers can emit structured
//! fields and tests can assert on values without parsing rendered text.

use serde::Serialize;
use std::fmt;

///
/// Message
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Message {
    template: String,
    params: Vec<(String, String)>,
}

impl Message {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
        }
    }

    /// Attach a placeholder value; `key` includes the leading `!`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value bound to a placeholder, if any.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Substitute every placeholder in one left-to-right pass. At each `!`
    /// the longest matching key wins, so `!site_root` is never clobbered by a
    /// shorter `!site`. Substituted values are never scanned again.
    #[must_use]
    pub fn render(&self) -> String {
        let mut ordered: Vec<&(String, String)> = self.params.iter().collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(idx) = rest.find('!') {
            out.push_str(&rest[..idx]);
            rest = &rest[idx..];

            match ordered.iter().find(|(key, _)| rest.starts_with(key.as_str())) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push('!');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);

        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_params() {
        let msg = Message::new("The directory !root is not valid").with("!root", "/srv/www");

        assert_eq!(msg.render(), "The directory /srv/www is not valid");
        assert_eq!(msg.param("!root"), Some("/srv/www"));
    }

    #[test]
    fn longer_placeholders_win_over_prefixes() {
        let msg = Message::new("site !site at !site_root")
            .with("!site", "example.com")
            .with("!site_root", "sites/example");

        assert_eq!(msg.render(), "site example.com at sites/example");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let msg = Message::new("!error (!phase)")
            .with("!error", "Undefined index !phase")
            .with("!phase", "configuration");

        assert_eq!(msg.render(), "Undefined index !phase (configuration)");
    }

    #[test]
    fn unmatched_bang_is_kept() {
        let msg = Message::new("done! see !root!").with("!root", "/srv");

        assert_eq!(msg.render(), "done! see /srv!");
    }

    #[test]
    fn template_without_params_renders_verbatim() {
        let msg = Message::from("nothing to see");

        assert_eq!(msg.to_string(), "nothing to see");
        assert!(msg.params().is_empty());
    }
}
