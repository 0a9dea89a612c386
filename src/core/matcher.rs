use super::{CleanerError, Result};
use regex::Regex;

/// Anchored alternation over the configured runner prefixes.
///
/// The same matcher filters both the machines directory and the droplet
/// listing, so both sides always agree on what belongs to this runner.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    regex: Regex,
}

impl PrefixMatcher {
    /// Builds `^(p1|p2|...)` from the given prefixes.
    ///
    /// Prefixes are used as regular expression fragments, so an invalid
    /// fragment is reported as [`CleanerError::InvalidPrefix`].
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
        if prefixes.is_empty() {
            return Err(CleanerError::Config(
                "You need to set at least one 'runner-prefix'".to_string(),
            ));
        }

        let regex = Regex::new(&format!("^({})", prefixes.join("|")))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
