use crate::error::{AutoUpdateError, Result};
use regex::Regex;

/// Glob matcher for dependency file paths (`*` and `?` wildcards).
///
/// A pattern without wildcards also matches everything below it, so
/// `vendor` ignores `vendor/Gemfile`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(AutoUpdateError::Config(
                "Ignored path pattern cannot be empty".to_string(),
            ));
        }

        let regex = if trimmed.contains(['*', '?']) {
            Self::compile_glob(trimmed, "$")?
        } else {
            let prefix = trimmed.trim_end_matches('/');
            Self::compile_glob(prefix, "(/.*)?$")?
        };

        Ok(Self { regex })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    fn compile_glob(pattern: &str, suffix: &str) -> Result<Regex> {
        let mut regex = String::from("^");
        for ch in pattern.chars() {
            match ch {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                    regex.push('\\');
                    regex.push(ch);
                }
                _ => regex.push(ch),
            }
        }
        regex.push_str(suffix);

        Regex::new(&regex).map_err(|e| {
            AutoUpdateError::Config(format!("Invalid ignored path '{}': {}", pattern, e))
        })
    }
}

/// A set of ignored path patterns.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<PathPattern>,
}

impl PathFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| PathPattern::new(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}
