//! Configuration warning value object.

use std::fmt;
use std::path::PathBuf;

/// Non-fatal problem found while loading `liftoff.toml` (unknown key, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the offending key (`polling.intervall`)
    pub key: String,
    pub file: PathBuf,
    /// 1-indexed line, when the key could be located
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_suggestion() {
        let warning = ConfigWarning {
            key: "polling.intervall_secs".to_string(),
            file: PathBuf::from("liftoff.toml"),
            line: Some(4),
            suggestion: Some("interval_secs".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "unknown key 'polling.intervall_secs' in liftoff.toml:4 (did you mean 'interval_secs'?)"
        );
    }
}
