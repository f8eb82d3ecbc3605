use crate::{Error, Result};

/// Regex wrapper for form constraint checks.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    source: String,
    backend: fancy_regex::Regex,
}

impl Pattern {
    pub(crate) fn new(pattern: &str) -> Result<Self> {
        let backend = fancy_regex::Regex::new(pattern).map_err(|err| invalid(pattern, err))?;
        Ok(Self {
            source: pattern.to_string(),
            backend,
        })
    }

    /// Compiles an HTML `pattern` attribute, which must match the whole value.
    pub(crate) fn whole_value(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        let backend = fancy_regex::Regex::new(&anchored).map_err(|err| invalid(pattern, err))?;
        Ok(Self {
            source: pattern.to_string(),
            backend,
        })
    }

    pub(crate) fn is_match(&self, input: &str) -> Result<bool> {
        self.backend
            .is_match(input)
            .map_err(|err| invalid(&self.source, err))
    }
}

fn invalid(pattern: &str, err: fancy_regex::Error) -> Error {
    Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_value_patterns_are_anchored() -> Result<()> {
        let zip = Pattern::whole_value("[0-9]{5}")?;
        assert!(zip.is_match("12345")?);
        assert!(!zip.is_match("123456")?);
        assert!(!zip.is_match("x12345")?);
        let either = Pattern::whole_value("a|b")?;
        assert!(either.is_match("b")?);
        assert!(!either.is_match("ab")?);
        Ok(())
    }

    #[test]
    fn lookaround_patterns_are_supported() -> Result<()> {
        let strong = Pattern::whole_value("(?=.*\\d)(?=.*[a-z]).{8,}")?;
        assert!(strong.is_match("secret123")?);
        assert!(!strong.is_match("secretsecret")?);
        Ok(())
    }

    #[test]
    fn invalid_patterns_report_the_source() {
        let err = Pattern::whole_value("(unclosed").err();
        assert!(matches!(
            err,
            Some(Error::InvalidPattern { ref pattern, .. }) if pattern == "(unclosed"
        ));
    }
}
