//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Bare `$VAR` is left alone so tokens containing a dollar sign survive.
/// An unset variable without a default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_token_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PAGEKIT_TEST_TOKEN", "s3cret");
        }
        let result = expand_env("${PAGEKIT_TEST_TOKEN}", "confluence.token").unwrap();
        assert_eq!(result, "s3cret");
        unsafe {
            std::env::remove_var("PAGEKIT_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PAGEKIT_UNSET_USER");
        }
        let result = expand_env("${PAGEKIT_UNSET_USER:-bot}", "confluence.username").unwrap();
        assert_eq!(result, "bot");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PAGEKIT_MISSING_URL");
        }
        let err = expand_env("https://${PAGEKIT_MISSING_URL}/wiki", "confluence.base_url")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("PAGEKIT_MISSING_URL"));
        assert!(msg.contains("confluence.base_url"));
    }

    #[test]
    fn test_bare_dollar_untouched() {
        let result = expand_env("tok$en", "confluence.token").unwrap();
        assert_eq!(result, "tok$en");
    }
}
