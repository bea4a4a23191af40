use super::models::Config;
use thiserror::Error;

/// The platform rejects larger pages
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No keywords configured (at least one search keyword is required)")]
    NoKeywords,

    #[error("Blank entry in '{field}'")]
    BlankEntry { field: &'static str },

    #[error("per_page must be between 1 and 100, got {0}")]
    InvalidPerPage(u32),

    #[error("Response rule #{index} has an empty pattern")]
    EmptyRulePattern { index: usize },

    #[error("Only one of 'cover_letter' and 'cover_letter_file' may be set")]
    ConflictingCoverLetter,

    #[error("Invalid URL in '{field}': {value}")]
    InvalidUrl { field: &'static str, value: String },
}

/// Validate settings shared by every command
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_lists(config)?;
    validate_paging(config)?;
    validate_rules(config)?;
    validate_cover_letter(config)?;
    validate_urls(config)?;
    Ok(())
}

/// Additional checks for commands that search vacancies
pub fn validate_search(config: &Config) -> Result<(), ValidationError> {
    if config.keywords.is_empty() {
        return Err(ValidationError::NoKeywords);
    }
    Ok(())
}

fn validate_lists(config: &Config) -> Result<(), ValidationError> {
    let lists: [(&'static str, &Vec<String>); 3] = [
        ("keywords", &config.keywords),
        ("excluded_cities", &config.excluded_cities),
        ("excluded_words", &config.excluded_words),
    ];

    for (field, values) in lists {
        if values.iter().any(|value| value.trim().is_empty()) {
            return Err(ValidationError::BlankEntry { field });
        }
    }

    Ok(())
}

fn validate_paging(config: &Config) -> Result<(), ValidationError> {
    if config.per_page == 0 || config.per_page > MAX_PER_PAGE {
        return Err(ValidationError::InvalidPerPage(config.per_page));
    }
    Ok(())
}

fn validate_rules(config: &Config) -> Result<(), ValidationError> {
    for (index, rule) in config.response_rules.iter().enumerate() {
        if rule.pattern.trim().is_empty() {
            return Err(ValidationError::EmptyRulePattern { index });
        }
    }
    Ok(())
}

fn validate_cover_letter(config: &Config) -> Result<(), ValidationError> {
    if config.cover_letter.is_some() && config.cover_letter_file.is_some() {
        return Err(ValidationError::ConflictingCoverLetter);
    }
    Ok(())
}

fn validate_urls(config: &Config) -> Result<(), ValidationError> {
    let urls = [
        ("api.base_url", &config.api.base_url),
        ("api.oauth_base_url", &config.api.oauth_base_url),
    ];

    for (field, value) in urls {
        match reqwest::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ValidationError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{ResponseRule, RuleOutcome};
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config {
            keywords: vec!["rust".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
        assert!(validate_search(&config).is_ok());
    }

    #[test]
    fn test_search_requires_keywords() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
        assert_eq!(validate_search(&config), Err(ValidationError::NoKeywords));
    }

    #[test]
    fn test_blank_entries_rejected() {
        let mut config = valid_config();
        config.excluded_words = vec!["intern".into(), "  ".into()];
        assert_eq!(
            validate(&config),
            Err(ValidationError::BlankEntry { field: "excluded_words" })
        );
    }

    #[test]
    fn test_per_page_bounds() {
        let mut config = valid_config();
        config.per_page = 0;
        assert_eq!(validate(&config), Err(ValidationError::InvalidPerPage(0)));

        config.per_page = 101;
        assert_eq!(validate(&config), Err(ValidationError::InvalidPerPage(101)));

        config.per_page = 100;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_rule_pattern_rejected() {
        let mut config = valid_config();
        config
            .response_rules
            .push(ResponseRule::new("", RuleOutcome::ActionRequired, None));
        assert_eq!(
            validate(&config),
            Err(ValidationError::EmptyRulePattern { index: 3 })
        );
    }

    #[test]
    fn test_conflicting_cover_letter() {
        let mut config = valid_config();
        config.cover_letter = Some("Hi".into());
        config.cover_letter_file = Some(PathBuf::from("letter.txt"));
        assert_eq!(validate(&config), Err(ValidationError::ConflictingCoverLetter));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = valid_config();
        config.api.base_url = "api.hh.ru".into();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidUrl { field: "api.base_url", .. })
        ));
    }
}
