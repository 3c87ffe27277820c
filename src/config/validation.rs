use crate::config::types::{Config, CrawlerConfig, OutputConfig, RankConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool size
const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_rank_config(&config.rank)?;
    validate_seeds(&config.seeds.urls)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates PageRank parameters
fn validate_rank_config(config: &RankConfig) -> Result<(), ConfigError> {
    if !(config.damping_factor > 0.0 && config.damping_factor < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping_factor must be strictly between 0 and 1, got {}",
            config.damping_factor
        )));
    }

    if !(config.tolerance > 0.0) {
        return Err(ConfigError::Validation(format!(
            "tolerance must be > 0, got {}",
            config.tolerance
        )));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_iterations must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed URLs: at least one, each absolute http(s)
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "At least one seed URL is required".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| ConfigError::Validation(format!("Invalid email format: '{}'", email)))?;

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::SeedConfig;

    fn create_test_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                max_depth: 2,
                timeout_secs: 3,
                workers: 4,
                max_pages: None,
                deadline_secs: None,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./test.db".to_string(),
            },
            rank: RankConfig::default(),
            seeds: SeedConfig {
                urls: vec!["http://example.com/".to_string()],
                file: None,
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_workers_bounds() {
        let mut config = create_test_config();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = create_test_config();
        config.crawler.timeout_secs = 0;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = create_test_config();
        config.crawler.max_pages = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_damping_factor_range() {
        let mut config = create_test_config();
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            config.rank.damping_factor = bad;
            assert!(validate(&config).is_err(), "accepted {}", bad);
        }
    }

    #[test]
    fn test_tolerance_must_be_positive() {
        let mut config = create_test_config();
        config.rank.tolerance = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_seeds_required() {
        let mut config = create_test_config();
        config.seeds.urls.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_seed_scheme() {
        let mut config = create_test_config();
        config.seeds.urls = vec!["ftp://example.com/".to_string()];
        assert!(validate(&config).is_err());

        config.seeds.urls = vec!["/relative".to_string()];
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = create_test_config();
        config.user_agent.crawler_name = "bad name".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }
}
