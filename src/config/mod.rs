pub mod types;
mod validators;

// Re-export all public types
pub use types::*;
pub use validators::parse_size_string;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validators::{
        validate_listen_address, validate_log_format, validate_log_level,
        validate_positive_timeout, validate_upload_size,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn base_config() -> SystemConfig {
        let config_toml = r#"
[deploy]
salt = "s3cret"

[deploy.scripts]
single_node = "/opt/droplift/deploy_service.sh"

[deploy.timeout]
value = 30
unit = "seconds"
        "#;
        toml::from_str(config_toml).unwrap()
    }

    #[test]
    fn test_system_config_complete() {
        let config_toml = r#"
[server]
listen = "0.0.0.0:9000"
max_upload_size = "250MB"
request_timeout = 120
shutdown_timeout = 15

[deploy]
artifact_dir = "/srv/apps/packages"
artifact_suffix = ".jar"
salt = "pepper-and-salt"
mode = "cluster"
stage_script = true
script_timeout = 900

[deploy.scripts]
single_node = "/opt/droplift/deploy_service.sh"
cluster = "/opt/droplift/ansible_deploy.sh"

[deploy.timeout]
value = 5
unit = "minutes"

[logging]
level = "debug"
format = "pretty"

[monitoring]
metrics_enabled = false
metrics_path = "/metrics"
health_path = "/health"
        "#;

        let config: SystemConfig = toml::from_str(config_toml).unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_size, "250MB");
        assert_eq!(config.server.request_timeout, 120);
        assert_eq!(config.server.shutdown_timeout, 15);

        assert_eq!(config.deploy.artifact_dir, "/srv/apps/packages");
        assert_eq!(config.deploy.artifact_suffix, ".jar");
        assert_eq!(config.deploy.salt, "pepper-and-salt");
        assert_eq!(config.deploy.mode, DeploymentMode::Cluster);
        assert!(config.deploy.stage_script);
        assert_eq!(config.deploy.script_timeout, 900);
        assert_eq!(
            config.deploy.script_path(),
            Some("/opt/droplift/ansible_deploy.sh")
        );
        assert_eq!(config.deploy.timeout.as_millis(), 300_000);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");

        assert!(!config.monitoring.metrics_enabled);
        assert_eq!(config.monitoring.metrics_path, "/metrics");
        assert_eq!(config.monitoring.health_path, "/health");
    }

    #[test]
    fn test_system_config_minimal_defaults() {
        let config = base_config();

        assert_eq!(config.server.listen, "127.0.0.1:8080"); // default
        assert_eq!(config.server.max_upload_size, "100MB"); // default
        assert_eq!(config.server.request_timeout, 300); // default
        assert_eq!(config.deploy.artifact_dir, "/srv/droplift/artifacts"); // default
        assert_eq!(config.deploy.artifact_suffix, ".jar"); // default
        assert_eq!(config.deploy.mode, DeploymentMode::SingleNode); // default
        assert!(!config.deploy.stage_script); // default
        assert_eq!(config.deploy.script_timeout, 600); // default
        assert_eq!(config.logging.level, "info"); // default
        assert_eq!(config.logging.format, "json"); // default
        assert!(config.monitoring.metrics_enabled); // default
    }

    #[test]
    fn test_missing_salt_is_a_parse_error() {
        let config_toml = r#"
[deploy]

[deploy.scripts]
single_node = "/opt/droplift/deploy_service.sh"

[deploy.timeout]
value = 30
unit = "seconds"
        "#;
        assert!(toml::from_str::<SystemConfig>(config_toml).is_err());
    }

    #[test]
    fn test_invalid_time_unit_is_a_parse_error() {
        let config_toml = r#"
[deploy]
salt = "s3cret"

[deploy.scripts]
single_node = "/opt/droplift/deploy_service.sh"

[deploy.timeout]
value = 30
unit = "fortnights"
        "#;
        assert!(toml::from_str::<SystemConfig>(config_toml).is_err());
    }

    #[test]
    fn test_load_valid_config_file() {
        let config_toml = r#"
[server]
listen = "127.0.0.1:8080"

[deploy]
salt = "s3cret"

[deploy.scripts]
single_node = "/opt/droplift/deploy_service.sh"

[deploy.timeout]
value = 30
unit = "seconds"
        "#;

        let file = create_temp_file(config_toml);
        let config = SystemConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.deploy.salt, "s3cret");
    }

    #[test]
    fn test_load_missing_file() {
        let result = SystemConfig::load_from_file("/nonexistent/path/config.toml");
        match result {
            Err(crate::types::Error::Config(crate::types::ConfigError::FileNotFound { path })) => {
                assert_eq!(path, "/nonexistent/path/config.toml");
            }
            _ => panic!("Expected FileNotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_file("[deploy\nsalt = \"x\"");
        match SystemConfig::load_from_file(file.path()) {
            Err(crate::types::Error::Config(crate::types::ConfigError::ParseError(_))) => {}
            _ => panic!("Expected ParseError"),
        }
    }

    #[test]
    fn test_time_unit_to_millis() {
        assert_eq!(TimeUnit::Nanoseconds.to_millis(5_000_000), 5);
        assert_eq!(TimeUnit::Microseconds.to_millis(2_000), 2);
        assert_eq!(TimeUnit::Milliseconds.to_millis(1_500), 1_500);
        assert_eq!(TimeUnit::Seconds.to_millis(30), 30_000);
        assert_eq!(TimeUnit::Minutes.to_millis(2), 120_000);
        assert_eq!(TimeUnit::Hours.to_millis(1), 3_600_000);
        assert_eq!(TimeUnit::Days.to_millis(1), 86_400_000);
    }

    #[test]
    fn test_script_path_resolution() {
        let mut config = base_config();
        assert_eq!(
            config.deploy.script_path(),
            Some("/opt/droplift/deploy_service.sh")
        );

        config.deploy.mode = DeploymentMode::Cluster;
        assert_eq!(config.deploy.script_path(), None);

        config.deploy.scripts.cluster = Some("/opt/droplift/ansible_deploy.sh".to_string());
        assert_eq!(
            config.deploy.script_path(),
            Some("/opt/droplift/ansible_deploy.sh")
        );
    }

    #[test]
    fn test_validate_success() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_salt() {
        let mut config = base_config();
        config.deploy.salt = "  ".to_string();
        match config.validate() {
            Err(crate::types::Error::Validation { message }) => {
                assert!(message.starts_with("deploy.salt"));
            }
            _ => panic!("Expected validation error for empty salt"),
        }
    }

    #[test]
    fn test_validate_bad_suffix() {
        let mut config = base_config();
        config.deploy.artifact_suffix = "jar".to_string();
        match config.validate() {
            Err(crate::types::Error::Validation { message }) => {
                assert!(message.starts_with("deploy.artifact_suffix"));
            }
            _ => panic!("Expected validation error for suffix without a dot"),
        }
    }

    #[test]
    fn test_validate_cluster_mode_requires_script() {
        let mut config = base_config();
        config.deploy.mode = DeploymentMode::Cluster;
        match config.validate() {
            Err(crate::types::Error::Validation { message }) => {
                assert!(message.starts_with("deploy.scripts.cluster"));
            }
            _ => panic!("Expected validation error for missing cluster script"),
        }
    }

    #[test]
    fn test_validate_zero_freshness_window() {
        let mut config = base_config();
        config.deploy.timeout.value = 0;
        assert!(config.validate().is_err());

        // A sub-millisecond window truncates to zero and is rejected too
        let mut config = base_config();
        config.deploy.timeout = TimeoutConfig {
            value: 500,
            unit: TimeUnit::Nanoseconds,
        };
        match config.validate() {
            Err(crate::types::Error::Validation { message }) => {
                assert!(message.contains("truncates"));
            }
            _ => panic!("Expected validation error for truncated window"),
        }
    }

    #[test]
    fn test_validate_listen_address() {
        assert!(validate_listen_address("127.0.0.1:8080", "f").is_ok());
        assert!(validate_listen_address("0.0.0.0:80", "f").is_ok());
        assert!(validate_listen_address("[::1]:8080", "f").is_ok());

        assert!(validate_listen_address("invalid", "f").is_err());
        assert!(validate_listen_address("127.0.0.1", "f").is_err());
        assert!(validate_listen_address("127.0.0.1:99999", "f").is_err());
    }

    #[test]
    fn test_parse_size_string() {
        assert_eq!(parse_size_string("1000").unwrap(), 1000);
        assert_eq!(parse_size_string("1KB").unwrap(), 1024);
        assert_eq!(parse_size_string("1MB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size_string("1GB").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size_string("1mb").unwrap(), 1024 * 1024);

        assert!(parse_size_string("").is_err());
        assert!(parse_size_string("abc").is_err());
        assert!(parse_size_string("-1KB").is_err());
        assert!(parse_size_string("1.5MB").is_err());
    }

    #[test]
    fn test_validate_upload_size() {
        assert!(validate_upload_size("100MB", "f").is_ok());
        assert!(validate_upload_size("1024", "f").is_ok());

        assert!(validate_upload_size("0", "f").is_err());
        assert!(validate_upload_size("2GB", "f").is_err());
        assert!(validate_upload_size("nope", "f").is_err());
    }

    #[test]
    fn test_validate_log_settings() {
        assert!(validate_log_level("info", "f").is_ok());
        assert!(validate_log_level("loud", "f").is_err());
        assert!(validate_log_format("json", "f").is_ok());
        assert!(validate_log_format("yaml", "f").is_err());
        assert!(validate_positive_timeout(1, "f").is_ok());
        assert!(validate_positive_timeout(0, "f").is_err());
    }
}
