//! Configuration loading and validation.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional TOML
//! file, then `STARFORK_`-prefixed environment variables with `__` separating
//! nested keys (e.g. `STARFORK_VERIFICATION__PAGE_SIZE=50`). A token passed
//! on the command line (or through `GITHUB_TOKEN`) overrides `github.token`.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use engine::{FallbackSettings, VerifierSettings};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use github::GithubSettings;
use serde::{Deserialize, Serialize};
use verification::{ContractAddress, ForkCheckPolicy, PageSize, RepositoryRef, WindowSize};

pub const ENV_PREFIX: &str = "STARFORK_";

const DEFAULT_CONTRACT: &str = "0x04d7a824b3301e67ef34024e9dc79445e54d5af7";

/// Largest `last:` argument GraphQL accepts and largest `per_page` REST honours.
const GITHUB_MAX_PER_REQUEST: u64 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarforkConfig {
    pub repository: RepositorySection,
    pub github: GithubSection,
    pub verification: VerificationSection,
    pub output: OutputSection,
    pub telemetry: TelemetrySection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySection {
    pub owner: String,
    pub name: String,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            owner: "dappledger".to_string(),
            name: "AnnChain".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    pub graphql_url: String,
    pub rest_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            graphql_url: "https://api.github.com/graphql".to_string(),
            rest_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: concat!("starfork/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSection {
    /// Entries requested per collection by the bulk query.
    pub bulk_window: u64,
    /// Entries per page on the REST fallback.
    pub page_size: u64,
    pub max_concurrent_pages: usize,
    pub page_timeout_secs: u64,
    pub fork_check: ForkCheckPolicy,
}

impl Default for VerificationSection {
    fn default() -> Self {
        Self {
            bulk_window: 100,
            page_size: 30,
            max_concurrent_pages: 8,
            page_timeout_secs: 15,
            fork_check: ForkCheckPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub contract_address: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySection {
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint. Tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

/// Validated settings for every component, ready for construction.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bulk_window: WindowSize,
    pub page_size: PageSize,
    pub github: GithubSettings,
    pub fallback: FallbackSettings,
    pub verifier: VerifierSettings,
}

/// Loads configuration from `path` (if given) and the environment.
pub fn load(path: Option<&Path>) -> Result<StarforkConfig> {
    let mut figment = Figment::from(Serialized::defaults(StarforkConfig::default()));
    if let Some(path) = path {
        if !path.exists() {
            bail!("configuration file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("failed to load configuration")
}

impl StarforkConfig {
    /// Validates the configuration and converts it into component settings.
    ///
    /// `token_override` takes precedence over `github.token`.
    pub fn into_runtime(self, token_override: Option<String>) -> Result<RuntimeConfig> {
        let repository = RepositoryRef::new(&self.repository.owner, &self.repository.name)
            .with_context(|| {
                format!(
                    "invalid repository '{}/{}'",
                    self.repository.owner, self.repository.name
                )
            })?;

        let token = token_override
            .or(self.github.token)
            .filter(|t| !t.trim().is_empty())
            .context("a GitHub token is required (set GITHUB_TOKEN or github.token)")?;

        let verification = self.verification;
        if verification.bulk_window > GITHUB_MAX_PER_REQUEST {
            bail!("verification.bulk_window must not exceed {GITHUB_MAX_PER_REQUEST}");
        }
        if verification.page_size > GITHUB_MAX_PER_REQUEST {
            bail!("verification.page_size must not exceed {GITHUB_MAX_PER_REQUEST}");
        }
        let bulk_window = WindowSize::new(verification.bulk_window)
            .context("verification.bulk_window must be greater than zero")?;
        let page_size = PageSize::new(verification.page_size)
            .context("verification.page_size must be greater than zero")?;
        if verification.max_concurrent_pages == 0 {
            bail!("verification.max_concurrent_pages must be greater than zero");
        }
        if verification.page_timeout_secs == 0 {
            bail!("verification.page_timeout_secs must be greater than zero");
        }

        let contract = ContractAddress::new(self.output.contract_address.to_lowercase())
            .context("output.contract_address must not be empty")?;

        Ok(RuntimeConfig {
            bulk_window,
            page_size,
            github: GithubSettings {
                graphql_url: self.github.graphql_url,
                rest_url: self.github.rest_url,
                repository: repository.clone(),
                token,
                user_agent: self.github.user_agent,
                request_timeout: Duration::from_secs(self.github.request_timeout_secs),
            },
            fallback: FallbackSettings {
                max_concurrent_pages: verification.max_concurrent_pages,
                page_timeout: Duration::from_secs(verification.page_timeout_secs),
            },
            verifier: VerifierSettings {
                repository,
                contract,
                fork_check: verification.fork_check,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, StarforkConfig::default());
            assert_eq!(config.verification.bulk_window, 100);
            assert_eq!(config.verification.page_size, 30);
            assert_eq!(config.repository.owner, "dappledger");
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "starfork.toml",
                r#"
                [repository]
                owner = "octo"
                name = "widgets"

                [verification]
                page_size = 50
                fork_check = "always"

                [telemetry]
                log_format = "json"
                "#,
            )?;
            jail.set_env("STARFORK_VERIFICATION__PAGE_SIZE", "40");

            let config = load(Some(Path::new("starfork.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.repository.owner, "octo");
            assert_eq!(config.verification.page_size, 40);
            assert_eq!(config.verification.fork_check, ForkCheckPolicy::Always);
            assert_eq!(config.verification.bulk_window, 100);
            assert_eq!(config.telemetry.log_format, LogFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(load(Some(Path::new("absent.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_runtime_requires_token() {
        let err = StarforkConfig::default().into_runtime(None).unwrap_err();
        assert!(err.to_string().contains("GitHub token is required"));

        let err = StarforkConfig::default()
            .into_runtime(Some("  ".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GitHub token is required"));
    }

    #[test]
    fn test_token_override_wins() {
        let mut config = StarforkConfig::default();
        config.github.token = Some("from-config".to_string());

        let runtime = config.clone().into_runtime(None).unwrap();
        assert_eq!(runtime.github.token, "from-config");

        let runtime = config.into_runtime(Some("from-flag".to_string())).unwrap();
        assert_eq!(runtime.github.token, "from-flag");
    }

    #[test]
    fn test_runtime_rejects_zero_sizes() {
        let mut config = StarforkConfig::default();
        config.verification.page_size = 0;
        assert!(config.into_runtime(Some("t".to_string())).is_err());

        let mut config = StarforkConfig::default();
        config.verification.bulk_window = 0;
        assert!(config.into_runtime(Some("t".to_string())).is_err());

        let mut config = StarforkConfig::default();
        config.verification.max_concurrent_pages = 0;
        assert!(config.into_runtime(Some("t".to_string())).is_err());
    }

    #[test]
    fn test_runtime_rejects_sizes_above_github_limit() {
        let mut config = StarforkConfig::default();
        config.verification.page_size = 250;
        let err = config.into_runtime(Some("t".to_string())).unwrap_err();
        assert!(err.to_string().contains("page_size must not exceed 100"));

        let mut config = StarforkConfig::default();
        config.verification.bulk_window = 101;
        let err = config.into_runtime(Some("t".to_string())).unwrap_err();
        assert!(err.to_string().contains("bulk_window must not exceed 100"));

        let mut config = StarforkConfig::default();
        config.verification.page_size = 100;
        config.verification.bulk_window = 100;
        assert!(config.into_runtime(Some("t".to_string())).is_ok());
    }

    #[test]
    fn test_runtime_carries_settings_through() {
        let mut config = StarforkConfig::default();
        config.output.contract_address = "0xABCDEF".to_string();
        let runtime = config.into_runtime(Some("t".to_string())).unwrap();

        assert_eq!(runtime.verifier.repository.to_string(), "dappledger/AnnChain");
        assert_eq!(runtime.verifier.contract.as_str(), "0xabcdef");
        assert_eq!(
            runtime.verifier.fork_check,
            ForkCheckPolicy::SkipAfterStargazerFallback
        );
        assert_eq!(runtime.fallback.page_timeout, Duration::from_secs(15));
        assert_eq!(runtime.github.request_timeout, Duration::from_secs(30));
        assert_eq!(runtime.bulk_window.as_u64(), 100);
    }
}
