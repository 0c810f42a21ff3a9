use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, bail};
use chrono_tz::Tz;
use clap::Parser;

/// Proxy between the mobile app and the Västtrafik API
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Base url of the Västtrafik REST v2 API
    #[arg(
        long,
        env = "VASTTRAFIK_API_URL",
        default_value = "https://api.vasttrafik.se/bin/rest.exe/v2"
    )]
    pub api_base_url: String,

    /// Timeout for every call to the transit API
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Time zone the transit API reports departure times in
    #[arg(long, env = "TRANSIT_TIMEZONE", default_value = "Europe/Stockholm")]
    pub timezone: String,

    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Spans are exported over OTLP only when this is set
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.is_empty() {
            bail!("api base url must not be empty");
        }

        if self.timeout_secs == 0 {
            bail!("timeout must be greater than 0");
        }

        self.tz()?;

        Ok(())
    }

    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid time zone {}: {e}", self.timezone))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Stockholm;
    use clap::Parser;

    use super::Config;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("mina_hallplatser_api").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--port",
            "8080",
            "--api-base-url",
            "http://localhost:1234",
            "--timeout-secs",
            "3",
            "--timezone",
            "Europe/Stockholm",
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base_url, "http://localhost:1234");
        assert_eq!(config.timeout().as_secs(), 3);
        assert_eq!(config.tz().unwrap(), Stockholm);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timezone() {
        let config = parse(&["--timezone", "Europe/Gothenburg"]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let config = parse(&["--timeout-secs", "0", "--timezone", "Europe/Stockholm"]);

        assert!(config.validate().is_err());
    }
}
