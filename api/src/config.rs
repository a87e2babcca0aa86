use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;

const DEFAULT_RECORD_STORE_URL: &str = "http://localhost:8000";

/// How the record store clients talk to their upstreams
#[derive(Clone)]
pub struct UpstreamSettings {
    /// Bound on a single HTTP attempt
    pub timeout: Duration,
    /// Retries after the first attempt, for transient failures only
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Optional service token sent as `Authorization: Bearer`
    pub bearer_token: Option<String>,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
            max_retries: 2,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            bearer_token: None,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    /// Shared key the identity service signs access tokens with
    pub jwt_verification_key: String,
    pub jwt_algorithm: Algorithm,
    pub jwt_leeway_secs: u64,
    pub policy_store_url: String,
    pub customer_store_url: String,
    pub coverage_store_url: String,
    pub region_store_url: String,
    pub upstream: UpstreamSettings,
    /// Aggregate bound on all record store calls of one calculation
    pub request_deadline: Duration,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_verification_key = lookup("JWT_VERIFICATION_KEY")
            .filter(|k| !k.is_empty())
            .context("JWT_VERIFICATION_KEY must be set")?;

        let jwt_algorithm: Algorithm = parse_or(&lookup, "JWT_ALGORITHM", Algorithm::HS256)?;
        if !matches!(
            jwt_algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!(
                "JWT_ALGORITHM {:?} is not supported with a shared verification key",
                jwt_algorithm
            );
        }

        let record_store_url =
            lookup("RECORD_STORE_URL").unwrap_or_else(|| DEFAULT_RECORD_STORE_URL.to_string());
        let store_url = |key: &str| lookup(key).unwrap_or_else(|| record_store_url.clone());

        let defaults = UpstreamSettings::default();
        let upstream = UpstreamSettings {
            timeout: Duration::from_millis(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_MS",
                defaults.timeout.as_millis() as u64,
            )?),
            max_retries: parse_or(&lookup, "UPSTREAM_MAX_RETRIES", defaults.max_retries)?,
            base_backoff: Duration::from_millis(parse_or(
                &lookup,
                "UPSTREAM_BACKOFF_MS",
                defaults.base_backoff.as_millis() as u64,
            )?),
            max_backoff: defaults.max_backoff,
            bearer_token: lookup("RECORD_STORE_TOKEN").filter(|t| !t.is_empty()),
        };
        if upstream.timeout.is_zero() {
            bail!("UPSTREAM_TIMEOUT_MS must be greater than zero");
        }

        let request_deadline =
            Duration::from_millis(parse_or(&lookup, "REQUEST_DEADLINE_MS", 10_000u64)?);
        if request_deadline.is_zero() {
            bail!("REQUEST_DEADLINE_MS must be greater than zero");
        }

        Ok(Self {
            jwt_verification_key,
            jwt_algorithm,
            jwt_leeway_secs: parse_or(&lookup, "JWT_LEEWAY_SECS", 0)?,
            policy_store_url: store_url("POLICY_STORE_URL"),
            customer_store_url: store_url("CUSTOMER_STORE_URL"),
            coverage_store_url: store_url("COVERAGE_STORE_URL"),
            region_store_url: store_url("REGION_STORE_URL"),
            upstream,
            request_deadline,
            rate_limit_per_second: parse_or(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 20)?,
            port: parse_or(&lookup, "PORT", 8080)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}
