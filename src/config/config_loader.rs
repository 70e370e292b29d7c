use std::str::FromStr;

use anyhow::{Context, Result};

use super::config_model::{Auth, Database, DotEnvyConfig, Mail, Server};

const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
const DEFAULT_CONNECT_BACKOFF_SECS: u64 = 2;
const DEFAULT_MAIL_FROM: &str = "noreply@example.com";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup; `load` feeds it the process environment.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = Server {
        port: parse_required(&lookup, "SERVER_PORT")?,
        body_limit: parse_required(&lookup, "SERVER_BODY_LIMIT")?,
        timeout: parse_required(&lookup, "SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required(&lookup, "DATABASE_URL")?,
        connect_attempts: parse_optional(&lookup, "DATABASE_CONNECT_ATTEMPTS")?
            .unwrap_or(DEFAULT_CONNECT_ATTEMPTS),
        connect_backoff_secs: parse_optional(&lookup, "DATABASE_CONNECT_BACKOFF_SECS")?
            .unwrap_or(DEFAULT_CONNECT_BACKOFF_SECS),
    };

    let auth = Auth {
        jwt_secret: required(&lookup, "JWT_SECRET")?,
    };

    let mail = Mail {
        service_url: non_empty(&lookup, "MAIL_SERVICE_URL"),
        from: non_empty(&lookup, "MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
        mail,
    })
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).with_context(|| format!("{key} is missing"))
}

fn parse_required<F, T>(lookup: &F, key: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(lookup, key)?
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty(lookup, key)
        .map(|value| value.parse().with_context(|| format!("{key} is invalid")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("SERVER_PORT", "8080"),
        ("SERVER_BODY_LIMIT", "10"),
        ("SERVER_TIMEOUT", "30"),
        ("DATABASE_URL", "postgres://localhost:5432/subscriptions"),
        ("JWT_SECRET", "supersecretjwtsecretforunittesting123"),
    ];

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = load_from(env(MINIMAL)).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit, 10);
        assert_eq!(config.server.timeout, 30);
        assert_eq!(config.database.connect_attempts, 10);
        assert_eq!(config.database.connect_backoff_secs, 2);
        assert_eq!(config.mail.service_url, None);
        assert_eq!(config.mail.from, "noreply@example.com");
    }

    #[test]
    fn optional_values_override_defaults() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend([
            ("DATABASE_CONNECT_ATTEMPTS", "3"),
            ("DATABASE_CONNECT_BACKOFF_SECS", "1"),
            ("MAIL_SERVICE_URL", "http://mail:8081"),
            ("MAIL_FROM", "kitchen@example.com"),
        ]);

        let config = load_from(env(&pairs)).unwrap();

        assert_eq!(config.database.connect_attempts, 3);
        assert_eq!(config.database.connect_backoff_secs, 1);
        assert_eq!(config.mail.service_url.as_deref(), Some("http://mail:8081"));
        assert_eq!(config.mail.from, "kitchen@example.com");
    }

    #[test]
    fn missing_required_key_is_reported_by_name() {
        let pairs: Vec<_> = MINIMAL
            .iter()
            .copied()
            .filter(|(key, _)| *key != "JWT_SECRET")
            .collect();

        let err = load_from(env(&pairs)).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn unparsable_number_is_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.retain(|(key, _)| *key != "SERVER_PORT");
        pairs.push(("SERVER_PORT", "eighty"));

        let err = load_from(env(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT is invalid"));
    }
}
