use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the archive server, e.g. `http://localhost:15630`.
    pub server_url: String,
    /// Token given explicitly via BICHON_TOKEN. Takes precedence over the
    /// session file.
    pub token: Option<String>,
    pub session_file: PathBuf,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    /// Optional translated string table (JSON).
    pub strings_file: Option<PathBuf>,
    /// BICHON_LOG_FORMAT=json switches log lines to JSON.
    pub log_json: bool,
}

pub const DEFAULT_SERVER_URL: &str = "http://localhost:15630";

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let session_file = match std::env::var("BICHON_SESSION_FILE") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default_session_file()?,
    };

    Ok(Config {
        server_url: std::env::var("BICHON_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.into()),
        token: std::env::var("BICHON_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty()),
        session_file,
        timeout: Duration::from_secs(
            std::env::var("BICHON_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        ),
        cache_ttl: Duration::from_secs(
            std::env::var("BICHON_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        ),
        strings_file: std::env::var("BICHON_STRINGS").ok().map(PathBuf::from),
        log_json: std::env::var("BICHON_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false),
    })
}

fn default_session_file() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("cannot locate a home directory; set BICHON_SESSION_FILE"))?;
    Ok(PathBuf::from(home).join(".bichon-admin").join("session"))
}
