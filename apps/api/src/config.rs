use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub prompts_dir: String,
    /// Opt-in balanced-brace JSON scan. Off by default; the first/last
    /// brace heuristic is the compatible behavior.
    pub strict_json_scan: bool,
    pub max_file_size_kb: usize,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_requests: usize,
    pub frontend_url: String,
    pub app_env: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            prompts_dir: std::env::var("PROMPTS_DIR").unwrap_or_else(|_| "prompts".to_string()),
            strict_json_scan: env_flag("STRICT_JSON_SCAN"),
            max_file_size_kb: std::env::var("MAX_FILE_SIZE_KB")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<usize>()
                .context("MAX_FILE_SIZE_KB must be a number")?,
            rate_limit_window_ms: std::env::var("RATE_LIMIT_WINDOW_MS")
                .unwrap_or_else(|_| "900000".to_string())
                .parse::<u64>()
                .context("RATE_LIMIT_WINDOW_MS must be a number")?,
            rate_limit_max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse::<usize>()
                .context("RATE_LIMIT_MAX_REQUESTS must be a number")?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_kb * 1024
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
