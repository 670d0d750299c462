use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::planner::PlannerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// Log output format; JSON lines in production unless `LOG_FORMAT` says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn resolve(raw: Option<&str>, env: &Environment) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("json") => Self::Json,
            Some("pretty") | Some("text") => Self::Pretty,
            _ if matches!(env, Environment::Prod) => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub log_format: LogFormat,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Blueprint artifacts
    pub static_dir: PathBuf,
    pub public_base_url: Url,
    pub blueprint_render_timeout_seconds: u64,

    // AI Service (Gemini)
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub ai_service_timeout_seconds: u64,

    // Redis (AI insight cache)
    pub redis_url: Option<String>,
    pub redis_cache_ttl_seconds: u64,

    // Planner tables
    pub planner: PlannerConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let log_format = LogFormat::resolve(env::var("LOG_FORMAT").ok().as_deref(), &env);
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Blueprint artifacts
        let static_dir = PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));
        let public_base_url = Url::parse(
            &env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
        )
        .context("PUBLIC_BASE_URL must be an absolute URL")?;
        let blueprint_render_timeout_seconds = env::var("BLUEPRINT_RENDER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // AI Service
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|s| !s.trim().is_empty());
        let gemini_api_url = env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let ai_service_timeout_seconds = env::var("AI_SERVICE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60); // LLM calls are slow

        // Redis
        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());
        let redis_cache_ttl_seconds = env::var("REDIS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour default

        // Planner tables
        let mut planner = PlannerConfig::default();
        override_from_env("PLAN_GROUND_COVERAGE_RATIO", &mut planner.layout.ground_coverage_ratio)?;
        override_from_env("PLAN_ROOM_ASPECT_RATIO", &mut planner.layout.room_aspect_ratio)?;
        override_from_env(
            "PLAN_THROUGHPUT_SQFT_PER_MONTH",
            &mut planner.timeline.throughput_sqft_per_month,
        )?;
        override_from_env("PLAN_YARD_THRESHOLD", &mut planner.unit_policy.threshold)?;
        override_from_env("PLAN_RATE_BASIC", &mut planner.rates.basic)?;
        override_from_env("PLAN_RATE_STANDARD", &mut planner.rates.standard)?;
        override_from_env("PLAN_RATE_PREMIUM", &mut planner.rates.premium)?;
        planner.validate().context("Invalid planner configuration")?;

        Ok(Settings {
            env,
            log_format,
            server_addr,
            cors_allow_origins,
            static_dir,
            public_base_url,
            blueprint_render_timeout_seconds,
            gemini_api_key,
            gemini_api_url,
            gemini_model,
            ai_service_timeout_seconds,
            redis_url,
            redis_cache_ttl_seconds,
            planner,
        })
    }

    /// Local settings with AI and Redis disabled.
    #[cfg(test)]
    pub fn for_tests(static_dir: &std::path::Path) -> Self {
        Self {
            env: Environment::Dev,
            log_format: LogFormat::Pretty,
            server_addr: "127.0.0.1:0".to_string(),
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            static_dir: static_dir.to_path_buf(),
            public_base_url: Url::parse("http://127.0.0.1:8000").unwrap(),
            blueprint_render_timeout_seconds: 10,
            gemini_api_key: None,
            gemini_api_url: "http://127.0.0.1:9".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            ai_service_timeout_seconds: 1,
            redis_url: None,
            redis_cache_ttl_seconds: 60,
            planner: PlannerConfig::default(),
        }
    }
}

/// Replace `target` with the parsed value of `key` when the variable is set.
fn override_from_env<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Ok(raw) = env::var(key) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing_defaults_to_dev() {
        assert_eq!(Environment::from_str("PRODUCTION"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything"), Environment::Dev);
    }

    #[test]
    fn log_format_follows_environment_unless_set() {
        assert_eq!(LogFormat::resolve(None, &Environment::Prod), LogFormat::Json);
        assert_eq!(LogFormat::resolve(None, &Environment::Dev), LogFormat::Pretty);
        assert_eq!(
            LogFormat::resolve(Some("JSON"), &Environment::Dev),
            LogFormat::Json
        );
        assert_eq!(
            LogFormat::resolve(Some("pretty"), &Environment::Prod),
            LogFormat::Pretty
        );
    }

    #[test]
    fn override_parses_and_reports_bad_values() {
        let mut ratio = 0.65_f64;
        env::set_var("BUILDWISE_TEST_RATIO_OK", "0.7");
        override_from_env("BUILDWISE_TEST_RATIO_OK", &mut ratio).unwrap();
        assert_eq!(ratio, 0.7);

        env::set_var("BUILDWISE_TEST_RATIO_BAD", "lots");
        let err = override_from_env("BUILDWISE_TEST_RATIO_BAD", &mut ratio).unwrap_err();
        assert!(err.to_string().contains("BUILDWISE_TEST_RATIO_BAD"));
        assert_eq!(ratio, 0.7);

        override_from_env("BUILDWISE_TEST_RATIO_UNSET", &mut ratio).unwrap();
        assert_eq!(ratio, 0.7);
    }
}
