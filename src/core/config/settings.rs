use super::parsing::{
    env_flag, env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment,
    parse_positive, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, BulkSettings, ConfigError, CorsSettings, DatabaseSettings, ProgressSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings,
    Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("PORTAL_HOST", "0.0.0.0");
        let port = env_or_default("PORTAL_PORT", "8000");

        let environment =
            parse_environment(env_optional("PORTAL_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("PORTAL_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Consulting Portal API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let explicit_secret = env_optional("SECRET_KEY");
        if strict_config && explicit_secret.is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }
        let secret_key = explicit_secret.unwrap_or_else(load_or_create_secret_key);

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "portal");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "consultportal");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u32(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "20"),
        )?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let max_pairs = parse_positive("BULK_MAX_PAIRS", env_or_default("BULK_MAX_PAIRS", "500"))?;
        let rate_limit =
            parse_positive("BULK_RATE_LIMIT", env_or_default("BULK_RATE_LIMIT", "30"))?;
        let rate_window_seconds = parse_positive(
            "BULK_RATE_WINDOW_SECONDS",
            env_or_default("BULK_RATE_WINDOW_SECONDS", "60"),
        )?;

        let default_days =
            parse_positive("PROGRESS_DEFAULT_DAYS", env_or_default("PROGRESS_DEFAULT_DAYS", "30"))?;
        let company_months = parse_positive(
            "PROGRESS_COMPANY_MONTHS",
            env_or_default("PROGRESS_COMPANY_MONTHS", "6"),
        )?;
        let system_months = parse_positive(
            "PROGRESS_SYSTEM_MONTHS",
            env_or_default("PROGRESS_SYSTEM_MONTHS", "12"),
        )?;

        let log_level = env_or_default("PORTAL_LOG_LEVEL", "info");
        let json = env_flag("PORTAL_LOG_JSON");
        let prometheus_enabled = env_flag("PROMETHEUS_ENABLED");

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            bulk: BulkSettings {
                max_pairs: usize::try_from(max_pairs).unwrap_or(usize::MAX),
                rate_limit,
                rate_window_seconds,
            },
            progress: ProgressSettings {
                default_days: i64::try_from(default_days).map_err(|_| {
                    ConfigError::InvalidValue {
                        field: "PROGRESS_DEFAULT_DAYS",
                        value: default_days.to_string(),
                    }
                })?,
                company_months: month_count("PROGRESS_COMPANY_MONTHS", company_months)?,
                system_months: month_count("PROGRESS_SYSTEM_MONTHS", system_months)?,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn bulk(&self) -> &BulkSettings {
        &self.bulk
    }

    pub(crate) fn progress(&self) -> &ProgressSettings {
        &self.progress
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.algorithm != "HS256" {
            return Err(ConfigError::InvalidValue {
                field: "ALGORITHM",
                value: self.security.algorithm.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}

// Month windows beyond ten years are almost certainly a typo.
fn month_count(field: &'static str, value: u64) -> Result<u32, ConfigError> {
    if value > 120 {
        return Err(ConfigError::InvalidValue { field, value: value.to_string() });
    }
    Ok(value as u32)
}
