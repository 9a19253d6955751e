use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u16,
    parse_u64,
};
use super::types::{
    ConfigError, CorsSettings, DatabaseSettings, ExamSettings, RuntimeSettings, ServerHost,
    ServerPort, ServerSettings, Settings, TelemetrySettings,
};

const DEFAULT_EXAM_PASSWORD: &str = "EXAM@123";

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("INVIGIL_HOST", "0.0.0.0");
        let port = env_or_default("INVIGIL_PORT", "4000");

        let environment =
            parse_environment(env_optional("INVIGIL_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("INVIGIL_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let exam_password = env_or_default("EXAM_PASSWORD", DEFAULT_EXAM_PASSWORD);
        let session_duration_minutes = parse_u64(
            "SESSION_DURATION_MINUTES",
            env_or_default("SESSION_DURATION_MINUTES", "45"),
        )?;
        let reading_time_seconds =
            parse_u64("READING_TIME_SECONDS", env_or_default("READING_TIME_SECONDS", "120"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "postgres");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "invigil_db");
        let database_url = env_optional("DATABASE_URL");

        let cors_origins = parse_cors_origins(env_optional("ALLOWED_ORIGINS"))?;

        let log_level = env_or_default("INVIGIL_LOG_LEVEL", "info");
        let json = env_optional("INVIGIL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            exam: ExamSettings { exam_password, session_duration_minutes, reading_time_seconds },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            cors: CorsSettings { origins: cors_origins },
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

    pub(crate) fn exam(&self) -> &ExamSettings {
        &self.exam
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exam.session_duration_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "SESSION_DURATION_MINUTES",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.exam.exam_password == DEFAULT_EXAM_PASSWORD {
            return Err(ConfigError::MissingSecret("EXAM_PASSWORD"));
        }
        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}
