use sqlx::migrate::MigrateError;
use thiserror::Error;

use super::admin_client::AdminClientError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {message}")]
    Database { message: String },
    #[error("migration failed: {0}")]
    Migration(#[from] MigrateError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error(transparent)]
    AdminClient(#[from] AdminClientError),
}

impl InfraError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::config::LoadError> for InfraError {
    fn from(err: crate::config::LoadError) -> Self {
        Self::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_become_database_errors() {
        let err = InfraError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, InfraError::Database { .. }));
    }

    #[test]
    fn load_errors_become_configuration_errors() {
        let load = crate::config::LoadError::Invalid {
            key: "server.public_port",
            reason: "port must be greater than zero".into(),
        };
        let err = InfraError::from(load);
        assert!(
            err.to_string()
                .starts_with("configuration error: invalid configuration for `server.public_port`")
        );
    }
}
