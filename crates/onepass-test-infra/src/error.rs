use std::result::Result as StdResult;
use thiserror::Error;

/// Errors raised while starting or talking to a test container.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("MySQL error: {0}")]
    MySql(#[from] sqlx::Error),
}

pub type Result<T> = StdResult<T, TestInfraError>;
