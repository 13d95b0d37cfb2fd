#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Timed out after {timeout_ms} ms while running {operation}.")]
	Timeout { operation: &'static str, timeout_ms: u64 },
}
