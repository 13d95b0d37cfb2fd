pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// A provider failure tagged with the configured `provider_id`.
	pub fn from_provider(provider_id: &str, err: tarot_providers::Error) -> Self {
		Self::Provider { message: format!("{provider_id}: {err}") }
	}
}
impl From<tarot_providers::Error> for Error {
	fn from(err: tarot_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<tarot_storage::Error> for Error {
	fn from(err: tarot_storage::Error) -> Self {
		match err {
			tarot_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<tarot_domain::cards::DrawError> for Error {
	fn from(err: tarot_domain::cards::DrawError) -> Self {
		Self::Internal { message: err.to_string() }
	}
}
