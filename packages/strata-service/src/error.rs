pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<strata_storage::Error> for Error {
	fn from(err: strata_storage::Error) -> Self {
		match err {
			strata_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			strata_storage::Error::Qdrant(inner) => Self::Index { message: inner.to_string() },
		}
	}
}
