pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Insufficient permission: {message}")]
	InsufficientPermission { message: String },
	#[error("Smart search is not enabled on this server.")]
	FeatureDisabled,
	#[error("Query contains no text and no similarTo references.")]
	QueryNotUnderstood,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl From<fovea_storage::Error> for Error {
	fn from(err: fovea_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<fovea_providers::Error> for Error {
	fn from(err: fovea_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

// A combiner failure means the resolver handed over inconsistent vectors; that is a
// defect in this service, not a client error.
impl From<fovea_domain::vector::Error> for Error {
	fn from(err: fovea_domain::vector::Error) -> Self {
		Self::Internal { message: err.to_string() }
	}
}
