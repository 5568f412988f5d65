pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures while loading or validating the Fovea configuration file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unable to read the configuration file at {path:?}.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("The configuration file at {path:?} is not valid TOML.")]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid configuration: {message}")]
	Validation { message: String },
}
