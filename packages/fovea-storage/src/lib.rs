pub mod db;
pub mod embeddings;
pub mod models;
pub mod partners;
pub mod qdrant;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
