pub mod query;
pub mod vector;
