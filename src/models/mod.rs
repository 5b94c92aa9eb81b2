pub mod config;
pub mod observation;
pub mod payload;
pub mod query;
pub mod result;
