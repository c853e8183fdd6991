// CSV-backed data sources
pub mod csv_source;

// In-memory sources for tests
pub mod mock;
