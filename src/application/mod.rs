// Backtest engine and result series
pub mod backtest;

// Report rendering
pub mod reporting;

// Raw columns -> classifier-ready snapshots
pub mod snapshot_builder;

// Parallel configuration sweeps
pub mod sweep;
