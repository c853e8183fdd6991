mod engine;
mod result;

pub use engine::{BacktestEngine, BenchmarkSpec, default_benchmarks};
pub use result::{BacktestEntry, BacktestResult};
