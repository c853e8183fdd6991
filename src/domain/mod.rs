// Allocation baskets and rebalance policy
pub mod allocation;

// Regime decision tree
pub mod classifier;

// Domain-specific error types
pub mod errors;

// Snapshot data model
pub mod indicators;

// Performance metrics
pub mod performance;

// Port interfaces
pub mod ports;

// Instrument price history
pub mod prices;

// Regime enumeration
pub mod regime;
