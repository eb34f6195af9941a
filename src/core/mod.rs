//! Core domain logic: series joining, provider fallback and simulation

pub mod analytics;
pub mod config;
pub mod country;
pub mod error;
pub mod fallback;
pub mod joiner;
pub mod log;
pub mod provider;
pub mod selection;
pub mod series;
pub mod simulator;

// Re-export main types for cleaner imports
pub use country::{Country, CountryTable};
pub use error::{SeriesError, SeriesResult};
pub use fallback::{AttemptOutcome, AttemptStatus, GdpChain, GdpFetch};
pub use joiner::{JoinOptions, JoinedSeries, SeriesJoiner};
pub use provider::{CaseSeriesProvider, GdpSeriesProvider};
pub use series::{CaseRecord, GdpPoint, JoinedRecord, ProviderKind};
pub use simulator::{SimulationParams, SimulationState, simulate};
