pub mod oecd_tracker;
pub mod pomber;
pub mod trading_economics;
pub mod util;
pub mod world_bank;

pub use oecd_tracker::OecdTrackerProvider;
pub use pomber::PomberProvider;
pub use trading_economics::TradingEconomicsProvider;
pub use world_bank::WorldBankProvider;
