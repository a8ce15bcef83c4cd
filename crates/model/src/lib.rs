#![deny(missing_docs)]
#![deny(unreachable_pub)]
#![warn(clippy::arithmetic_side_effects)]

//! Referral downline and multi-level commission engine.
//!
//! Given a root user, [`DownlineEngine`] walks the referral tree breadth-first
//! for a fixed number of levels, sums the qualifying investment volume of
//! every level and applies a per-level [`CommissionRates`] table.

/// Basic types.
pub mod types;

/// Commission rate table.
pub mod rates;

/// Data access.
pub mod store;

/// Downline report.
pub mod report;

/// Downline engine.
pub mod engine;

/// Error type.
pub mod error;


pub use engine::{
    cancellation, CancelHandle, Cancellation, DownlineEngine, EngineConfig, TraversalStrategy,
    DEFAULT_MAX_DEPTH,
};
pub use error::{DataAccessError, Error, QueryKind};
pub use rates::CommissionRates;
pub use report::{DownlineReport, LevelReport, LevelStats, MemberStatus, MemberSummary, Totals};
pub use store::{MemoryStore, ReferralStore};
pub use types::{InvestmentRecord, InvestmentStatus, ReferralEdge, UserId, UserSummary};

/// Alias for result.
pub type Result<T> = std::result::Result<T, Error>;
