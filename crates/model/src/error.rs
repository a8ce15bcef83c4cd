use std::time::Duration;

use rust_decimal::Decimal;

/// The kind of query issued against a [`ReferralStore`](crate::store::ReferralStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum QueryKind {
    /// Members referred by a frontier of sponsors.
    Members,
    /// Investments held by a set of members.
    Investments,
    /// Bulk fetch of referral edges.
    ReferralEdges,
}

/// Data access error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DataAccessError {
    /// The query did not complete in time.
    #[error("`{query}` query timed out after {after:?}")]
    Timeout {
        /// The query that timed out.
        query: QueryKind,
        /// The configured timeout.
        after: Duration,
    },
    /// The backend is unavailable.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The backend returned something that cannot be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl DataAccessError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl ToString) -> Self {
        Self::Unavailable(msg.to_string())
    }

    /// Create a malformed response error.
    pub fn malformed(msg: impl ToString) -> Self {
        Self::Malformed(msg.to_string())
    }

    /// Returns whether this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data access error.
    #[error("data access: {0}")]
    DataAccess(#[from] DataAccessError),
    /// The computation was cancelled by the caller.
    #[error("cancelled")]
    Cancelled,
    /// Overflow.
    #[error("overflow: {0}")]
    Overflow(&'static str),
    /// The store cannot serve referral edges in bulk.
    #[error("bulk traversal is not supported by the store")]
    BulkUnsupported,
    /// Rate out of `[0, 1]`.
    #[error("invalid rate {rate} for level {level}")]
    InvalidRate {
        /// Level (1-based).
        level: usize,
        /// The rejected rate.
        rate: Decimal,
    },
    /// Invalid Argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// Returns the underlying data access error, if any.
    pub fn as_data_access(&self) -> Option<&DataAccessError> {
        match self {
            Self::DataAccess(err) => Some(err),
            _ => None,
        }
    }
}
