use std::{borrow::Borrow, fmt, str::FromStr};

use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Opaque user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(String);

impl UserId {
    /// Create a new user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for UserId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Investment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum::EnumIter, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InvestmentStatus {
    /// Waiting for approval.
    Pending,
    /// Approved and running.
    Active,
    /// Ran to completion.
    Completed,
    /// Stopped early.
    Terminated,
    /// Rejected by an admin.
    Rejected,
}

impl InvestmentStatus {
    /// Statuses counted towards business volume.
    pub const QUALIFYING: [Self; 2] = [Self::Active, Self::Completed];

    /// Returns whether investments with this status count towards business volume.
    pub fn is_qualifying(&self) -> bool {
        Self::QUALIFYING.contains(self)
    }
}

/// A network member as returned by the membership query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserSummary {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Registration time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub joined_date: OffsetDateTime,
    /// Cached team size maintained outside the engine. Display only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub team_count: Option<u64>,
}

/// The qualifying part of an investment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvestmentRecord {
    /// Owner.
    pub user: UserId,
    /// Amount.
    pub amount: Decimal,
}

/// A member together with its sponsor, as returned by a bulk traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferralEdge {
    /// The referred member.
    pub member: UserSummary,
    /// The sponsor of the member.
    pub sponsor: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifying_statuses() {
        use strum::IntoEnumIterator;

        let qualifying = InvestmentStatus::iter()
            .filter(InvestmentStatus::is_qualifying)
            .collect::<Vec<_>>();
        assert_eq!(
            qualifying,
            [InvestmentStatus::Active, InvestmentStatus::Completed]
        );
    }

    #[test]
    fn status_names() {
        assert_eq!(
            "terminated".parse::<InvestmentStatus>().unwrap(),
            InvestmentStatus::Terminated
        );
        assert_eq!(InvestmentStatus::Pending.to_string(), "pending");
    }
}
