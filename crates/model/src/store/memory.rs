use std::{
    collections::{HashMap, HashSet},
    future::Future,
};

use rust_decimal::Decimal;

use crate::{
    error::DataAccessError,
    types::{InvestmentRecord, InvestmentStatus, ReferralEdge, UserId, UserSummary},
};

use super::ReferralStore;

#[derive(Debug, Clone)]
struct StoredUser {
    summary: UserSummary,
    referred_by: Option<UserId>,
}

#[derive(Debug, Clone)]
struct StoredInvestment {
    user: UserId,
    amount: Decimal,
    status: InvestmentStatus,
}

/// A [`ReferralStore`] kept in memory.
///
/// Queries return users in insertion order. Sponsors are not required to
/// exist, and cycles in the referral relation are stored as given.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Vec<StoredUser>,
    index: HashMap<UserId, usize>,
    investments: Vec<StoredInvestment>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, replacing any user with the same id in place.
    pub fn insert_user(&mut self, summary: UserSummary, referred_by: Option<UserId>) -> &mut Self {
        let user = StoredUser {
            summary,
            referred_by,
        };
        match self.index.get(&user.summary.id) {
            Some(idx) => self.users[*idx] = user,
            None => {
                self.index.insert(user.summary.id.clone(), self.users.len());
                self.users.push(user);
            }
        }
        self
    }

    /// Record an investment.
    pub fn insert_investment(
        &mut self,
        user: UserId,
        amount: Decimal,
        status: InvestmentStatus,
    ) -> &mut Self {
        self.investments.push(StoredInvestment {
            user,
            amount,
            status,
        });
        self
    }

    /// Number of users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of investments.
    pub fn investment_count(&self) -> usize {
        self.investments.len()
    }

    /// Returns the sponsor of the given user.
    pub fn sponsor_of(&self, user: &UserId) -> Option<&UserId> {
        let idx = self.index.get(user)?;
        self.users[*idx].referred_by.as_ref()
    }

    fn members(&self, sponsors: &HashSet<UserId>, excluding: &HashSet<UserId>) -> Vec<UserSummary> {
        self.users
            .iter()
            .filter(|user| {
                user.referred_by
                    .as_ref()
                    .is_some_and(|sponsor| sponsors.contains(sponsor))
                    && !excluding.contains(&user.summary.id)
            })
            .map(|user| user.summary.clone())
            .collect()
    }

    fn investments(
        &self,
        users: &HashSet<UserId>,
        statuses: &[InvestmentStatus],
    ) -> Vec<InvestmentRecord> {
        self.investments
            .iter()
            .filter(|inv| users.contains(&inv.user) && statuses.contains(&inv.status))
            .map(|inv| InvestmentRecord {
                user: inv.user.clone(),
                amount: inv.amount,
            })
            .collect()
    }

    fn edges(&self, root: &UserId, max_depth: usize) -> Vec<ReferralEdge> {
        let mut reached = HashSet::from([root.clone()]);
        let mut frontier = HashSet::from([root.clone()]);
        for _ in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            let next = self
                .members(&frontier, &reached)
                .into_iter()
                .map(|member| member.id)
                .collect::<HashSet<_>>();
            reached.extend(next.iter().cloned());
            frontier = next;
        }
        self.users
            .iter()
            .filter(|user| *root != user.summary.id && reached.contains(&user.summary.id))
            .filter_map(|user| {
                Some(ReferralEdge {
                    member: user.summary.clone(),
                    sponsor: user.referred_by.clone()?,
                })
            })
            .collect()
    }
}

impl ReferralStore for MemoryStore {
    fn users_referred_by_any_of(
        &self,
        sponsors: &HashSet<UserId>,
        excluding: &HashSet<UserId>,
    ) -> impl Future<Output = Result<Vec<UserSummary>, DataAccessError>> + Send {
        let members = self.members(sponsors, excluding);
        async move { Ok(members) }
    }

    fn investments_for_users(
        &self,
        users: &HashSet<UserId>,
        statuses: &[InvestmentStatus],
    ) -> impl Future<Output = Result<Vec<InvestmentRecord>, DataAccessError>> + Send {
        let investments = self.investments(users, statuses);
        async move { Ok(investments) }
    }

    fn referral_edges(
        &self,
        root: &UserId,
        max_depth: usize,
    ) -> impl Future<Output = Result<Option<Vec<ReferralEdge>>, DataAccessError>> + Send {
        let edges = self.edges(root, max_depth);
        async move { Ok(Some(edges)) }
    }
}

/// A user row of a [`Dataset`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatasetUser {
    /// Summary.
    #[serde(flatten)]
    pub summary: UserSummary,
    /// Sponsor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<UserId>,
}

/// An investment row of a [`Dataset`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DatasetInvestment {
    /// Owner.
    pub user: UserId,
    /// Amount.
    pub amount: Decimal,
    /// Status.
    pub status: InvestmentStatus,
}

/// A snapshot of users and investments that can be loaded into a [`MemoryStore`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    /// Users.
    #[serde(default)]
    pub users: Vec<DatasetUser>,
    /// Investments.
    #[serde(default)]
    pub investments: Vec<DatasetInvestment>,
}

#[cfg(feature = "serde")]
impl Dataset {
    /// Check the dataset for negative amounts.
    pub fn validate(&self) -> Result<(), DataAccessError> {
        if let Some(inv) = self
            .investments
            .iter()
            .find(|inv| inv.amount.is_sign_negative())
        {
            return Err(DataAccessError::malformed(format!(
                "negative investment amount {} for user `{}`",
                inv.amount, inv.user
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl TryFrom<Dataset> for MemoryStore {
    type Error = DataAccessError;

    fn try_from(dataset: Dataset) -> Result<Self, Self::Error> {
        dataset.validate()?;
        let mut store = Self::new();
        for user in dataset.users {
            store.insert_user(user.summary, user.referred_by);
        }
        for inv in dataset.investments {
            store.insert_investment(inv.user, inv.amount, inv.status);
        }
        Ok(store)
    }
}
