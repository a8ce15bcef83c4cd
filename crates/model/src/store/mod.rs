use std::{collections::HashSet, future::Future, sync::Arc};

use crate::{
    error::DataAccessError,
    types::{InvestmentRecord, InvestmentStatus, ReferralEdge, UserId, UserSummary},
};

/// In-memory store.
pub mod memory;

pub use self::memory::MemoryStore;

#[cfg(feature = "serde")]
pub use self::memory::{Dataset, DatasetInvestment, DatasetUser};

/// Read-only access to users and their investments.
pub trait ReferralStore {
    /// Users whose sponsor is one of `sponsors` and whose id is not in `excluding`.
    ///
    /// The engine keeps the returned order.
    fn users_referred_by_any_of(
        &self,
        sponsors: &HashSet<UserId>,
        excluding: &HashSet<UserId>,
    ) -> impl Future<Output = Result<Vec<UserSummary>, DataAccessError>> + Send;

    /// Investments owned by any of `users` whose status is one of `statuses`.
    fn investments_for_users(
        &self,
        users: &HashSet<UserId>,
        statuses: &[InvestmentStatus],
    ) -> impl Future<Output = Result<Vec<InvestmentRecord>, DataAccessError>> + Send;

    /// Fetch every referral edge reachable from `root` within `max_depth` levels in one go.
    ///
    /// Returns `None` if the store cannot answer graph queries.
    fn referral_edges(
        &self,
        root: &UserId,
        max_depth: usize,
    ) -> impl Future<Output = Result<Option<Vec<ReferralEdge>>, DataAccessError>> + Send {
        let _ = (root, max_depth);
        async { Ok(None) }
    }
}

impl<S: ReferralStore + ?Sized + Sync> ReferralStore for &S {
    fn users_referred_by_any_of(
        &self,
        sponsors: &HashSet<UserId>,
        excluding: &HashSet<UserId>,
    ) -> impl Future<Output = Result<Vec<UserSummary>, DataAccessError>> + Send {
        (**self).users_referred_by_any_of(sponsors, excluding)
    }

    fn investments_for_users(
        &self,
        users: &HashSet<UserId>,
        statuses: &[InvestmentStatus],
    ) -> impl Future<Output = Result<Vec<InvestmentRecord>, DataAccessError>> + Send {
        (**self).investments_for_users(users, statuses)
    }

    fn referral_edges(
        &self,
        root: &UserId,
        max_depth: usize,
    ) -> impl Future<Output = Result<Option<Vec<ReferralEdge>>, DataAccessError>> + Send {
        (**self).referral_edges(root, max_depth)
    }
}

impl<S: ReferralStore + ?Sized + Send + Sync> ReferralStore for Arc<S> {
    fn users_referred_by_any_of(
        &self,
        sponsors: &HashSet<UserId>,
        excluding: &HashSet<UserId>,
    ) -> impl Future<Output = Result<Vec<UserSummary>, DataAccessError>> + Send {
        (**self).users_referred_by_any_of(sponsors, excluding)
    }

    fn investments_for_users(
        &self,
        users: &HashSet<UserId>,
        statuses: &[InvestmentStatus],
    ) -> impl Future<Output = Result<Vec<InvestmentRecord>, DataAccessError>> + Send {
        (**self).investments_for_users(users, statuses)
    }

    fn referral_edges(
        &self,
        root: &UserId,
        max_depth: usize,
    ) -> impl Future<Output = Result<Option<Vec<ReferralEdge>>, DataAccessError>> + Send {
        (**self).referral_edges(root, max_depth)
    }
}
