use std::{
    collections::{HashMap, HashSet},
    future::Future,
};

use rust_decimal::Decimal;

use crate::{
    error::{DataAccessError, QueryKind},
    rates::CommissionRates,
    report::DownlineReport,
    store::ReferralStore,
    types::{InvestmentStatus, ReferralEdge, UserId, UserSummary},
};

/// Cooperative cancellation.
pub mod cancel;

/// Engine config.
pub mod config;

pub use self::{
    cancel::{cancellation, CancelHandle, Cancellation},
    config::{EngineConfig, TraversalStrategy, DEFAULT_MAX_DEPTH},
};

/// Computes the downline of a user level by level.
///
/// The engine holds no state between computations: every call starts from
/// a fresh visited set, so concurrent calls never interfere.
#[derive(Debug, Clone)]
pub struct DownlineEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S> DownlineEngine<S> {
    /// Create an engine with the default config.
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with the given config.
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Get the config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ReferralStore> DownlineEngine<S> {
    /// Compute the downline report of `root`.
    ///
    /// An unknown root is not an error: it simply has no members.
    pub async fn compute_downline(
        &self,
        root: &UserId,
        rates: &CommissionRates,
    ) -> crate::Result<DownlineReport> {
        self.compute_downline_with_cancel(root, rates, &Cancellation::never())
            .await
    }

    /// Compute the downline report of `root`, giving up with
    /// [`Error::Cancelled`](crate::Error::Cancelled) once `cancel` is raised.
    #[tracing::instrument(
        name = "compute_downline",
        skip(self, rates, cancel),
        fields(root = %root, strategy = %self.config.strategy, max_depth = self.config.max_depth),
    )]
    pub async fn compute_downline_with_cancel(
        &self,
        root: &UserId,
        rates: &CommissionRates,
        cancel: &Cancellation,
    ) -> crate::Result<DownlineReport> {
        let max_depth = self.config.max_depth;
        if max_depth == 0 {
            return Err(crate::Error::InvalidArgument("max depth must be positive"));
        }

        let edges = self.fetch_edges(root, cancel).await?;
        let is_bulk = edges.is_some();

        let mut walk = Walk::new(root);
        let mut levels = Vec::with_capacity(max_depth);
        let mut investments = HashMap::<UserId, Decimal>::new();

        for level in 1..=max_depth {
            cancel.check()?;
            let members = match edges.as_deref() {
                Some(edges) => walk.advance_with_edges(edges),
                None if walk.is_exhausted() => walk.advance(vec![]),
                None => {
                    let candidates = cancel
                        .run(self.query(
                            QueryKind::Members,
                            self.store
                                .users_referred_by_any_of(walk.frontier(), walk.visited()),
                        ))
                        .await?;
                    walk.advance(candidates)
                }
            };
            tracing::trace!(level, count = members.len(), "members found");
            if !is_bulk && !members.is_empty() {
                self.collect_investments(&members, &mut investments, cancel)
                    .await?;
            }
            levels.push(members);
        }

        if is_bulk {
            let members = levels.iter().flatten().cloned().collect::<Vec<_>>();
            if !members.is_empty() {
                self.collect_investments(&members, &mut investments, cancel)
                    .await?;
            }
        }

        let report = DownlineReport::build(levels, &investments, rates)?;
        for level in report.levels.iter().filter(|level| level.stats.count != 0) {
            tracing::debug!(
                level = level.level,
                count = level.stats.count,
                volume = %level.stats.volume,
                commission = %level.stats.commission,
                "level computed"
            );
        }
        tracing::info!(
            network_size = report.totals.total_network_size,
            volume = %report.totals.overall_business_volume,
            commission = %report.totals.total_commission,
            "downline computed"
        );
        Ok(report)
    }

    async fn fetch_edges(
        &self,
        root: &UserId,
        cancel: &Cancellation,
    ) -> crate::Result<Option<Vec<ReferralEdge>>> {
        let strategy = self.config.strategy;
        if strategy == TraversalStrategy::LevelByLevel {
            return Ok(None);
        }
        let edges = cancel
            .run(self.query(
                QueryKind::ReferralEdges,
                self.store.referral_edges(root, self.config.max_depth),
            ))
            .await?;
        match (edges, strategy) {
            (None, TraversalStrategy::Bulk) => Err(crate::Error::BulkUnsupported),
            (None, _) => {
                tracing::debug!("bulk traversal unsupported, falling back to level-by-level");
                Ok(None)
            }
            (Some(edges), _) => {
                tracing::trace!(edges = edges.len(), "referral edges fetched");
                Ok(Some(edges))
            }
        }
    }

    async fn collect_investments(
        &self,
        members: &[UserSummary],
        sums: &mut HashMap<UserId, Decimal>,
        cancel: &Cancellation,
    ) -> crate::Result<()> {
        let ids = members
            .iter()
            .map(|member| member.id.clone())
            .collect::<HashSet<_>>();
        let records = cancel
            .run(self.query(
                QueryKind::Investments,
                self.store
                    .investments_for_users(&ids, &InvestmentStatus::QUALIFYING),
            ))
            .await?;
        tracing::trace!(members = ids.len(), records = records.len(), "investments fetched");
        for record in records {
            if !ids.contains(&record.user) {
                tracing::warn!(user = %record.user, "ignored investment of a non-member");
                continue;
            }
            if record.amount.is_sign_negative() {
                return Err(DataAccessError::malformed(format!(
                    "negative investment amount {} for user `{}`",
                    record.amount, record.user
                ))
                .into());
            }
            let sum = sums.entry(record.user).or_default();
            *sum = sum
                .checked_add(record.amount)
                .ok_or(crate::Error::Overflow("member investment"))?;
        }
        Ok(())
    }

    async fn query<T>(
        &self,
        query: QueryKind,
        fut: impl Future<Output = Result<T, DataAccessError>>,
    ) -> crate::Result<T> {
        let res = match self.config.query_timeout {
            Some(after) => tokio::time::timeout(after, fut)
                .await
                .map_err(|_| DataAccessError::Timeout { query, after })?,
            None => fut.await,
        };
        Ok(res?)
    }
}

/// Breadth-first walk state, scoped to one computation.
struct Walk {
    visited: HashSet<UserId>,
    frontier: HashSet<UserId>,
}

impl Walk {
    fn new(root: &UserId) -> Self {
        Self {
            visited: HashSet::from([root.clone()]),
            frontier: HashSet::from([root.clone()]),
        }
    }

    fn visited(&self) -> &HashSet<UserId> {
        &self.visited
    }

    fn frontier(&self) -> &HashSet<UserId> {
        &self.frontier
    }

    /// Once the frontier is empty no deeper level can have members.
    fn is_exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Accept the unvisited candidates as the next level and make them the frontier.
    fn advance(&mut self, candidates: Vec<UserSummary>) -> Vec<UserSummary> {
        let members = candidates
            .into_iter()
            .filter(|member| self.visited.insert(member.id.clone()))
            .collect::<Vec<_>>();
        self.frontier = members.iter().map(|member| member.id.clone()).collect();
        members
    }

    fn advance_with_edges(&mut self, edges: &[ReferralEdge]) -> Vec<UserSummary> {
        let candidates = edges
            .iter()
            .filter(|edge| {
                self.frontier.contains(&edge.sponsor) && !self.visited.contains(&edge.member.id)
            })
            .map(|edge| edge.member.clone())
            .collect();
        self.advance(candidates)
    }
}

#[cfg(test)]
mod tests {
    use crate::test::member;

    use super::*;

    fn edge(id: &str, sponsor: &str) -> ReferralEdge {
        ReferralEdge {
            member: member(id),
            sponsor: sponsor.into(),
        }
    }

    #[test]
    fn walk_skips_visited() {
        let mut walk = Walk::new(&"r".into());
        let level = walk.advance(vec![member("a"), member("r"), member("a"), member("b")]);
        let ids = level.iter().map(|m| m.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(walk.frontier().len(), 2);
        assert_eq!(walk.visited().len(), 3);
    }

    #[test]
    fn walk_with_edges() {
        let edges = [
            edge("a", "r"),
            edge("c", "a"),
            edge("b", "r"),
            edge("r", "c"),
        ];
        let mut walk = Walk::new(&"r".into());
        let first = walk.advance_with_edges(&edges);
        assert_eq!(first.len(), 2);
        let second = walk.advance_with_edges(&edges);
        assert_eq!(second, [member("c")]);
        let third = walk.advance_with_edges(&edges);
        assert!(third.is_empty());
        assert!(walk.is_exhausted());
    }
}
