use std::collections::HashMap;

use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    rates::CommissionRates,
    types::{UserId, UserSummary},
};

/// Status of a member row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MemberStatus {
    /// Qualifying (active or completed) investment total above zero.
    Active,
    /// Qualifying investment total of zero.
    Inactive,
}

/// A member row of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberSummary {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Registration time.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub joined_date: OffsetDateTime,
    /// Cached team size, `0` when unknown.
    pub team_count: u64,
    /// Sum of qualifying investments.
    pub total_investment: Decimal,
    /// Status.
    pub status: MemberStatus,
}

/// Aggregates of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelStats {
    /// Number of members.
    pub count: u64,
    /// Business volume.
    pub volume: Decimal,
    /// Commission owed to the root, `volume * rate`.
    pub commission: Decimal,
    /// Commission rate of the level.
    pub rate: Decimal,
}

/// A level of the downline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelReport {
    /// Level, starting from `1`.
    pub level: usize,
    /// Members in the order returned by the store.
    pub members: Vec<MemberSummary>,
    /// Aggregates.
    pub stats: LevelStats,
}

/// Network-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Totals {
    /// Number of members over all levels.
    pub total_network_size: u64,
    /// Business volume over all levels.
    pub overall_business_volume: Decimal,
    /// Commission over all levels.
    pub total_commission: Decimal,
}

/// Report of a downline computation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct DownlineReport {
    /// Totals.
    pub totals: Totals,
    /// One entry per level, in ascending order.
    pub levels: Vec<LevelReport>,
}

impl DownlineReport {
    /// Build a report from the members of each level and the qualifying
    /// investment sum of each member.
    pub(crate) fn build(
        levels: Vec<Vec<UserSummary>>,
        investments: &HashMap<UserId, Decimal>,
        rates: &CommissionRates,
    ) -> crate::Result<Self> {
        let mut totals = Totals::default();
        let levels = levels
            .into_iter()
            .zip(1..)
            .map(|(members, level)| {
                let report = LevelReport::build(level, members, investments, rates.rate(level))?;
                totals.accumulate(&report.stats)?;
                Ok(report)
            })
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(Self { totals, levels })
    }

    /// Get the entry of the given level (1-based).
    pub fn level(&self, level: usize) -> Option<&LevelReport> {
        self.levels.get(level.checked_sub(1)?)
    }

    /// Iterate over the members of all levels, shallowest first.
    pub fn members(&self) -> impl Iterator<Item = &MemberSummary> {
        self.levels.iter().flat_map(|level| level.members.iter())
    }

    /// The deepest level with at least one member, `0` for an empty network.
    pub fn depth(&self) -> usize {
        self.levels
            .iter()
            .rev()
            .find(|level| level.stats.count != 0)
            .map(|level| level.level)
            .unwrap_or(0)
    }

    /// Returns whether no level has members.
    pub fn is_empty(&self) -> bool {
        self.totals.total_network_size == 0
    }
}

impl LevelReport {
    fn build(
        level: usize,
        members: Vec<UserSummary>,
        investments: &HashMap<UserId, Decimal>,
        rate: Decimal,
    ) -> crate::Result<Self> {
        let mut volume = Decimal::ZERO;
        let members = members
            .into_iter()
            .map(|member| {
                let total_investment = investments
                    .get(&member.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                volume = volume
                    .checked_add(total_investment)
                    .ok_or(crate::Error::Overflow("level volume"))?;
                let status = if total_investment.is_zero() {
                    MemberStatus::Inactive
                } else {
                    MemberStatus::Active
                };
                Ok(MemberSummary {
                    id: member.id,
                    name: member.name,
                    email: member.email,
                    joined_date: member.joined_date,
                    team_count: member.team_count.unwrap_or(0),
                    total_investment,
                    status,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;
        let count = u64::try_from(members.len())
            .map_err(|_| crate::Error::Overflow("member count"))?;
        let commission = volume
            .checked_mul(rate)
            .ok_or(crate::Error::Overflow("level commission"))?;
        Ok(Self {
            level,
            stats: LevelStats {
                count,
                volume,
                commission,
                rate,
            },
            members,
        })
    }
}

impl Totals {
    fn accumulate(&mut self, stats: &LevelStats) -> crate::Result<()> {
        self.total_network_size = self
            .total_network_size
            .checked_add(stats.count)
            .ok_or(crate::Error::Overflow("network size"))?;
        self.overall_business_volume = self
            .overall_business_volume
            .checked_add(stats.volume)
            .ok_or(crate::Error::Overflow("business volume"))?;
        self.total_commission = self
            .total_commission
            .checked_add(stats.commission)
            .ok_or(crate::Error::Overflow("total commission"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::test::member;

    use super::*;

    #[test]
    fn build_levels() -> crate::Result<()> {
        let investments = HashMap::from([(UserId::new("a"), dec!(1000)), (UserId::new("c"), dec!(40))]);
        let rates = CommissionRates::new(vec![dec!(0.05), dec!(0.02)]);
        let report = DownlineReport::build(
            vec![
                vec![member("a"), member("b")],
                vec![member("c")],
                vec![],
            ],
            &investments,
            &rates,
        )?;

        assert_eq!(report.levels.len(), 3);
        let first = report.level(1).unwrap();
        assert_eq!(first.stats.count, 2);
        assert_eq!(first.stats.volume, dec!(1000));
        assert_eq!(first.stats.commission, dec!(50));
        assert_eq!(first.members[0].status, MemberStatus::Active);
        assert_eq!(first.members[1].status, MemberStatus::Inactive);
        assert_eq!(first.members[1].total_investment, Decimal::ZERO);

        let third = report.level(3).unwrap();
        assert_eq!(third.level, 3);
        assert_eq!(third.stats.rate, Decimal::ZERO);
        assert_eq!(third.stats.count, 0);

        assert_eq!(report.totals.total_network_size, 3);
        assert_eq!(report.totals.overall_business_volume, dec!(1040));
        assert_eq!(report.totals.total_commission, dec!(50.80));
        assert_eq!(report.depth(), 2);
        assert!(report.level(0).is_none());
        assert!(report.level(4).is_none());
        Ok(())
    }

    #[test]
    fn zero_total_is_inactive() -> crate::Result<()> {
        let investments = HashMap::from([
            (UserId::new("a"), Decimal::ZERO),
            (UserId::new("b"), dec!(0.01)),
        ]);
        let report = DownlineReport::build(
            vec![vec![member("a"), member("b")]],
            &investments,
            &CommissionRates::default(),
        )?;
        let statuses = report
            .members()
            .map(|member| member.status)
            .collect::<Vec<_>>();
        assert_eq!(statuses, [MemberStatus::Inactive, MemberStatus::Active]);
        assert_eq!(report.totals.total_network_size, 2);
        Ok(())
    }

    #[test]
    fn volume_overflow() {
        let investments = HashMap::from([
            (UserId::new("a"), Decimal::MAX),
            (UserId::new("b"), Decimal::MAX),
        ]);
        let err = DownlineReport::build(
            vec![vec![member("a"), member("b")]],
            &investments,
            &CommissionRates::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::Overflow(_)));
    }
}
