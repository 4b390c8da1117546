//! Read-only reports.
//!
//! A [`LedgerView`] borrows a registry and a linker immutably and composes
//! them with the aggregation engine. It cannot mutate either, and the same
//! underlying data always produces equal reports.

use crate::analytics::{
    distribution, frequency, ratios, time_series, volume, weighted_combination, Dimension,
    Distribution, FrequencyNode, Measurable, Ratios, TimeSeries, VolumeSummary, CONCENTRATION,
};
use crate::chain::{Domain, Record};
use crate::config::LedgerConfig;
use crate::core::{Hash256, LedgerError, Result, Timestamp};
use crate::linker::{LinkDomain, LinkRecord, Linker};
use crate::registry::{ChainedRegistry, RecordFilter};
use serde::Serialize;

/// Volume and links of one subject.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary<P> {
    /// Subject the summary covers
    pub subject: String,
    /// Records in the subject's history
    pub record_count: usize,
    /// Current state: the subject's latest record
    pub latest: Option<Record<P>>,
    /// Volume over the subject's history
    pub volume: VolumeSummary,
    /// Ratios derived from `volume`
    pub ratios: Ratios,
    /// Links attached to any of the subject's records, in link order
    pub links: Vec<LinkRecord>,
}

/// Records and aggregates within `[from, until)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary<P> {
    /// Inclusive period start
    pub from: Timestamp,
    /// Exclusive period end
    pub until: Timestamp,
    /// Records inside the period, in insertion order
    pub records: Vec<Record<P>>,
    /// Volume over the period
    pub volume: VolumeSummary,
    /// Ratios derived from `volume`
    pub ratios: Ratios,
    /// Counts by classification label
    pub frequency: FrequencyNode,
    /// Per-window volumes at the configured width
    pub series: TimeSeries,
}

/// Position of one record in its chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHash {
    /// Domain tag of the chain the record lives in
    pub chain: String,
    /// Position in that chain
    pub sequence_number: u64,
    /// Hash of the preceding record
    pub previous_hash: Hash256,
    /// Stored record hash
    pub record_hash: Hash256,
}

impl ChainHash {
    fn of<P>(chain: &str, record: &Record<P>) -> Self {
        Self {
            chain: chain.to_string(),
            sequence_number: record.sequence_number(),
            previous_hash: *record.previous_hash(),
            record_hash: *record.record_hash(),
        }
    }
}

/// A record, its links, and the hashes an external auditor needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTrace<P> {
    /// The traced record
    pub record: Record<P>,
    /// Links attached to it, in link order
    pub links: Vec<LinkRecord>,
    /// The record's chain position followed by each link's
    pub chain_hashes: Vec<ChainHash>,
}

/// Whole-ledger snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerOverview {
    /// Records in the registry
    pub record_count: usize,
    /// Links in the linker
    pub link_count: usize,
    /// Whether the record chain verifies
    pub chain_valid: bool,
    /// Whether the link chain verifies
    pub links_valid: bool,
    /// Head hash of the record chain
    pub head_hash: Hash256,
    /// Head hash of the link chain
    pub link_head_hash: Hash256,
    /// Volume over every record
    pub volume: VolumeSummary,
    /// Ratios derived from `volume`
    pub ratios: Ratios,
    /// Magnitude share per subject
    pub distribution: Distribution,
    /// Weighted combination of the ratios and the concentration index
    pub exposure_index: f64,
}

/// Read-only view over one registry and its linker.
pub struct LedgerView<'a, D: Domain> {
    registry: &'a ChainedRegistry<D>,
    linker: &'a Linker,
    config: LedgerConfig,
}

impl<'a, D> LedgerView<'a, D>
where
    D: Domain,
    D::Payload: Measurable,
{
    /// View with the default configuration.
    pub fn new(registry: &'a ChainedRegistry<D>, linker: &'a Linker) -> Self {
        Self::with_config(registry, linker, LedgerConfig::default())
    }

    /// View with an explicit configuration.
    pub fn with_config(
        registry: &'a ChainedRegistry<D>,
        linker: &'a Linker,
        config: LedgerConfig,
    ) -> Self {
        Self {
            registry,
            linker,
            config,
        }
    }

    /// Records matching a filter; the configured page size applies when the
    /// filter has no limit.
    pub fn list(&self, filter: &RecordFilter) -> Vec<Record<D::Payload>> {
        let mut filter = filter.clone();
        if filter.limit.is_none() {
            filter.limit = self.config.default_page_size;
        }
        self.registry.query(&filter).into_iter().cloned().collect()
    }

    /// Volume and links for one subject.
    pub fn entity_summary(&self, subject: &str) -> EntitySummary<D::Payload> {
        let history = self.registry.history(subject);
        let volume = volume(history.iter().copied());

        let mut links: Vec<LinkRecord> = history
            .iter()
            .flat_map(|r| self.linker.links_for(r.id().as_str()))
            .cloned()
            .collect();
        links.sort_by_key(|l| l.sequence_number());

        EntitySummary {
            subject: subject.to_string(),
            record_count: history.len(),
            latest: history.last().map(|r| (*r).clone()),
            ratios: ratios(&volume),
            volume,
            links,
        }
    }

    /// Records and aggregates within `[from, until)`.
    pub fn period_summary(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<PeriodSummary<D::Payload>> {
        if from >= until {
            return Err(LedgerError::invalid("until", "period end must be after its start"));
        }

        let records = self
            .registry
            .query(&RecordFilter::new().by_time_range(from, until));
        let by_classification =
            |r: &Record<D::Payload>| D::classification(r.payload()).to_string();
        let dims: [Dimension<'_, D::Payload>; 1] = [&by_classification];

        let volume = volume(records.iter().copied());
        Ok(PeriodSummary {
            from,
            until,
            frequency: frequency(records.iter().copied(), &dims),
            series: time_series(records.iter().copied(), self.config.window_width_ms)?,
            ratios: ratios(&volume),
            volume,
            records: records.into_iter().cloned().collect(),
        })
    }

    /// A record, every link attached to it, and their chain hashes.
    pub fn full_trace(&self, record_id: &str) -> Result<RecordTrace<D::Payload>> {
        let record = self
            .registry
            .get_record(record_id)
            .ok_or_else(|| LedgerError::RecordNotFound(record_id.to_string()))?;
        let links: Vec<LinkRecord> = self
            .linker
            .links_for(record_id)
            .into_iter()
            .cloned()
            .collect();

        let mut chain_hashes = vec![ChainHash::of(D::TAG, record)];
        chain_hashes.extend(links.iter().map(|l| ChainHash::of(LinkDomain::TAG, l)));

        Ok(RecordTrace {
            record: record.clone(),
            links,
            chain_hashes,
        })
    }

    /// Counts, chain validity and top-level aggregates.
    pub fn overview(&self) -> Result<LedgerOverview> {
        let records = self.registry.records();
        let volume = volume(records);
        let ratios = ratios(&volume);
        let distribution = distribution(records, |r| D::subject(r.payload()).to_string());

        let mut metrics = ratios.as_metrics();
        metrics.insert(CONCENTRATION.to_string(), distribution.concentration);
        let exposure_index = weighted_combination(&metrics, &self.config.metric_weights)?;

        let registry_state = self.registry.get_state();
        let link_state = self.linker.get_state();
        Ok(LedgerOverview {
            record_count: records.len(),
            link_count: self.linker.len(),
            chain_valid: self.registry.verify_chain_integrity().is_ok(),
            links_valid: self.linker.verify_chain_integrity().is_ok(),
            head_hash: registry_state.head_hash,
            link_head_hash: link_state.head_hash,
            volume,
            ratios,
            distribution,
            exposure_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Direction;
    use crate::core::{ErrorCode, RecordId, GENESIS_HASH};
    use crate::domains::approval::{ApprovalInput, ApprovalRegistry, Decision};
    use crate::domains::flow::{FlowInput, FlowRegistry};
    use crate::linker::{LinkInput, TargetType};

    fn flow(
        reference: &str,
        subject: &str,
        direction: Direction,
        units: i64,
        ts: i64,
    ) -> FlowInput {
        FlowInput::new(reference, subject, direction, units, ts).with_operator("admin-1")
    }

    fn ledger() -> (FlowRegistry, Linker) {
        let mut registry = FlowRegistry::new();
        let mut linker = Linker::new();
        let a = registry.append(flow("ext-1", "p1", Direction::Inbound, 100, 1_000)).unwrap();
        registry.append(flow("ext-2", "p2", Direction::Outbound, 50, 2_000)).unwrap();
        let c = registry.append(flow("ext-3", "p1", Direction::Internal, 25, 3_000)).unwrap();

        let link = |id: &RecordId, target: TargetType, reference: &str, operator: &str, ts: i64| {
            LinkInput::new(id.as_str(), target, reference, operator, ts)
        };
        linker
            .link(link(a.id(), TargetType::Attribution, "campaign-1", "admin-1", 1_500))
            .unwrap();
        linker
            .link(link(c.id(), TargetType::ExecutionIntent, "intent-7", "admin-1", 3_500))
            .unwrap();
        linker
            .link(link(a.id(), TargetType::External, "ticket-3", "admin-2", 4_000))
            .unwrap();
        (registry, linker)
    }

    #[test]
    fn test_entity_summary() {
        let (registry, linker) = ledger();
        let view = LedgerView::new(&registry, &linker);
        let summary = view.entity_summary("p1");

        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.volume.total, 125);
        assert_eq!(summary.volume.net, 100);
        assert_eq!(summary.latest.as_ref().unwrap().sequence_number(), 3);
        let link_seqs: Vec<u64> = summary.links.iter().map(|l| l.sequence_number()).collect();
        assert_eq!(link_seqs, vec![1, 2, 3]);

        let empty = view.entity_summary("nobody");
        assert_eq!(empty.record_count, 0);
        assert!(empty.latest.is_none());
        assert_eq!(empty.ratios, Ratios::default());
    }

    #[test]
    fn test_period_summary() {
        let (registry, linker) = ledger();
        let config = LedgerConfig {
            window_width_ms: 1_000,
            ..LedgerConfig::default()
        };
        let view = LedgerView::with_config(&registry, &linker, config);
        let period = view
            .period_summary(Timestamp::from_millis(1_000), Timestamp::from_millis(3_000))
            .unwrap();

        assert_eq!(period.records.len(), 2);
        assert_eq!(period.volume.total, 150);
        assert_eq!(period.frequency.get(&["INBOUND"]), 1);
        assert_eq!(period.frequency.get(&["OUTBOUND"]), 1);
        assert_eq!(period.series.windows.len(), 2);
        assert_eq!(period.series.overall, period.volume);

        let err = view
            .period_summary(Timestamp::from_millis(3_000), Timestamp::from_millis(3_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_full_trace() {
        let (registry, linker) = ledger();
        let view = LedgerView::new(&registry, &linker);
        let first = registry.records()[0].id().clone();
        let trace = view.full_trace(first.as_str()).unwrap();

        assert_eq!(trace.record.id(), &first);
        assert_eq!(trace.links.len(), 2);
        assert_eq!(trace.chain_hashes.len(), 3);
        assert_eq!(trace.chain_hashes[0].chain, "flow");
        assert_eq!(trace.chain_hashes[0].previous_hash, GENESIS_HASH);
        assert_eq!(trace.chain_hashes[1].chain, "link");
        assert_eq!(trace.chain_hashes[2].sequence_number, 3);

        let err = view.full_trace("flow-missing").unwrap_err();
        assert_eq!(err.code(), ErrorCode::RecordNotFound);
    }

    #[test]
    fn test_overview() {
        let (registry, linker) = ledger();
        let view = LedgerView::new(&registry, &linker);
        let overview = view.overview().unwrap();

        assert_eq!(overview.record_count, 3);
        assert_eq!(overview.link_count, 3);
        assert!(overview.chain_valid);
        assert!(overview.links_valid);
        assert_eq!(overview.head_hash, *registry.head_hash());
        assert_eq!(overview.volume.total, 175);
        assert_eq!(overview.distribution.key_count(), 2);
        assert!(overview.exposure_index.is_finite());
        assert!(overview.exposure_index >= 0.0);
    }

    #[test]
    fn test_views_are_repeatable() {
        let (registry, linker) = ledger();
        let view = LedgerView::new(&registry, &linker);
        let before = registry.get_state();

        assert_eq!(view.overview().unwrap(), view.overview().unwrap());
        assert_eq!(view.entity_summary("p1"), view.entity_summary("p1"));
        let from = Timestamp::from_millis(1);
        let until = Timestamp::from_millis(10_000);
        assert_eq!(
            view.period_summary(from, until).unwrap(),
            view.period_summary(from, until).unwrap()
        );
        assert_eq!(registry.get_state(), before);
    }

    #[test]
    fn test_list_applies_page_size() {
        let (registry, linker) = ledger();
        let config = LedgerConfig {
            default_page_size: Some(2),
            ..LedgerConfig::default()
        };
        let view = LedgerView::with_config(&registry, &linker, config);
        assert_eq!(view.list(&RecordFilter::new()).len(), 2);
        assert_eq!(view.list(&RecordFilter::new().with_limit(3)).len(), 3);
    }

    #[test]
    fn test_approval_view() {
        let mut registry = ApprovalRegistry::new();
        let linker = Linker::new();
        let request = ApprovalInput::request("S", "A", Direction::Outbound, 40, 1_000);
        registry.append(request.clone()).unwrap();
        registry.append(request.decide("B", Decision::Confirmed, 2_000)).unwrap();

        let view = LedgerView::new(&registry, &linker);
        let summary = view.entity_summary("S");
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.volume.total, 40);
        assert_eq!(summary.volume.record_count, 2);
        assert_eq!(summary.latest.unwrap().payload().decision, Decision::Confirmed);

        let period = view
            .period_summary(Timestamp::from_millis(1), Timestamp::from_millis(5_000))
            .unwrap();
        assert_eq!(period.frequency.get(&["PENDING"]), 1);
        assert_eq!(period.frequency.get(&["CONFIRMED"]), 1);
    }
}
