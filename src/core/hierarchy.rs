use crate::core::record::NetworkRecord;
use crate::core::relation::{relate_networks, CidrRelation};
use crate::core::utils;
use ipnetwork::IpNetwork;
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

/*-------------------------------------------------------------------------------------------------
  Hierarchy Analysis
-------------------------------------------------------------------------------------------------*/

/// A pair of records whose CIDRs partially overlap. Neither contains the other, so the pair can
/// never both be created safely; it is reported for manual attention, never auto-resolved.
#[derive(Clone, Debug)]
pub struct OverlapPair {
    pub first: NetworkRecord,
    pub second: NetworkRecord,
    pub message: String,
}

/// A record whose CIDR failed to parse. Invalid records are excluded from the hierarchy and from
/// the creation plan; callers surface them as input errors.
#[derive(Clone, Debug)]
pub struct InvalidRecord {
    pub record: NetworkRecord,
    pub reason: String,
}

/// Containment hierarchy computed over one batch of candidate networks.
///
/// CIDR keys are normalized (host bits cleared). A CIDR may appear in more than one container's
/// relationship list when containers nest; the creation planner resolves each leaf to its nearest
/// container.
#[derive(Debug, Default)]
pub struct HierarchyAnalysis {
    /// Normalized CIDRs that strictly contain at least one other CIDR in the batch.
    pub containers: BTreeSet<String>,

    /// Container CIDR to the records it contains, in batch order, one entry per contained CIDR.
    /// Inclusion is transitive: a record nested two levels down appears under both enclosing
    /// containers.
    pub relationships: BTreeMap<String, Vec<NetworkRecord>>,

    /// Partially-overlapping record pairs that cannot be arranged hierarchically.
    pub overlaps: Vec<OverlapPair>,

    /// Records excluded from analysis because their CIDR failed to parse.
    pub invalid: Vec<InvalidRecord>,
}

/*--------------------------------------------------------------------------------------
  Analyze
--------------------------------------------------------------------------------------*/

/// Analyze a batch of candidate networks for containment and overlap.
///
/// Records are sorted by ascending prefix length (largest address blocks first; stable for equal
/// lengths) and every ordered pair is compared. In that ordering an earlier record either
/// contains a later one or the two are incomparable, so each `Contains` result marks the earlier
/// CIDR as a container. Pairwise comparison is O(n²); batches are tens to low hundreds of CIDRs,
/// so no spatial indexing is needed.
///
/// Duplicate CIDRs are legal input and classify as overlaps (see
/// [CidrRelation::Overlap](crate::CidrRelation)). Malformed CIDRs are excluded with a logged
/// diagnostic and reported through [HierarchyAnalysis::invalid].
pub fn analyze(records: &[NetworkRecord]) -> HierarchyAnalysis {
    let mut analysis = HierarchyAnalysis::default();

    let mut parsed: Vec<(IpNetwork, &NetworkRecord)> = Vec::with_capacity(records.len());
    for record in records {
        match record.cidr.parse::<IpNetwork>() {
            Ok(network) => parsed.push((utils::ipnetwork::network_prefix(&network), record)),
            Err(error) => {
                warn!("Excluding invalid CIDR {:?}: {error}", record.cidr);
                analysis.invalid.push(InvalidRecord {
                    record: record.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    // Largest blocks first; stable sort preserves input order for equal prefix lengths.
    parsed.sort_by_key(|(network, _)| network.prefix());

    for i in 0..parsed.len() {
        let (network_a, record_a) = (parsed[i].0, parsed[i].1);

        for (network_b, record_b) in parsed.iter().skip(i + 1) {
            match relate_networks(network_a, *network_b) {
                CidrRelation::Contains => {
                    info!(
                        "Network {network_a} contains {network_b} - marking as container"
                    );
                    analysis.containers.insert(network_a.to_string());
                    let contained = analysis
                        .relationships
                        .entry(network_a.to_string())
                        .or_default();
                    // A duplicated CIDR in the batch relates to the same counterpart once
                    // per duplicate; record each contained CIDR only once per container.
                    if !contained
                        .iter()
                        .any(|existing| existing.cidr == record_b.cidr)
                    {
                        contained.push((*record_b).clone());
                    }
                }
                // Contained cannot occur in prefix-length order; if a sorting tie ever
                // produced one it would be a duplicate-size collision, reported the same
                // way as a partial overlap.
                CidrRelation::Overlap | CidrRelation::Contained => {
                    let message =
                        format!("Networks {network_a} and {network_b} partially overlap");
                    warn!("{message}");
                    analysis.overlaps.push(OverlapPair {
                        first: record_a.clone(),
                        second: (*record_b).clone(),
                        message,
                    });
                }
                CidrRelation::None | CidrRelation::Error => {}
            }
        }
    }

    analysis
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
