use crate::core::hierarchy::HierarchyAnalysis;
use crate::core::record::NetworkRecord;
use crate::core::relation::{relate_networks, CidrRelation};
use crate::core::utils;
use ipnetwork::IpNetwork;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/*-------------------------------------------------------------------------------------------------
  Creation Plan
-------------------------------------------------------------------------------------------------*/

/// One ordered unit of work for the reconciliation executor.
#[derive(Clone, Debug)]
pub enum CreationStep {
    /// Create an InfoBlox network container. Containers are emitted before every network step,
    /// largest blocks first, so a container-of-a-container exists before its child container.
    CreateContainer {
        cidr: IpNetwork,
        attributes: BTreeMap<String, String>,
        source_key: String,
        contained_count: usize,
    },

    /// Create a leaf network, optionally nested under its nearest containing container.
    CreateNetwork {
        cidr: IpNetwork,
        attributes: BTreeMap<String, String>,
        source_key: String,
        parent_container: Option<IpNetwork>,
        /// The CIDR participates in an unresolved partial overlap. Creation is still attempted;
        /// the InfoBlox server's own overlap rejection is the final arbiter.
        flagged_overlap: bool,
    },
}

impl CreationStep {
    pub fn cidr(&self) -> &IpNetwork {
        match self {
            CreationStep::CreateContainer { cidr, .. } => cidr,
            CreationStep::CreateNetwork { cidr, .. } => cidr,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, CreationStep::CreateContainer { .. })
    }
}

/// Ordered list of creation steps: all containers first (ascending prefix length), then all leaf
/// networks (ascending prefix length).
#[derive(Clone, Debug, Default)]
pub struct CreationPlan {
    pub steps: Vec<CreationStep>,
}

impl CreationPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn container_step_count(&self) -> usize {
        self.steps.iter().filter(|step| step.is_container()).count()
    }

    pub fn network_step_count(&self) -> usize {
        self.steps.len() - self.container_step_count()
    }
}

/*--------------------------------------------------------------------------------------
  Build Plan
--------------------------------------------------------------------------------------*/

/// Order creation operations from a hierarchy analysis.
///
/// Duplicate CIDRs are collapsed to a single step before creation, keeping the last-seen
/// record's attributes. Records flagged invalid by the analyzer never reach the plan. Each leaf
/// is annotated with its *nearest* (longest-prefix) containing container, not just any: with
/// nested containers a `/24` inside a `/16` inside a `/8` parents on the `/16`.
pub fn build_plan(analysis: &HierarchyAnalysis, records: &[NetworkRecord]) -> CreationPlan {
    // Collapse duplicates: first-seen position, last-seen attributes win.
    let mut unique: Vec<(IpNetwork, NetworkRecord)> = Vec::new();
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let Ok(network) = record.cidr.parse::<IpNetwork>() else {
            continue; // Reported through the analysis' invalid list.
        };
        let network = utils::ipnetwork::network_prefix(&network);

        match positions.get(&network.to_string()) {
            Some(&position) => {
                debug!(
                    "Duplicate CIDR {network} - keeping last-seen attributes ({})",
                    record.source_key
                );
                unique[position].1 = record.clone();
            }
            None => {
                positions.insert(network.to_string(), unique.len());
                unique.push((network, record.clone()));
            }
        }
    }

    // CIDRs participating in an unresolved partial overlap.
    let overlapping: BTreeSet<String> = analysis
        .overlaps
        .iter()
        .flat_map(|pair| [&pair.first.cidr, &pair.second.cidr])
        .filter_map(|cidr| cidr.parse::<IpNetwork>().ok())
        .map(|network| utils::ipnetwork::network_prefix(&network).to_string())
        .collect();

    let container_networks: Vec<IpNetwork> = unique
        .iter()
        .map(|(network, _)| *network)
        .filter(|network| analysis.containers.contains(&network.to_string()))
        .collect();

    // Containers first, largest (most general) blocks leading.
    let mut container_steps: Vec<CreationStep> = unique
        .iter()
        .filter(|(network, _)| analysis.containers.contains(&network.to_string()))
        .map(|(network, record)| CreationStep::CreateContainer {
            cidr: *network,
            attributes: record.attributes.clone(),
            source_key: record.source_key.clone(),
            contained_count: analysis
                .relationships
                .get(&network.to_string())
                .map_or(0, Vec::len),
        })
        .collect();
    container_steps.sort_by_key(|step| step.cidr().prefix());

    // Leaf networks, also largest first, each resolved to its nearest container.
    let mut network_steps: Vec<CreationStep> = unique
        .iter()
        .filter(|(network, _)| !analysis.containers.contains(&network.to_string()))
        .map(|(network, record)| CreationStep::CreateNetwork {
            cidr: *network,
            attributes: record.attributes.clone(),
            source_key: record.source_key.clone(),
            parent_container: nearest_container(*network, &container_networks),
            flagged_overlap: overlapping.contains(&network.to_string()),
        })
        .collect();
    network_steps.sort_by_key(|step| step.cidr().prefix());

    let mut steps = container_steps;
    steps.append(&mut network_steps);

    CreationPlan { steps }
}

/*--------------------------------------------------------------------------------------
  Nearest Container
--------------------------------------------------------------------------------------*/

/// The most specific (longest-prefix) container containing a network, if any.
fn nearest_container(network: IpNetwork, containers: &[IpNetwork]) -> Option<IpNetwork> {
    containers
        .iter()
        .filter(|container| relate_networks(**container, network) == CidrRelation::Contains)
        .max_by_key(|container| container.prefix())
        .copied()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
