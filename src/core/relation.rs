use crate::core::utils;
use ipnetwork::IpNetwork;
use log::warn;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  CIDR Relation
-------------------------------------------------------------------------------------------------*/

/// Relation between two CIDR blocks.
///
/// Identical blocks are classified as [CidrRelation::Overlap] rather than `Contains`: a duplicate
/// CIDR in a batch is flagged for manual attention, never silently treated as a container
/// relationship.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CidrRelation {
    /// Every address in the second block is in the first, and the blocks differ.
    Contains,

    /// The first block is a strict subset of the second.
    Contained,

    /// The blocks share address space but neither is a strict subset of the other; includes
    /// identical blocks.
    Overlap,

    /// Disjoint address ranges (mixed IPv4/IPv6 comparisons are always disjoint).
    None,

    /// One or both inputs failed to parse as a CIDR block.
    Error,
}

impl fmt::Display for CidrRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = match self {
            CidrRelation::Contains => "contains",
            CidrRelation::Contained => "contained",
            CidrRelation::Overlap => "overlap",
            CidrRelation::None => "none",
            CidrRelation::Error => "error",
        };
        write!(f, "{relation}")
    }
}

/*--------------------------------------------------------------------------------------
  Relate CIDR Strings
--------------------------------------------------------------------------------------*/

/// Compare two CIDR strings.
///
/// Inputs are parsed non-strictly: set host bits are cleared before comparison, so
/// `10.0.0.5/24` compares as `10.0.0.0/24`. CSV input is untrusted, so a parse failure
/// returns [CidrRelation::Error] with a logged diagnostic instead of propagating.
pub fn relate(a: &str, b: &str) -> CidrRelation {
    let parsed_a = a.parse::<IpNetwork>();
    let parsed_b = b.parse::<IpNetwork>();

    match (parsed_a, parsed_b) {
        (Ok(network_a), Ok(network_b)) => relate_networks(
            utils::ipnetwork::network_prefix(&network_a),
            utils::ipnetwork::network_prefix(&network_b),
        ),
        (Err(error), _) => {
            warn!("Invalid CIDR {a:?}: {error}");
            CidrRelation::Error
        }
        (_, Err(error)) => {
            warn!("Invalid CIDR {b:?}: {error}");
            CidrRelation::Error
        }
    }
}

/*--------------------------------------------------------------------------------------
  Relate Parsed Networks
--------------------------------------------------------------------------------------*/

/// Compare two parsed network prefixes. Callers must pass normalized network prefixes
/// (host bits cleared); [relate] handles normalization for string inputs.
pub fn relate_networks(a: IpNetwork, b: IpNetwork) -> CidrRelation {
    match (a, b) {
        (IpNetwork::V4(ipv4_a), IpNetwork::V4(ipv4_b)) => {
            if ipv4_a == ipv4_b {
                CidrRelation::Overlap
            } else if ipv4_a.is_supernet_of(ipv4_b) {
                CidrRelation::Contains
            } else if ipv4_a.is_subnet_of(ipv4_b) {
                CidrRelation::Contained
            } else if ipv4_a.overlaps(ipv4_b) {
                CidrRelation::Overlap
            } else {
                CidrRelation::None
            }
        }
        (IpNetwork::V6(ipv6_a), IpNetwork::V6(ipv6_b)) => {
            if ipv6_a == ipv6_b {
                CidrRelation::Overlap
            } else if ipv6_a.is_supernet_of(ipv6_b) {
                CidrRelation::Contains
            } else if ipv6_a.is_subnet_of(ipv6_b) {
                CidrRelation::Contained
            } else if ipv6_a.overlaps(ipv6_b) {
                CidrRelation::Overlap
            } else {
                CidrRelation::None
            }
        }
        _ => CidrRelation::None,
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
