use std::collections::BTreeMap;

/*-------------------------------------------------------------------------------------------------
  Network Record
-------------------------------------------------------------------------------------------------*/

/// One candidate network to reconcile into InfoBlox.
///
/// Records arrive from untrusted CSV exports: the `cidr` string is not guaranteed to parse, and
/// host bits may be set (`10.0.0.5/24`). Parsing and normalization happen in the hierarchy
/// analyzer; a record whose CIDR fails to parse is reported as invalid input, never a panic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkRecord {
    /// Candidate network in CIDR notation.
    pub cidr: String,

    /// InfoBlox Extended Attributes to apply to the created object.
    pub attributes: BTreeMap<String, String>,

    /// Opaque identifier from the originating record (site id / VPC id), carried through for
    /// traceability; never interpreted by the reconciliation engine.
    pub source_key: String,
}

impl NetworkRecord {
    pub fn new(cidr: &str, source_key: &str) -> Self {
        Self {
            cidr: cidr.to_string(),
            attributes: BTreeMap::new(),
            source_key: source_key.to_string(),
        }
    }

    pub fn with_attributes(
        cidr: &str,
        source_key: &str,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            cidr: cidr.to_string(),
            attributes,
            source_key: source_key.to_string(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
