//! Synchronize AWS VPC network inventory into InfoBlox IPAM.
//!
//! The heart of the crate is a CIDR block hierarchy resolver: given a batch of candidate
//! networks, [analyze] computes which blocks must become InfoBlox network containers versus leaf
//! networks and which pairs partially overlap, [build_plan] orders creation so containers exist
//! before their children, and [Executor] drives the InfoBlox WAPI gateway with per-step error
//! classification.
//!
//! ```
//! use ibxsync::{analyze, build_plan, Executor, NetworkRecord};
//!
//! let records = vec![
//!     NetworkRecord::new("10.0.0.0/16", "vpc-prod"),
//!     NetworkRecord::new("10.0.1.0/24", "vpc-prod-app"),
//!     NetworkRecord::new("192.168.1.0/24", "vpc-lab"),
//! ];
//!
//! let analysis = analyze(&records);
//! let plan = build_plan(&analysis, &records);
//!
//! // Preview the work without touching InfoBlox.
//! let results = Executor::new("default").dry_run(&plan);
//! assert_eq!(results.len(), 3);
//! ```

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

mod core;

/*-------------------------------------------------------------------------------------------------
  Library Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::errors::{Error, Result};
pub use crate::core::executor::{classify_error, Action, CreationResult, ErrorCategory, Executor};
pub use crate::core::gateway::{
    EaDefinitionCache, Existing, InfobloxGateway, WapiClient, WapiClientBuilder,
};
pub use crate::core::hierarchy::{analyze, HierarchyAnalysis, InvalidRecord, OverlapPair};
pub use crate::core::plan::{build_plan, CreationPlan, CreationStep};
pub use crate::core::record::NetworkRecord;
pub use crate::core::relation::{relate, relate_networks, CidrRelation};
pub use crate::core::tags::{map_tags_to_eas, parse_tag_blob};

// Re-export the `ipnetwork` crate so library users can work with the parsed network types.
pub use ipnetwork;
