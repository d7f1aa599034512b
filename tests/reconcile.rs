use ibxsync::{
    analyze, build_plan, Action, CreationResult, ErrorCategory, Executor, InfobloxGateway,
    NetworkRecord, Result,
};
use std::collections::BTreeMap;

/*-------------------------------------------------------------------------------------------------
  Reconciliation Pipeline Tests
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Test Gateway
--------------------------------------------------------------------------------------*/

/// Gateway stand-in recording every call in order; fails on configured CIDRs.
#[derive(Default)]
struct TestGateway {
    calls: Vec<(String, String)>, // (kind, cidr)
    failures: BTreeMap<String, String>,
}

impl TestGateway {
    fn fail_with(mut self, cidr: &str, message: &str) -> Self {
        self.failures.insert(cidr.to_string(), message.to_string());
        self
    }
}

impl InfobloxGateway for TestGateway {
    fn create_network(
        &mut self,
        cidr: &str,
        _network_view: &str,
        _comment: &str,
        _attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        self.calls.push(("network".to_string(), cidr.to_string()));
        match self.failures.get(cidr) {
            Some(message) => Err(message.clone().into()),
            None => Ok(format!("network/{cidr}/default")),
        }
    }

    fn create_network_container(
        &mut self,
        cidr: &str,
        _network_view: &str,
        _comment: &str,
        _attributes: &BTreeMap<String, String>,
    ) -> Result<String> {
        self.calls.push(("container".to_string(), cidr.to_string()));
        match self.failures.get(cidr) {
            Some(message) => Err(message.clone().into()),
            None => Ok(format!("networkcontainer/{cidr}/default")),
        }
    }
}

fn reconcile(records: &[NetworkRecord], gateway: &mut TestGateway) -> Vec<CreationResult> {
    let analysis = analyze(records);
    let plan = build_plan(&analysis, records);
    Executor::new("default").run(&plan, gateway)
}

/*--------------------------------------------------------------------------------------
  One Container with Leaves
--------------------------------------------------------------------------------------*/

/// A /16 containing two /24s plus one unrelated /24: the container is created first, the two
/// contained leaves parent on it, and the unrelated leaf stands alone.
#[test]
fn reconcile_container_with_leaves() {
    let records = vec![
        NetworkRecord::new("10.0.0.0/16", "vpc-1"),
        NetworkRecord::new("10.0.1.0/24", "vpc-2"),
        NetworkRecord::new("10.0.2.0/24", "vpc-3"),
        NetworkRecord::new("192.168.1.0/24", "vpc-4"),
    ];

    let mut gateway = TestGateway::default();
    let results = reconcile(&records, &mut gateway);

    assert_eq!(results.len(), 4);
    assert_eq!(gateway.calls[0], ("container".to_string(), "10.0.0.0/16".to_string()));

    let by_cidr: BTreeMap<&str, &CreationResult> = results
        .iter()
        .map(|result| (result.cidr.as_str(), result))
        .collect();

    assert_eq!(by_cidr["10.0.0.0/16"].action, Action::CreatedContainer);
    assert_eq!(by_cidr["10.0.0.0/16"].contained_count, 2);
    assert_eq!(by_cidr["10.0.1.0/24"].action, Action::CreatedInContainer);
    assert_eq!(
        by_cidr["10.0.1.0/24"].parent_container.as_deref(),
        Some("10.0.0.0/16")
    );
    assert_eq!(by_cidr["10.0.2.0/24"].action, Action::CreatedInContainer);
    assert_eq!(by_cidr["192.168.1.0/24"].action, Action::Created);
    assert!(by_cidr["192.168.1.0/24"].parent_container.is_none());
}

/*--------------------------------------------------------------------------------------
  Nested Containers
--------------------------------------------------------------------------------------*/

/// With nested containers the outermost is created first and the leaf parents on the nearest
/// container.
#[test]
fn reconcile_nested_containers() {
    let records = vec![
        NetworkRecord::new("10.0.1.0/24", "vpc-leaf"),
        NetworkRecord::new("10.0.0.0/16", "vpc-mid"),
        NetworkRecord::new("10.0.0.0/8", "vpc-top"),
    ];

    let mut gateway = TestGateway::default();
    let results = reconcile(&records, &mut gateway);

    assert_eq!(
        gateway.calls,
        vec![
            ("container".to_string(), "10.0.0.0/8".to_string()),
            ("container".to_string(), "10.0.0.0/16".to_string()),
            ("network".to_string(), "10.0.1.0/24".to_string()),
        ]
    );

    let leaf = results
        .iter()
        .find(|result| result.cidr == "10.0.1.0/24")
        .unwrap();
    assert_eq!(leaf.parent_container.as_deref(), Some("10.0.0.0/16"));
}

/*--------------------------------------------------------------------------------------
  Partial Failure
--------------------------------------------------------------------------------------*/

/// A rejected step is classified and recorded, and the rest of the batch still runs.
#[test]
fn reconcile_continues_past_rejections() {
    let records = vec![
        NetworkRecord::new("10.0.1.0/24", "vpc-1"),
        NetworkRecord::new("10.0.2.0/24", "vpc-2"),
        NetworkRecord::new("10.0.3.0/24", "vpc-3"),
    ];

    let mut gateway = TestGateway::default().fail_with(
        "10.0.2.0/24",
        "The network 10.0.2.0/24 overlaps an existing network",
    );
    let results = reconcile(&records, &mut gateway);

    assert_eq!(results.len(), 3);
    assert_eq!(gateway.calls.len(), 3);

    let failed = results
        .iter()
        .find(|result| result.cidr == "10.0.2.0/24")
        .unwrap();
    assert_eq!(failed.action, Action::Error);
    assert_eq!(failed.error_category, Some(ErrorCategory::Overlap));
    assert!(failed.error.as_deref().unwrap().contains("overlaps"));

    let succeeded = results
        .iter()
        .filter(|result| result.action == Action::Created)
        .count();
    assert_eq!(succeeded, 2);
}

/// A failed container creation does not block the contained leaves; they are attempted
/// standalone and surface the server's own rejection.
#[test]
fn reconcile_leaves_attempted_after_container_failure() {
    let records = vec![
        NetworkRecord::new("10.0.0.0/16", "vpc-1"),
        NetworkRecord::new("10.0.1.0/24", "vpc-2"),
    ];

    let mut gateway = TestGateway::default()
        .fail_with("10.0.0.0/16", "Authorization failed")
        .fail_with("10.0.1.0/24", "The network overlaps an existing container");
    let results = reconcile(&records, &mut gateway);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].action, Action::ErrorContainer);
    assert_eq!(results[0].error_category, Some(ErrorCategory::Permission));
    assert_eq!(results[1].action, Action::Error);
    assert_eq!(results[1].error_category, Some(ErrorCategory::Overlap));
}

/*--------------------------------------------------------------------------------------
  Duplicates
--------------------------------------------------------------------------------------*/

/// A duplicated CIDR is reported as an overlap, collapses to one creation step, and keeps the
/// last-seen record's attributes.
#[test]
fn reconcile_duplicate_cidr() {
    let mut first_attributes = BTreeMap::new();
    first_attributes.insert("owner".to_string(), "alpha".to_string());
    let mut last_attributes = BTreeMap::new();
    last_attributes.insert("owner".to_string(), "bravo".to_string());

    let records = vec![
        NetworkRecord::with_attributes("10.0.1.0/24", "vpc-1", first_attributes),
        NetworkRecord::with_attributes("10.0.1.0/24", "vpc-2", last_attributes),
    ];

    let analysis = analyze(&records);
    assert_eq!(analysis.overlaps.len(), 1);
    assert!(analysis.containers.is_empty());

    let plan = build_plan(&analysis, &records);
    assert_eq!(plan.len(), 1);

    let mut gateway = TestGateway::default();
    let results = Executor::new("default").run(&plan, &mut gateway);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_key, "vpc-2");
    assert!(results[0].parent_container.is_none());
}

/*--------------------------------------------------------------------------------------
  Dry Run / Live Parity
--------------------------------------------------------------------------------------*/

/// Dry-run output enumerates exactly the steps live mode attempts: same count, same CIDRs,
/// same step kinds.
#[test]
fn reconcile_dry_run_matches_live() {
    let records = vec![
        NetworkRecord::new("10.0.0.0/16", "vpc-1"),
        NetworkRecord::new("10.0.1.0/24", "vpc-2"),
        NetworkRecord::new("172.16.0.0/24", "vpc-3"),
    ];

    let analysis = analyze(&records);
    let plan = build_plan(&analysis, &records);
    let executor = Executor::new("default");

    let dry = executor.dry_run(&plan);
    let mut gateway = TestGateway::default();
    let live = executor.run(&plan, &mut gateway);

    assert_eq!(dry.len(), live.len());
    for (dry_result, live_result) in dry.iter().zip(live.iter()) {
        assert_eq!(dry_result.cidr, live_result.cidr);
        assert_eq!(dry_result.source_key, live_result.source_key);
        assert_eq!(dry_result.parent_container, live_result.parent_container);
        assert_eq!(dry_result.contained_count, live_result.contained_count);
        assert_eq!(
            dry_result.action.is_container(),
            live_result.action.is_container()
        );
        assert!(dry_result.action.to_string().starts_with("would_"));
        assert!(!live_result.action.is_error());
        assert!(dry_result.reference.is_none());
        assert!(live_result.reference.is_some());
    }
}
