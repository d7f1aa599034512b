use crate::core::gateway::InfobloxGateway;
use crate::core::plan::{CreationPlan, CreationStep};
use ipnetwork::IpNetwork;
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::fmt;

/*-------------------------------------------------------------------------------------------------
  Creation Results
-------------------------------------------------------------------------------------------------*/

/// Outcome of one creation step. The `Would*` variants are the dry-run counterparts of the live
/// actions; dry-run and live results are structurally identical apart from the prefix.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    Created,
    CreatedInContainer,
    CreatedContainer,
    WouldCreate,
    WouldCreateInContainer,
    WouldCreateContainer,
    Error,
    ErrorContainer,
}

impl Action {
    pub fn is_error(&self) -> bool {
        matches!(self, Action::Error | Action::ErrorContainer)
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Action::CreatedContainer | Action::WouldCreateContainer | Action::ErrorContainer
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Action::Created => "created",
            Action::CreatedInContainer => "created_in_container",
            Action::CreatedContainer => "created_container",
            Action::WouldCreate => "would_create",
            Action::WouldCreateInContainer => "would_create_in_container",
            Action::WouldCreateContainer => "would_create_container",
            Action::Error => "error",
            Action::ErrorContainer => "error_container",
        };
        write!(f, "{action}")
    }
}

/// Remediation category assigned to a failed creation step. Classification routes operator
/// remediation only; no category triggers an automatic retry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    Overlap,
    Permission,
    Invalid,
    NetworkViewError,
    NotFound,
    EaError,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self {
            ErrorCategory::Overlap => "overlap",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Invalid => "invalid",
            ErrorCategory::NetworkViewError => "network_view_error",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::EaError => "ea_error",
            ErrorCategory::Unknown => "unknown",
        };
        write!(f, "{category}")
    }
}

/// Result record for one attempted creation step. Every step yields exactly one result; there is
/// no silent skip.
#[derive(Clone, Debug)]
pub struct CreationResult {
    pub cidr: String,
    pub source_key: String,
    pub action: Action,
    pub parent_container: Option<String>,
    pub contained_count: usize,
    /// WAPI object reference returned by a live creation.
    pub reference: Option<String>,
    pub error: Option<String>,
    pub error_category: Option<ErrorCategory>,
}

/*-------------------------------------------------------------------------------------------------
  Error Classification
-------------------------------------------------------------------------------------------------*/

/// Classify a gateway failure message into a remediation category.
///
/// The upstream WAPI reports failures as free-form message strings, so classification is a
/// case-insensitive substring match against a fixed, ordered rule table. The first matching rule
/// wins.
pub fn classify_error(message: &str) -> ErrorCategory {
    const RULES: [(&[&str], ErrorCategory); 6] = [
        (&["overlap"], ErrorCategory::Overlap),
        (&["permission", "auth"], ErrorCategory::Permission),
        (&["invalid"], ErrorCategory::Invalid),
        (&["network view"], ErrorCategory::NetworkViewError),
        (&["not found"], ErrorCategory::NotFound),
        (&["extensible", "attribute"], ErrorCategory::EaError),
    ];

    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(substrings, _)| {
            substrings
                .iter()
                .any(|substring| message.contains(substring))
        })
        .map_or(ErrorCategory::Unknown, |(_, category)| *category)
}

/*-------------------------------------------------------------------------------------------------
  Reconciliation Executor
-------------------------------------------------------------------------------------------------*/

/// Walks a creation plan, drives the InfoBlox gateway, and records one [CreationResult] per step.
///
/// Execution is strictly sequential and the plan's container phase is a hard barrier: every
/// container step is attempted before the first leaf step. A step failure never aborts the batch;
/// a leaf whose parent container failed is still attempted standalone and will surface the
/// server's own rejection (typically an overlap) as a diagnosable result.
#[derive(Clone, Debug)]
pub struct Executor {
    network_view: String,
}

impl Executor {
    pub fn new(network_view: &str) -> Self {
        Self {
            network_view: network_view.to_string(),
        }
    }

    pub fn network_view(&self) -> &str {
        &self.network_view
    }

    /// Execute the plan against the gateway.
    pub fn run(
        &self,
        plan: &CreationPlan,
        gateway: &mut dyn InfobloxGateway,
    ) -> Vec<CreationResult> {
        self.execute(plan, Some(gateway))
    }

    /// Report exactly what [Executor::run] would do, without calling the gateway or mutating any
    /// external state. Results carry the `would_*` action variants.
    pub fn dry_run(&self, plan: &CreationPlan) -> Vec<CreationResult> {
        self.execute(plan, None)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    fn execute(
        &self,
        plan: &CreationPlan,
        mut gateway: Option<&mut dyn InfobloxGateway>,
    ) -> Vec<CreationResult> {
        let mut results = Vec::with_capacity(plan.len());

        for step in &plan.steps {
            let result = match step {
                CreationStep::CreateContainer {
                    cidr,
                    attributes,
                    source_key,
                    contained_count,
                } => self.execute_container_step(
                    gateway.as_deref_mut(),
                    *cidr,
                    attributes,
                    source_key,
                    *contained_count,
                ),
                CreationStep::CreateNetwork {
                    cidr,
                    attributes,
                    source_key,
                    parent_container,
                    flagged_overlap,
                } => {
                    if *flagged_overlap {
                        warn!(
                            "Network {cidr} participates in a partial overlap; InfoBlox may \
                             reject the creation"
                        );
                    }
                    self.execute_network_step(
                        gateway.as_deref_mut(),
                        *cidr,
                        attributes,
                        source_key,
                        *parent_container,
                    )
                }
            };
            results.push(result);
        }

        results
    }

    fn execute_container_step(
        &self,
        gateway: Option<&mut (dyn InfobloxGateway + '_)>,
        cidr: IpNetwork,
        attributes: &BTreeMap<String, String>,
        source_key: &str,
        contained_count: usize,
    ) -> CreationResult {
        let mut result = CreationResult {
            cidr: cidr.to_string(),
            source_key: source_key.to_string(),
            action: Action::WouldCreateContainer,
            parent_container: None,
            contained_count,
            reference: None,
            error: None,
            error_category: None,
        };

        let Some(gateway) = gateway else {
            info!("[DRY RUN] Would create network container: {cidr} ({source_key})");
            return result;
        };

        let comment = format!("AWS VPC container: {source_key}");
        match gateway.create_network_container(
            &result.cidr,
            &self.network_view,
            &comment,
            attributes,
        ) {
            Ok(reference) => {
                info!("Created network container: {cidr} ({source_key})");
                result.action = Action::CreatedContainer;
                result.reference = Some(reference);
            }
            Err(error) => {
                error!("Failed to create container {cidr}: {error}");
                result.action = Action::ErrorContainer;
                result.error_category = Some(classify_error(&error.to_string()));
                result.error = Some(error.to_string());
            }
        }

        result
    }

    fn execute_network_step(
        &self,
        gateway: Option<&mut (dyn InfobloxGateway + '_)>,
        cidr: IpNetwork,
        attributes: &BTreeMap<String, String>,
        source_key: &str,
        parent_container: Option<IpNetwork>,
    ) -> CreationResult {
        let mut result = CreationResult {
            cidr: cidr.to_string(),
            source_key: source_key.to_string(),
            action: match parent_container {
                Some(_) => Action::WouldCreateInContainer,
                None => Action::WouldCreate,
            },
            parent_container: parent_container.map(|parent| parent.to_string()),
            contained_count: 0,
            reference: None,
            error: None,
            error_category: None,
        };

        let Some(gateway) = gateway else {
            info!("[DRY RUN] Would create network: {cidr} ({source_key})");
            if let Some(parent) = &result.parent_container {
                info!("  inside container: {parent}");
            }
            return result;
        };

        let comment = match &result.parent_container {
            Some(parent) => format!("AWS VPC: {source_key} [parent container: {parent}]"),
            None => format!("AWS VPC: {source_key}"),
        };

        match gateway.create_network(&result.cidr, &self.network_view, &comment, attributes) {
            Ok(reference) => {
                info!("Created network: {cidr} ({source_key})");
                if let Some(parent) = &result.parent_container {
                    info!("  inside container: {parent}");
                }
                result.action = match parent_container {
                    Some(_) => Action::CreatedInContainer,
                    None => Action::Created,
                };
                result.reference = Some(reference);
            }
            Err(error) => {
                error!("Failed to create network {cidr}: {error}");
                result.action = Action::Error;
                result.error_category = Some(classify_error(&error.to_string()));
                result.error = Some(error.to_string());
            }
        }

        result
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::Result;
    use crate::core::hierarchy::analyze;
    use crate::core::plan::build_plan;
    use crate::core::record::tests::test_record;
    use test_log::test;

    /*----------------------------------------------------------------------------------
      Test Helper Functions
    ----------------------------------------------------------------------------------*/

    /// Gateway stand-in that records calls and fails on configured CIDRs.
    #[derive(Default)]
    struct RecordingGateway {
        created_networks: Vec<String>,
        created_containers: Vec<String>,
        failures: BTreeMap<String, String>,
    }

    impl RecordingGateway {
        fn fail_with(mut self, cidr: &str, message: &str) -> Self {
            self.failures.insert(cidr.to_string(), message.to_string());
            self
        }
    }

    impl InfobloxGateway for RecordingGateway {
        fn create_network(
            &mut self,
            cidr: &str,
            _network_view: &str,
            _comment: &str,
            _attributes: &BTreeMap<String, String>,
        ) -> Result<String> {
            if let Some(message) = self.failures.get(cidr) {
                return Err(message.clone().into());
            }
            self.created_networks.push(cidr.to_string());
            Ok(format!("network/{cidr}"))
        }

        fn create_network_container(
            &mut self,
            cidr: &str,
            _network_view: &str,
            _comment: &str,
            _attributes: &BTreeMap<String, String>,
        ) -> Result<String> {
            if let Some(message) = self.failures.get(cidr) {
                return Err(message.clone().into());
            }
            self.created_containers.push(cidr.to_string());
            Ok(format!("networkcontainer/{cidr}"))
        }
    }

    fn test_plan() -> crate::core::plan::CreationPlan {
        let records = vec![
            test_record("10.0.0.0/16", "site-1"),
            test_record("10.0.1.0/24", "site-2"),
            test_record("10.0.2.0/24", "site-3"),
            test_record("192.168.1.0/24", "site-4"),
        ];
        build_plan(&analyze(&records), &records)
    }

    /*----------------------------------------------------------------------------------
      Error Classification
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_classify_error_rule_table() {
        assert_eq!(
            classify_error("The network 10.0.1.0/24 overlaps an existing network"),
            ErrorCategory::Overlap
        );
        assert_eq!(
            classify_error("Permission denied for object"),
            ErrorCategory::Permission
        );
        assert_eq!(
            classify_error("HTTP 401 Authentication required"),
            ErrorCategory::Permission
        );
        assert_eq!(
            classify_error("Invalid value for field network"),
            ErrorCategory::Invalid
        );
        assert_eq!(
            classify_error("Network view 'prod' does not exist"),
            ErrorCategory::NetworkViewError
        );
        assert_eq!(classify_error("Object not found"), ErrorCategory::NotFound);
        assert_eq!(
            classify_error("Unknown extensible attribute: site_id"),
            ErrorCategory::EaError
        );
        assert_eq!(
            classify_error("Attribute value rejected"),
            ErrorCategory::EaError
        );
        assert_eq!(classify_error("connection reset"), ErrorCategory::Unknown);
    }

    /// Matching is case-insensitive and the first rule in table order wins: a message naming
    /// both an overlap and a permission problem classifies as overlap.
    #[test]
    fn test_classify_error_first_match_wins() {
        assert_eq!(classify_error("OVERLAP detected"), ErrorCategory::Overlap);
        assert_eq!(
            classify_error("permission error: network overlaps"),
            ErrorCategory::Overlap
        );
        assert_eq!(
            classify_error("invalid network view"),
            ErrorCategory::Invalid
        );
    }

    /*----------------------------------------------------------------------------------
      Dry Run
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_dry_run_actions() {
        let plan = test_plan();
        let executor = Executor::new("default");
        let results = executor.dry_run(&plan);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].action, Action::WouldCreateContainer);
        assert_eq!(results[0].contained_count, 2);

        let by_cidr: BTreeMap<&str, &CreationResult> = results
            .iter()
            .map(|result| (result.cidr.as_str(), result))
            .collect();
        assert_eq!(
            by_cidr["10.0.1.0/24"].action,
            Action::WouldCreateInContainer
        );
        assert_eq!(
            by_cidr["10.0.1.0/24"].parent_container.as_deref(),
            Some("10.0.0.0/16")
        );
        assert_eq!(by_cidr["192.168.1.0/24"].action, Action::WouldCreate);
        assert!(by_cidr["192.168.1.0/24"].parent_container.is_none());
    }

    /// Dry-run output enumerates the same steps, in the same order, as live execution.
    #[test]
    fn test_dry_run_live_parity() {
        let plan = test_plan();
        let executor = Executor::new("default");

        let dry = executor.dry_run(&plan);
        let mut gateway = RecordingGateway::default();
        let live = executor.run(&plan, &mut gateway);

        assert_eq!(dry.len(), live.len());
        for (dry_result, live_result) in dry.iter().zip(live.iter()) {
            assert_eq!(dry_result.cidr, live_result.cidr);
            assert_eq!(dry_result.parent_container, live_result.parent_container);
            assert_eq!(dry_result.contained_count, live_result.contained_count);
            assert_eq!(
                dry_result.action.is_container(),
                live_result.action.is_container()
            );
        }
    }

    /*----------------------------------------------------------------------------------
      Live Execution
    ----------------------------------------------------------------------------------*/

    #[test]
    fn test_run_creates_containers_before_networks() {
        let plan = test_plan();
        let executor = Executor::new("default");
        let mut gateway = RecordingGateway::default();
        let results = executor.run(&plan, &mut gateway);

        assert_eq!(gateway.created_containers, vec!["10.0.0.0/16"]);
        assert_eq!(gateway.created_networks.len(), 3);
        assert_eq!(results[0].action, Action::CreatedContainer);
        assert_eq!(
            results[0].reference.as_deref(),
            Some("networkcontainer/10.0.0.0/16")
        );
    }

    /// A failed step never aborts the batch; every step still yields a result.
    #[test]
    fn test_run_continues_after_failure() {
        let plan = test_plan();
        let executor = Executor::new("default");
        let mut gateway = RecordingGateway::default()
            .fail_with("10.0.1.0/24", "The network overlaps an existing network");
        let results = executor.run(&plan, &mut gateway);

        assert_eq!(results.len(), 4);

        let failed = results
            .iter()
            .find(|result| result.cidr == "10.0.1.0/24")
            .unwrap();
        assert_eq!(failed.action, Action::Error);
        assert_eq!(failed.error_category, Some(ErrorCategory::Overlap));

        // The remaining leaves were still attempted.
        assert_eq!(gateway.created_networks.len(), 2);
    }

    /// A leaf whose parent container failed is still attempted standalone.
    #[test]
    fn test_run_attempts_leaves_after_container_failure() {
        let plan = test_plan();
        let executor = Executor::new("default");
        let mut gateway =
            RecordingGateway::default().fail_with("10.0.0.0/16", "Permission denied");
        let results = executor.run(&plan, &mut gateway);

        assert_eq!(results[0].action, Action::ErrorContainer);
        assert_eq!(results[0].error_category, Some(ErrorCategory::Permission));
        assert_eq!(gateway.created_networks.len(), 3);
    }
}
