use ibxsync::{CreationResult, HierarchyAnalysis};
use log::{info, warn};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Hierarchy Analysis
--------------------------------------------------------------------------------------*/

pub fn analysis_summary(analysis: &HierarchyAnalysis) {
    let container_count = analysis.containers.len();
    if container_count > 0 {
        info!("{container_count} network(s) will be created as containers");
        for container in &analysis.containers {
            let contained_count = analysis
                .relationships
                .get(container)
                .map_or(0, Vec::len);
            info!("  {container} (contains {contained_count} networks)");
        }
    }

    let overlap_count = analysis.overlaps.len();
    if overlap_count > 0 {
        warn!("{overlap_count} partial overlap(s) detected");
        for overlap in &analysis.overlaps {
            warn!("  {}", overlap.message);
        }
    }

    let invalid_count = analysis.invalid.len();
    if invalid_count > 0 {
        warn!("{invalid_count} record(s) excluded for invalid CIDRs");
        for invalid in &analysis.invalid {
            warn!(
                "  {:?} ({}): {}",
                invalid.record.cidr, invalid.record.source_key, invalid.reason
            );
        }
    }
}

/*--------------------------------------------------------------------------------------
  Execution Results
--------------------------------------------------------------------------------------*/

pub fn execution_summary(results: &[CreationResult]) {
    let error_count = results
        .iter()
        .filter(|result| result.action.is_error())
        .count();
    let success_count = results.len() - error_count;

    info!("{success_count} creation step(s) succeeded");
    if error_count > 0 {
        warn!("{error_count} creation step(s) failed");
        for result in results.iter().filter(|result| result.action.is_error()) {
            warn!(
                "  {} ({}): {}",
                result.cidr,
                result
                    .error_category
                    .map_or_else(|| "unknown".to_string(), |category| category.to_string()),
                result.error.as_deref().unwrap_or("")
            );
        }
    }
}
