use ibxsync::{CreationPlan, CreationStep, Existing, NetworkRecord, Result, WapiClient};
use log::{debug, info};
use std::collections::BTreeSet;

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Filter Records Already Present in InfoBlox
--------------------------------------------------------------------------------------*/

/// Drop records whose CIDR already exists in the view as a network or a container, so an
/// incremental run only plans creations for the genuinely missing networks.
pub fn filter_existing(
    client: &WapiClient,
    records: Vec<NetworkRecord>,
    network_view: &str,
) -> Result<Vec<NetworkRecord>> {
    let mut missing = Vec::with_capacity(records.len());
    let mut existing_networks = 0;
    let mut existing_containers = 0;

    for record in records {
        match client.check_network_or_container_exists(&record.cidr, network_view)? {
            Some(Existing::Network(_)) => {
                debug!("CIDR {} already exists as a network", record.cidr);
                existing_networks += 1;
            }
            Some(Existing::Container(_)) => {
                debug!("CIDR {} already exists as a network container", record.cidr);
                existing_containers += 1;
            }
            None => missing.push(record),
        }
    }

    info!(
        "{} CIDR(s) already exist ({existing_networks} networks, {existing_containers} \
         containers); {} missing",
        existing_networks + existing_containers,
        missing.len()
    );
    Ok(missing)
}

/*--------------------------------------------------------------------------------------
  Collect Extended Attribute Names from a Plan
--------------------------------------------------------------------------------------*/

/// All extended attribute names referenced by a creation plan, for pre-flight definition checks.
pub fn collect_attribute_names(plan: &CreationPlan) -> BTreeSet<String> {
    plan.steps
        .iter()
        .flat_map(|step| match step {
            CreationStep::CreateContainer { attributes, .. } => attributes.keys(),
            CreationStep::CreateNetwork { attributes, .. } => attributes.keys(),
        })
        .cloned()
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
