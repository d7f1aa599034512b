use ibxsync::{CreationResult, Result};
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Save Creation Results to CSV File
-------------------------------------------------------------------------------------------------*/

pub fn save(results: &[CreationResult], path: &PathBuf) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize(&[
        "CIDR",
        "Source Key",
        "Action",
        "Type",
        "Parent Container",
        "Contained Networks",
        "Error Category",
        "Error",
    ])?;

    // Write result records
    for result in results {
        let record = (
            &result.cidr,
            &result.source_key,
            result.action.to_string(),
            if result.action.is_container() {
                "Container"
            } else {
                "Network"
            },
            result.parent_container.as_deref().unwrap_or(""),
            result.contained_count,
            result
                .error_category
                .map_or_else(String::new, |category| category.to_string()),
            result.error.as_deref().unwrap_or(""),
        );
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
