use chrono::Utc;
use ibxsync::{map_tags_to_eas, parse_tag_blob, NetworkRecord, Result};
use log::{info, warn};
use serde::Deserialize;
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  Load VPC Records from CSV
-------------------------------------------------------------------------------------------------*/

/// One row of an AWS VPC inventory export.
#[derive(Debug, Deserialize)]
struct VpcRow {
    #[serde(rename = "CidrBlock")]
    cidr_block: String,

    #[serde(rename = "VpcId", default)]
    vpc_id: String,

    #[serde(rename = "Tags", default)]
    tags: String,
}

/// Load VPC records from a CSV export, parsing each row's tag blob and mapping the tags to
/// InfoBlox extended attributes. Rows that fail to deserialize are skipped with a warning;
/// a bad row never fails the batch.
pub fn load_records(path: &Path) -> Result<Vec<NetworkRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let import_date = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut records = Vec::new();
    for row in reader.deserialize::<VpcRow>() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                warn!("Skipping unreadable VPC record: {error}");
                continue;
            }
        };

        let tags = parse_tag_blob(&row.tags);
        let mut attributes = map_tags_to_eas(&tags);
        if !row.vpc_id.is_empty() {
            attributes
                .entry("aws_vpc_id".to_string())
                .or_insert_with(|| row.vpc_id.clone());
        }
        attributes.insert("import_date".to_string(), import_date.clone());

        records.push(NetworkRecord::with_attributes(
            &row.cidr_block,
            &row.vpc_id,
            attributes,
        ));
    }

    info!("Loaded {} VPC records from {:?}", records.len(), path);
    Ok(records)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
