use lazy_static::lazy_static;
use log::warn;
use serde::Deserialize;
use std::collections::BTreeMap;

/*-------------------------------------------------------------------------------------------------
  AWS Tag Parsing
-------------------------------------------------------------------------------------------------*/

/// One AWS tag entry as exported in a VPC tag blob.
#[derive(Debug, Deserialize)]
struct TagEntry {
    #[serde(rename = "Key")]
    key: String,

    #[serde(rename = "Value")]
    value: String,
}

/// Parse an AWS tag blob (the `Tags` CSV column) into a key/value map.
///
/// Blobs are JSON arrays of `{"Key": ..., "Value": ...}` objects. Exports produced by Python
/// tooling commonly carry single-quoted (repr-style) blobs instead, so a repr-to-JSON fallback
/// is attempted before giving up. An unparsable blob yields an empty map with a logged warning;
/// tag data is best-effort metadata and never fails a batch.
pub fn parse_tag_blob(tags: &str) -> BTreeMap<String, String> {
    let tags = tags.trim();
    if tags.is_empty() || tags == "[]" {
        return BTreeMap::new();
    }

    let entries: Option<Vec<TagEntry>> = serde_json::from_str(tags)
        .ok()
        .or_else(|| serde_json::from_str(&repr_blob_to_json(tags)).ok());

    match entries {
        Some(entries) => entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect(),
        None => {
            let preview: String = tags.chars().take(100).collect();
            warn!("Error parsing tags: {preview}...");
            BTreeMap::new()
        }
    }
}

/// Convert a Python-repr tag blob to JSON by rewriting only the single quotes that delimit
/// strings.
///
/// A single quote opens a string when the preceding non-whitespace character is structural
/// (`[`, `{`, `,`, `:`, or the start of the blob) and closes one when the following
/// non-whitespace character is structural. Apostrophes inside values are left alone, and double
/// quotes inside a rewritten string are escaped for JSON. Values the repr already double-quotes
/// (those containing an apostrophe) pass through unchanged.
fn repr_blob_to_json(blob: &str) -> String {
    let chars: Vec<char> = blob.chars().collect();
    let mut json = String::with_capacity(blob.len());
    let mut in_string = false;

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\'' if !in_string => {
                let prev = chars[..i].iter().rev().find(|ch| !ch.is_whitespace());
                if matches!(prev, None | Some('[' | '{' | ',' | ':')) {
                    in_string = true;
                    json.push('"');
                } else {
                    json.push(c);
                }
            }
            '\'' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if matches!(next, None | Some(']' | '}' | ',' | ':')) {
                    in_string = false;
                    json.push('"');
                } else {
                    json.push(c);
                }
            }
            '"' if in_string => json.push_str("\\\""),
            _ => json.push(c),
        }
    }

    json
}

/*-------------------------------------------------------------------------------------------------
  Tag to Extended Attribute Mapping
-------------------------------------------------------------------------------------------------*/

lazy_static! {
    /// Fixed mapping from well-known AWS tag keys to InfoBlox extended attribute names.
    static ref TAG_EA_MAPPING: BTreeMap<&'static str, &'static str> = [
        ("Name", "aws_name"),
        ("environment", "environment"),
        ("Environment", "environment"),
        ("owner", "owner"),
        ("Owner", "owner"),
        ("project", "project"),
        ("Project", "project"),
        ("location", "aws_location"),
        ("Location", "aws_location"),
        ("cloudservice", "aws_cloudservice"),
        ("createdby", "aws_created_by"),
        ("RequestedBy", "aws_requested_by"),
        ("Requested_By", "aws_requested_by"),
        ("dud", "aws_dud"),
        ("AccountId", "aws_account_id"),
        ("Region", "aws_region"),
        ("VpcId", "aws_vpc_id"),
        ("Description", "description"),
    ]
    .into_iter()
    .collect();
}

/// The maximum length InfoBlox accepts for an extended attribute value.
const EA_VALUE_MAX_LENGTH: usize = 255;

/// Map AWS tags to InfoBlox extended attributes.
///
/// Well-known tag keys use the fixed mapping table; any unmapped key becomes
/// `aws_<lowercased key>`. All attribute names are lowercased with dashes and spaces replaced by
/// underscores, and values are truncated to 255 characters.
pub fn map_tags_to_eas(tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    tags.iter()
        .map(|(key, value)| {
            let ea_name = match TAG_EA_MAPPING.get(key.as_str()) {
                Some(mapped) => mapped.to_string(),
                None => format!("aws_{}", key.to_lowercase()),
            };
            let ea_name = ea_name.replace(['-', ' '], "_").to_lowercase();

            let ea_value: String = value.chars().take(EA_VALUE_MAX_LENGTH).collect();

            (ea_name, ea_value)
        })
        .collect()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
