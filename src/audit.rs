//! Consistency checks over a written catalog tree.
use log::{debug, warn};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::{
    errors::Result,
    products::ProductKind,
    stac::{layout::read, SchemaValidator},
};

/// One problem found in one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

fn stem(href: &str) -> &str {
    let name = href.rsplit('/').next().unwrap_or(href);
    name.strip_suffix(".json").unwrap_or(name)
}

fn link_href<'a>(record: &'a Value, rel: &str) -> Option<&'a str> {
    record["links"]
        .as_array()?
        .iter()
        .find(|link| link["rel"] == rel)?
        .get("href")?
        .as_str()
}

/// Checks every JSON record under `root`.
///
/// Product schemas are looked up in `schema_dir` first, as for writing.
pub fn audit(root: &Path, schema_dir: Option<&Path>) -> Result<Vec<Finding>> {
    let mut validators: HashMap<ProductKind, SchemaValidator> = HashMap::new();
    let mut findings = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|extension| extension.to_str()) != Some("json")
        {
            continue;
        }
        let mut report = |message: String| {
            findings.push(Finding {
                path: path.to_path_buf(),
                message,
            })
        };
        let record: Value = match read(path) {
            Ok(record) => record,
            Err(err) => {
                report(format!("not a JSON record: {err}"));
                continue;
            }
        };
        debug!("Auditing {}", path.display());

        let id = record["id"].as_str().unwrap_or_default();
        let file_stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if id != file_stem {
            report(format!("id `{id}` does not match the file name"));
        }

        let collection_id = match record["type"].as_str() {
            Some("Feature") => {
                let collection = record["collection"].as_str().unwrap_or_default();
                for rel in ["parent", "collection"] {
                    match link_href(&record, rel) {
                        Some(href) if stem(href) == collection => {}
                        Some(href) => report(format!(
                            "`{rel}` link {href} does not point at collection `{collection}`"
                        )),
                        None => report(format!("no `{rel}` link")),
                    }
                }
                collection
            }
            Some("Collection") => id,
            _ => continue,
        };

        let Some(kind) = ProductKind::from_collection_id(collection_id) else {
            warn!("{}: no product schema for `{collection_id}`", path.display());
            continue;
        };
        if !validators.contains_key(&kind) {
            validators.insert(kind, SchemaValidator::for_product(kind.schema(), schema_dir)?);
        }
        if let Some(reason) = validators[&kind].best_match(&record) {
            report(reason);
        }
    }
    Ok(findings)
}
