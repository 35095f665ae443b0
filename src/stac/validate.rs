use jsonschema::Validator;
use log::debug;
use serde_json::Value;
use std::path::Path;

use super::StacRecord;
use crate::errors::{CatalogError, Result};

/// Product schemas compiled into the binary, keyed by file stem.
const EMBEDDED: &[(&str, &str)] = &[
    ("clc", include_str!("../../schema/products/clc.json")),
    ("clcplus", include_str!("../../schema/products/clcplus.json")),
    ("vpp", include_str!("../../schema/products/vpp.json")),
    ("uabh", include_str!("../../schema/products/uabh.json")),
    ("ibu10m", include_str!("../../schema/products/ibu10m.json")),
    ("eu-hydro", include_str!("../../schema/products/eu-hydro.json")),
    ("n2k", include_str!("../../schema/products/n2k.json")),
];

/// A compiled Draft 7 product schema.
pub struct SchemaValidator {
    name: String,
    validator: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish()
    }
}

impl SchemaValidator {
    pub fn from_value(name: impl Into<String>, schema: &Value) -> Result<Self> {
        let name = name.into();
        let validator = jsonschema::draft7::new(schema)
            .map_err(|error| CatalogError::BadSchema(name.clone(), error.to_string()))?;
        Ok(Self { name, validator })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let schema: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        Self::from_value(path.display().to_string(), &schema)
    }

    /// `{schema_dir}/{name}.json` when present, the embedded copy otherwise.
    pub fn for_product(name: &str, schema_dir: Option<&Path>) -> Result<Self> {
        if let Some(path) = schema_dir
            .map(|dir| dir.join(format!("{name}.json")))
            .filter(|path| path.is_file())
        {
            debug!("Loading schema {}", path.display());
            return Self::from_file(path);
        }
        let (_, text) = EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .ok_or_else(|| CatalogError::BadSchema(name.into(), "no such product schema".into()))?;
        Self::from_value(name, &serde_json::from_str(text)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most relevant violation, if any: the one closest to the document root.
    pub fn best_match(&self, instance: &Value) -> Option<String> {
        self.validator
            .iter_errors(instance)
            .map(|error| {
                let depth = error.instance_path.to_string().matches('/').count();
                (depth, error.to_string())
            })
            .min_by_key(|(depth, _)| *depth)
            .map(|(_, message)| message)
    }

    pub fn validate_value(&self, id: &str, instance: &Value) -> Result<()> {
        match self.best_match(instance) {
            None => Ok(()),
            Some(reason) => Err(CatalogError::Invalid {
                id: id.into(),
                reason,
            }),
        }
    }

    pub fn validate<R: StacRecord>(&self, record: &R) -> Result<()> {
        self.validate_value(record.id(), &serde_json::to_value(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn schema() -> SchemaValidator {
        SchemaValidator::from_value(
            "test",
            &json!({
                "type": "object",
                "required": ["id", "properties"],
                "properties": {
                    "id": {"type": "string"},
                    "properties": {
                        "type": "object",
                        "properties": {"created": {"type": "string"}}
                    }
                }
            }),
        )
        .unwrap()
    }

    #[rstest]
    fn valid_document_passes() {
        let document = json!({"id": "a", "properties": {"created": "2020-01-01"}});
        assert!(schema().validate_value("a", &document).is_ok());
    }

    #[rstest]
    fn shallowest_error_wins() {
        let document = json!({"id": "a", "properties": {"created": 5}, "extra": 1});
        let without_id = json!({"properties": {"created": 5}});
        let reason = schema().best_match(&without_id).unwrap();
        assert!(reason.contains("id"), "{reason}");
        let reason = schema().best_match(&document).unwrap();
        assert!(reason.contains('5'), "{reason}");
    }

    #[rstest]
    fn invalid_names_the_record() {
        let error = schema()
            .validate_value("U2018_CLC2018_V2020_20u1", &json!({"id": 1, "properties": {}}))
            .unwrap_err();
        assert!(error
            .to_string()
            .starts_with("Failed to create U2018_CLC2018_V2020_20u1. Reason: "));
    }

    #[rstest]
    #[case("clc")]
    #[case("clcplus")]
    #[case("vpp")]
    #[case("uabh")]
    #[case("ibu10m")]
    #[case("eu-hydro")]
    #[case("n2k")]
    fn embedded_schemas_compile(#[case] name: &str) {
        assert!(SchemaValidator::for_product(name, None).is_ok());
    }

    #[rstest]
    fn unknown_schema_is_an_error() {
        assert!(matches!(
            SchemaValidator::for_product("rlie-s2", None),
            Err(CatalogError::BadSchema(..))
        ));
    }

    #[rstest]
    fn schema_dir_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clc.json"), r#"{"const": 1}"#).unwrap();
        let validator = SchemaValidator::for_product("clc", Some(dir.path())).unwrap();
        assert!(validator.name().ends_with("clc.json"));
        assert!(validator.validate_value("x", &json!(1)).is_ok());
    }
}
