use std::collections::HashMap;

use super::parser::FilenameGrammar;
use crate::errors::{CatalogError, Result};

/// Named parts of a product file name.
#[derive(Debug, Default, Clone)]
pub struct NameParts {
    description: String,
    grammar: Option<&'static str>,
    hashmap: HashMap<String, String>,
}

impl NameParts {
    pub fn new(description: String) -> Self {
        Self {
            description,
            grammar: None,
            hashmap: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.hashmap.insert(key.into(), value.into());
    }

    pub(crate) fn mark_matched(&mut self, grammar: &'static str) {
        self.grammar = Some(grammar);
    }

    /// Name of the product grammar that matched, if any.
    pub fn grammar(&self) -> Option<&'static str> {
        self.grammar
    }

    /// Fails unless `grammar` matched when these parts were built.
    pub fn require(self, grammar: &FilenameGrammar) -> Result<Self> {
        if self.grammar == Some(grammar.name()) {
            Ok(self)
        } else {
            Err(CatalogError::UnrecognizedName(self.description))
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.hashmap
            .get(key)
            .map(String::as_str)
            .ok_or(CatalogError::MissingNamePart {
                name: self.description.clone(),
                key: key.into(),
            })
    }

    pub fn year(&self, key: &str) -> Result<i32> {
        self.get(key)?
            .parse()
            .map_err(|_| CatalogError::MissingNamePart {
                name: self.description.clone(),
                key: key.into(),
            })
    }

    /// Substitutes every `{key}` of `template` with the matching part.
    pub fn format(&self, template: &str) -> Result<String> {
        let mut formatted = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            formatted.push_str(&rest[..open]);
            let Some(close) = rest[open..].find('}') else {
                formatted.push_str(&rest[open..]);
                return Ok(formatted);
            };
            formatted.push_str(self.get(&rest[open + 1..open + close])?);
            rest = &rest[open + close + 1..];
        }
        formatted.push_str(rest);
        Ok(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parts() -> NameParts {
        let mut parts = NameParts::new("U2018_CLC2018_V2020_20u1.tif".into());
        parts.insert("update_campaign", "2018");
        parts.insert("theme", "CLC");
        parts.insert("reference_year", "2018");
        parts
    }

    #[rstest]
    fn missing_key_names_the_file() {
        let err = parts().get("DOM_code").unwrap_err();
        assert_eq!(
            err.to_string(),
            "U2018_CLC2018_V2020_20u1.tif: no `DOM_code` in file name"
        );
    }

    #[rstest]
    #[case("u{update_campaign}_{theme}{reference_year}", "u2018_CLC2018")]
    #[case("no placeholders", "no placeholders")]
    #[case("dangling {theme", "dangling {theme")]
    fn format_substitutes(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(parts().format(template).unwrap(), expected);
    }

    #[rstest]
    fn format_fails_on_unknown_key() {
        assert!(parts().format("{release_year}").is_err());
    }

    #[rstest]
    fn year_parses() {
        assert_eq!(parts().year("reference_year").unwrap(), 2018);
        assert!(parts().year("theme").is_err());
    }
}
