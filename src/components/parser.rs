use regex::Regex;
use std::path::Path;

use super::metadata::NameParts;

/// Which part of a file name a grammar is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// File name up to the first dot.
    Id,
    /// Full file name.
    Basename,
}

/// A product naming convention.
#[derive(Debug)]
pub struct FilenameGrammar {
    name: &'static str,
    field: Field,
    pattern: Regex,
}

impl FilenameGrammar {
    /// Grammars are compiled from literals; a bad pattern is a programming error.
    pub fn new(name: &'static str, field: Field, pattern: &str) -> Self {
        let pattern = Regex::new(pattern).expect("product grammar must compile");
        Self {
            name,
            field,
            pattern,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Merges the named captures found in `text` into `parts`.
    ///
    /// Groups that did not take part in the match are recorded as "".
    fn apply(&self, text: &str, parts: &mut NameParts) {
        let Some(captures) = self.pattern.captures(text) else {
            return;
        };
        for group in self.pattern.capture_names().flatten() {
            let value = captures.name(group).map_or("", |m| m.as_str());
            parts.insert(group, value);
        }
        parts.mark_matched(self.name);
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn id_and_suffix() -> &'static Regex {
    static PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
        Regex::new(r"^(?P<id>[A-Za-z0-9_-]*)\.(?P<suffix>.*)$").expect("literal pattern")
    });
    &PATTERN
}

/// Splits `path` into `dirname`, `basename`, `id` and `suffix`.
pub fn split_name<P: AsRef<Path>>(path: P) -> NameParts {
    let path = path.as_ref();
    let basename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dirname = path
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut parts = NameParts::new(basename.clone());
    if let Some(captures) = id_and_suffix().captures(&basename) {
        parts.insert("id", &captures["id"]);
        parts.insert("suffix", &captures["suffix"]);
    }
    parts.insert("dirname", dirname);
    parts.insert("basename", basename);
    parts
}

/// Splits `path` and applies the product `grammar` on top.
///
/// Never fails; use [`NameParts::require`] when the grammar has to match.
pub fn deconstruct<P: AsRef<Path>>(path: P, grammar: &FilenameGrammar) -> NameParts {
    let mut parts = split_name(path);
    let field = match grammar.field {
        Field::Id => parts.get("id").ok().map(str::to_owned),
        Field::Basename => parts.get("basename").ok().map(str::to_owned),
    };
    if let Some(text) = field {
        grammar.apply(&text, &mut parts);
    }
    parts
}

/// Applies `grammar` to a bare identifier, such as an item id.
pub fn deconstruct_id(id: &str, grammar: &FilenameGrammar) -> NameParts {
    let mut parts = NameParts::new(id.to_owned());
    parts.insert("id", id);
    grammar.apply(id, &mut parts);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use rstest::rstest;

    #[rstest]
    #[case("data/U2018_CLC2018_V2020_20u1.tif", "U2018_CLC2018_V2020_20u1", "tif")]
    #[case("x/U2018_CLC2018_V2020_20u1.tif.aux.xml", "U2018_CLC2018_V2020_20u1", "tif.aux.xml")]
    #[case("readme_x-y.txt", "readme_x-y", "txt")]
    fn splits_on_first_dot(#[case] path: &str, #[case] id: &str, #[case] suffix: &str) {
        let parts = split_name(path);
        assert_eq!(parts.get("id").unwrap(), id);
        assert_eq!(parts.get("suffix").unwrap(), suffix);
    }

    #[rstest]
    fn names_without_suffix_have_no_id() {
        let parts = split_name("some dir/Legend");
        assert_eq!(parts.get("basename").unwrap(), "Legend");
        assert_eq!(parts.get("dirname").unwrap(), "some dir");
        assert!(parts.get("id").is_err());
    }

    #[rstest]
    fn optional_groups_are_empty() {
        let grammar = FilenameGrammar::new("test", Field::Id, r"^(?P<a>[a-z]+)_?(?P<b>[0-9]+)?");
        let parts = deconstruct("abc.tif", &grammar).require(&grammar).unwrap();
        assert_eq!(parts.get("a").unwrap(), "abc");
        assert_eq!(parts.get("b").unwrap(), "");
    }

    #[rstest]
    fn unmatched_grammar_is_reported_by_require() {
        let grammar = FilenameGrammar::new("digits", Field::Basename, r"^\d+$");
        let parts = deconstruct("abc.tif", &grammar);
        assert!(parts.grammar().is_none());
        assert!(matches!(
            parts.require(&grammar),
            Err(CatalogError::UnrecognizedName(name)) if name == "abc.tif"
        ));
    }
}
