//! Pieces shared by every CLMS product family.
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    errors::Result,
    stac::{Link, Provider, ProviderRole},
};

const CLMS_DESCRIPTION: &str = "The Copernicus Land Monitoring Service provides geographical \
information on land cover and its changes, land use, ground motions, vegetation state, water \
cycle and Earth's surface energy variables to a broad range of users in Europe and across the \
World in the field of environmental terrestrial applications.";

pub fn clms_license() -> Link {
    Link::new("license", "https://land.copernicus.eu/en/data-policy")
        .with_title("Legal notice on the use of CLMS data")
}

pub fn clms_provider() -> Provider {
    Provider {
        name: "Copernicus Land Monitoring Service".into(),
        description: Some(CLMS_DESCRIPTION.into()),
        roles: vec![ProviderRole::Licensor, ProviderRole::Host],
        url: Some("https://land.copernicus.eu".into()),
    }
}

pub fn vito_provider() -> Provider {
    Provider {
        name: "VITO NV".into(),
        description: Some(
            "VITO is an independent Flemish research organisation in the area of cleantech and \
             sustainable development."
                .into(),
        ),
        roles: vec![ProviderRole::Processor, ProviderRole::Producer],
        url: Some("https://vito.be".into()),
    }
}

/// Every file below `root`, in a stable order.
pub fn files_under(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Every directory below `root` whose name ends with `suffix`, without descending into them.
pub fn dirs_with_suffix(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.file_type().is_dir() && file_name(entry.path()).ends_with(suffix) {
            dirs.push(entry.into_path());
            walker.skip_current_dir();
        }
    }
    Ok(dirs)
}

/// Files under `root` ending in each of `extensions`, grouped in that order.
///
/// `gdb` stands for File Geodatabase directories rather than files.
pub fn by_extension(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let files = files_under(root)?;
    let mut found = Vec::new();
    for extension in extensions {
        if *extension == "gdb" {
            found.extend(dirs_with_suffix(root, ".gdb")?);
            continue;
        }
        let suffix = format!(".{extension}");
        found.extend(
            files
                .iter()
                .filter(|path| file_name(path).ends_with(&suffix))
                .cloned(),
        );
    }
    Ok(found)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Asset key derived from a file name: dots become underscores.
pub fn asset_key(name: &str) -> String {
    name.replace('.', "_")
}

pub fn href(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn modified(path: &Path) -> Result<DateTime<Utc>> {
    Ok(std::fs::metadata(path)?.modified()?.into())
}

/// Upper-cases the first letter of every word and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut word_start = true;
    for character in text.chars() {
        if word_start {
            titled.extend(character.to_uppercase());
        } else {
            titled.extend(character.to_lowercase());
        }
        word_start = !character.is_alphabetic();
    }
    titled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("WIEN", "Wien")]
    #[case("LA CORUNA", "La Coruna")]
    #[case("SAINT-ETIENNE", "Saint-Etienne")]
    fn titles(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(title_case(text), expected);
    }

    #[rstest]
    fn gdb_directories_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/EU_HYDRO.gdb/inner.gdb")).unwrap();
        std::fs::write(dir.path().join("a/EU_HYDRO.gdb/x.gdbtable"), "").unwrap();
        let dirs = dirs_with_suffix(dir.path(), ".gdb").unwrap();
        assert_eq!(dirs, [dir.path().join("a/EU_HYDRO.gdb")]);
        assert_eq!(files_under(dir.path()).unwrap().len(), 1);
    }

    #[rstest]
    fn grouped_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/EU_HYDRO.gdb")).unwrap();
        for file in ["a.pdf", "b/c.xml", "b/a.xml"] {
            std::fs::write(dir.path().join(file), "").unwrap();
        }
        let names: Vec<_> = by_extension(dir.path(), &["xml", "gdb", "pdf"])
            .unwrap()
            .iter()
            .map(|path| file_name(path))
            .collect();
        assert_eq!(names, ["a.xml", "c.xml", "EU_HYDRO.gdb", "a.pdf"]);
    }
}
