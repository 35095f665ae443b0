use log::{debug, info};
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use walkdir::WalkDir;

use super::{Catalog, Collection, Item, Link, StacRecord};
use crate::errors::Result;

pub const CATALOG_FILE: &str = "clms_catalog.json";

/// Where records live under the output root.
///
/// ```text
/// {root}/clms_catalog.json
/// {root}/{collection}/{collection}.json
/// {root}/{collection}/[{item_dir}/]{item}.json
/// ```
#[derive(Debug, Clone)]
pub struct StacLayout {
    root: PathBuf,
}

impl StacLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{collection}.json"))
    }

    pub fn item_path(&self, collection: &str, item_dir: Option<&str>, id: &str) -> PathBuf {
        let mut path = self.collection_dir(collection);
        if let Some(dir) = item_dir {
            path.push(dir);
        }
        path.join(format!("{id}.json"))
    }

    /// Root, parent, collection and self links of an item written to `path`.
    pub fn link_item(&self, item: &mut Item, path: &Path) -> Result<()> {
        let collection = item.collection.clone().unwrap_or_default();
        let from = parent_dir(path);
        let collection_href = relative_href(from, &self.collection_path(&collection));
        item.set_link(Link::json("root", relative_href(from, &self.catalog_path())));
        item.set_link(Link::json("parent", collection_href.clone()));
        item.set_link(Link::json("collection", collection_href));
        item.set_link(Link::json("self", absolute_href(path)?));
        Ok(())
    }

    /// Root, parent, self and one `item` link per entry of `items`.
    pub fn link_collection(&self, collection: &mut Collection, items: &[(PathBuf, Item)]) -> Result<()> {
        let path = self.collection_path(&collection.id);
        let from = parent_dir(&path);
        let catalog_href = relative_href(from, &self.catalog_path());
        collection.set_link(Link::json("root", catalog_href.clone()));
        collection.set_link(Link::json("parent", catalog_href));
        collection.set_link(Link::json("self", absolute_href(&path)?));
        collection.links.retain(|link| link.rel != "item");
        for (item_path, item) in items {
            collection.add_link(Link::json("item", relative_href(from, item_path)).with_title(&item.id));
        }
        Ok(())
    }

    /// Makes sure the root catalog exists and lists `collection` as a child.
    pub fn register_collection(&self, collection: &Collection) -> Result<()> {
        let path = self.catalog_path();
        let mut catalog = if path.is_file() {
            read(&path)?
        } else {
            info!("Creating root catalog {}", path.display());
            Catalog::clms()
        };
        let href = relative_href(&self.root, &self.collection_path(&collection.id));
        if catalog.add_child(&href, collection.title.as_deref()) || !path.is_file() {
            catalog.set_link(Link::json("root", format!("./{CATALOG_FILE}")));
            self.write(&path, &catalog)?;
        }
        Ok(())
    }

    /// Pretty JSON, overwriting whatever is at `path`.
    pub fn write<R: StacRecord>(&self, path: &Path, record: &R) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(record)?)?;
        debug!("Wrote {} to {}", record.id(), path.display());
        Ok(())
    }

    /// Items already written under the `collection` directory, sorted by path.
    pub fn read_items(&self, collection: &str) -> Result<Vec<(PathBuf, Item)>> {
        let dir = self.collection_dir(collection);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let own = self.collection_path(collection);
        let mut items = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path == own
                || path.extension().and_then(|extension| extension.to_str()) != Some("json")
            {
                continue;
            }
            let value: serde_json::Value = read(path)?;
            if value["type"] == "Feature" {
                items.push((path.to_path_buf(), serde_json::from_value(value)?));
            }
        }
        Ok(items)
    }
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

fn absolute_href(path: &Path) -> Result<String> {
    Ok(std::path::absolute(path)?.to_string_lossy().replace('\\', "/"))
}

/// Href of `to` as seen from directory `from`, with `/` separators.
pub fn relative_href(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<Component> = to.components().filter(|c| *c != Component::CurDir).collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(lhs, rhs)| lhs == rhs)
        .count();

    let mut parts: Vec<String> = Vec::new();
    if common == from.len() {
        parts.push(".".into());
    }
    parts.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
