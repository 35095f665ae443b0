use std::{fmt::Debug, path::Path};

use crate::{
    components::files::RasterFile,
    errors::Result,
    stac::{Collection, Item},
};

pub mod clc;
pub mod clcplus;
pub(crate) mod common;
pub mod euhydro;
pub mod ibu;
pub mod n2k;
pub mod uabh;
pub mod vpp;

pub use clc::Clc;
pub use clcplus::ClcPlus;
pub use euhydro::EuHydro;
pub use ibu::Ibu10m;
pub use n2k::Natura2000;
pub use uabh::Uabh;
pub use vpp::Vpp;

/// A CLMS product family and how its archive maps onto STAC records.
pub trait Product: Debug + Sync {
    const COLLECTION_ID: &'static str;
    /// Stem of the product schema in `schema/products`.
    const SCHEMA: &'static str;

    /// What one item is built from.
    type Unit: Debug + Send + Sync;

    fn discover(&self, root: &Path) -> Result<Vec<Self::Unit>>;

    fn create_item<F: RasterFile>(&self, unit: &Self::Unit) -> Result<Item>;

    /// Directory below the collection the item is written to, `None` for flat.
    fn item_dir(&self, item: &Item) -> Option<String> {
        Some(item.id.clone())
    }

    /// `root` is the product archive, for families with collection level assets.
    fn create_collection(&self, root: Option<&Path>, items: &[Item]) -> Result<Collection>;
}

/// Product families known to the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ProductKind {
    Clc,
    Clcplus,
    Vpp,
    Uabh,
    Ibu10m,
    EuHydro,
    N2k,
}

impl ProductKind {
    pub const ALL: [ProductKind; 7] = [
        ProductKind::Clc,
        ProductKind::Clcplus,
        ProductKind::Vpp,
        ProductKind::Uabh,
        ProductKind::Ibu10m,
        ProductKind::EuHydro,
        ProductKind::N2k,
    ];

    pub fn collection_id(&self) -> &'static str {
        match self {
            ProductKind::Clc => Clc::COLLECTION_ID,
            ProductKind::Clcplus => ClcPlus::COLLECTION_ID,
            ProductKind::Vpp => Vpp::COLLECTION_ID,
            ProductKind::Uabh => Uabh::COLLECTION_ID,
            ProductKind::Ibu10m => Ibu10m::COLLECTION_ID,
            ProductKind::EuHydro => EuHydro::COLLECTION_ID,
            ProductKind::N2k => Natura2000::COLLECTION_ID,
        }
    }

    pub fn schema(&self) -> &'static str {
        match self {
            ProductKind::Clc => Clc::SCHEMA,
            ProductKind::Clcplus => ClcPlus::SCHEMA,
            ProductKind::Vpp => Vpp::SCHEMA,
            ProductKind::Uabh => Uabh::SCHEMA,
            ProductKind::Ibu10m => Ibu10m::SCHEMA,
            ProductKind::EuHydro => EuHydro::SCHEMA,
            ProductKind::N2k => Natura2000::SCHEMA,
        }
    }

    pub fn from_collection_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection_id() == id)
    }

    /// Families published as a bare collection.
    pub fn has_items(&self) -> bool {
        !matches!(self, ProductKind::EuHydro | ProductKind::N2k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn collection_ids_round_trip() {
        for kind in ProductKind::ALL {
            assert_eq!(ProductKind::from_collection_id(kind.collection_id()), Some(kind));
        }
        assert_eq!(ProductKind::from_collection_id("river-and-lake-ice-extent-s2"), None);
    }
}
