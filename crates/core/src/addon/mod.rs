//! Listing-protocol adapter.
//!
//! Exposes the catalog to a third-party media-center client: a manifest
//! describing the available catalogs and a preview-record transform for
//! catalog responses.

mod manifest;
mod preview;

pub use manifest::{
    manifest, CatalogDefinition, ExtraField, Manifest, DOCUMENTARIES_CATALOG_ID, FILMS_CATALOG_ID,
};
pub use preview::{handle_catalog, to_meta_preview, CatalogResponse, MetaPreview, PAGE_LIMIT};
