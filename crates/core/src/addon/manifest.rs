//! Addon manifest.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogKind;

pub const FILMS_CATALOG_ID: &str = "cinefeed_films";
pub const DOCUMENTARIES_CATALOG_ID: &str = "cinefeed_documentaries";

/// The addon manifest served to the media-center client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    #[serde(rename = "idPrefixes")]
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<CatalogDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    #[serde(rename = "type")]
    pub media_type: String,
    pub id: String,
    pub name: String,
    pub extra: Vec<ExtraField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraField {
    pub name: String,
    #[serde(rename = "isRequired")]
    pub is_required: bool,
}

fn catalog_definition(id: &str, name: &str) -> CatalogDefinition {
    CatalogDefinition {
        media_type: "movie".to_string(),
        id: id.to_string(),
        name: name.to_string(),
        extra: vec![
            ExtraField {
                name: "skip".to_string(),
                is_required: false,
            },
            ExtraField {
                name: "search".to_string(),
                is_required: false,
            },
        ],
    }
}

/// Build the manifest.
pub fn manifest() -> Manifest {
    Manifest {
        id: "community.cinefeed.catalog".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "Cinefeed".to_string(),
        description: "Film and documentary catalogs".to_string(),
        resources: vec!["catalog".to_string()],
        types: vec!["movie".to_string()],
        id_prefixes: vec!["tt".to_string()],
        catalogs: vec![
            catalog_definition(FILMS_CATALOG_ID, "Cinefeed Films"),
            catalog_definition(DOCUMENTARIES_CATALOG_ID, "Cinefeed Documentaries"),
        ],
    }
}

/// Map a public catalog id to its stored kind.
pub(crate) fn catalog_kind_for_id(id: &str) -> Option<CatalogKind> {
    match id {
        FILMS_CATALOG_ID => Some(CatalogKind::Film),
        DOCUMENTARIES_CATALOG_ID => Some(CatalogKind::Documentary),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_shape() {
        let manifest = manifest();
        assert_eq!(manifest.resources, vec!["catalog"]);
        assert_eq!(manifest.types, vec!["movie"]);
        assert_eq!(manifest.id_prefixes, vec!["tt"]);
        assert_eq!(manifest.catalogs.len(), 2);
        assert_eq!(manifest.catalogs[0].id, FILMS_CATALOG_ID);
        assert_eq!(manifest.catalogs[1].id, DOCUMENTARIES_CATALOG_ID);
    }

    #[test]
    fn test_manifest_serialization_uses_client_field_names() {
        let json = serde_json::to_string(&manifest()).unwrap();
        assert!(json.contains("\"idPrefixes\""));
        assert!(json.contains("\"isRequired\""));
        assert!(json.contains("\"type\":\"movie\""));
    }

    #[test]
    fn test_catalog_kind_mapping() {
        use crate::catalog::CatalogKind;
        assert_eq!(
            catalog_kind_for_id(FILMS_CATALOG_ID),
            Some(CatalogKind::Film)
        );
        assert_eq!(
            catalog_kind_for_id(DOCUMENTARIES_CATALOG_ID),
            Some(CatalogKind::Documentary)
        );
        assert_eq!(catalog_kind_for_id("someone_elses_catalog"), None);
    }
}
