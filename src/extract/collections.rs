//! Collection membership and grouping helpers for the extraction engine.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::model::{Album, AlbumType, Asset, AssetSubtype};
use crate::policy::CollectionFilter;

/// The runtime identity of a destination folder. Smart-folder collections
/// carry a `nua_` prefix in their title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub title: String,
    pub is_nua: bool,
}

/// Drop repeated asset UUIDs, keeping the first occurrence.
pub fn deduplicate_assets(assets: &[Asset]) -> Vec<&Asset> {
    let mut seen = HashSet::new();
    assets
        .iter()
        .filter(|asset| seen.insert(asset.asset_uuid.as_str()))
        .collect()
}

/// Split burst frames out of the main asset list, grouped by burst UUID.
/// Frames keep their backup order within each group.
pub fn separate_burst_frames(
    assets: Vec<&Asset>,
) -> (BTreeMap<String, Vec<&Asset>>, Vec<&Asset>) {
    let mut burst_groups: BTreeMap<String, Vec<&Asset>> = BTreeMap::new();
    let mut asset_list = Vec::new();

    for asset in assets {
        match (&asset.subtype, &asset.burst_uuid) {
            (AssetSubtype::BurstFrame, Some(burst_uuid)) => {
                burst_groups.entry(burst_uuid.clone()).or_default().push(asset);
            }
            _ => asset_list.push(asset),
        }
    }

    (burst_groups, asset_list)
}

/// UUID-to-title lookup over user albums only.
pub fn album_title_map(albums: &[Album]) -> HashMap<&str, &str> {
    albums
        .iter()
        .filter(|album| album.album_type == AlbumType::User)
        .map(|album| (album.album_uuid.as_str(), album.title.as_str()))
        .collect()
}

/// Normalise a smart-folder display name ("Recently Deleted") to the slug
/// used for folder names and flag matching ("recently_deleted").
fn nua_slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Resolve the collections an asset belongs to under the active filter.
///
/// User-album UUIDs with no known title are dropped. In blacklist mode a
/// collection is included unless listed; in whitelist mode only when listed.
pub fn active_collections(
    asset: &Asset,
    filter: &CollectionFilter,
    titles: &HashMap<&str, &str>,
) -> Vec<CollectionRef> {
    let ua_names: HashSet<&str> = filter
        .entries
        .iter()
        .filter(|entry| !entry.is_nua)
        .map(|entry| entry.name.as_str())
        .collect();
    let nua_names: HashSet<String> = filter
        .entries
        .iter()
        .filter(|entry| entry.is_nua)
        .map(|entry| nua_slug(&entry.name))
        .collect();

    let mut result = Vec::new();

    for album_uuid in &asset.relationships.user_albums {
        let Some(title) = titles.get(album_uuid.as_str()) else {
            continue;
        };

        let listed = ua_names.contains(title);
        let include = if filter.is_blacklist { !listed } else { listed };
        if include {
            result.push(CollectionRef {
                title: (*title).to_string(),
                is_nua: false,
            });
        }
    }

    for folder in &asset.relationships.smart_folders {
        let slug = folder.slug();
        let listed = nua_names.contains(slug);
        let include = if filter.is_blacklist { !listed } else { listed };
        if include {
            result.push(CollectionRef {
                title: format!("nua_{slug}"),
                is_nua: true,
            });
        }
    }

    result
}

/// Filename to use when placing a possibly-converted asset: the original
/// stem plus either the converted file's extension or the original
/// extension lowercased.
pub fn dest_name(asset: &Asset, resolved: &Asset) -> String {
    let stem = Path::new(&asset.original_filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if resolved.backup_relative_path != asset.backup_relative_path {
        match Path::new(&resolved.backup_relative_path).extension() {
            Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
            None => stem,
        }
    } else {
        format!("{stem}.{}", asset.file_extension.to_lowercase())
    }
}
