//! Cycle end: cache, manifest, package and source list.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::warn;

use crate::collect::{CollectionOutcome, ConsumedSource};
use crate::config::Config;
use crate::node::ProxyNode;
use crate::storage::{
    manifest_entry, write_cache_file, write_manifest, write_package, write_source_list,
};

/// Caches the content of contributing sources and writes their manifest.
///
/// A source whose content cannot be cached is left out of the manifest.
pub fn write_cache_and_manifest(config: &Config, outcome: &CollectionOutcome) -> Result<usize> {
    let base_url = config.cache_base_url.as_deref();
    let mut entries = Vec::new();
    for source in outcome.contributors() {
        match write_cache_file(&config.cache_dir, &source.id, &source.body) {
            Ok(_) => entries.push(manifest_entry(base_url, &config.cache_dir, &source.id)),
            Err(e) => warn!("Failed to cache content of {}: {e}", source.id),
        }
    }
    write_manifest(&config.manifest_path, &entries).with_context(|| {
        format!("Failed to write manifest {}", config.manifest_path.display())
    })?;
    Ok(entries.len())
}

/// Writes the node package and the list of sources it draws from.
///
/// `consumed` supplies the URLs of the sources named by the nodes'
/// `source_id`; the list follows merge order.
pub fn write_package_and_sources(
    config: &Config,
    selected: &[ProxyNode],
    consumed: &[ConsumedSource],
) -> Result<()> {
    write_package(&config.package_path, selected)
        .with_context(|| format!("Failed to write package {}", config.package_path.display()))?;

    let represented: HashSet<&str> = selected
        .iter()
        .filter_map(|n| n.source_id.as_deref())
        .collect();
    let sources = consumed
        .iter()
        .filter(|s| represented.contains(s.id.as_str()))
        .map(|s| (s.id.as_str(), s.url.as_str()));
    write_source_list(&config.source_list_path, sources).with_context(|| {
        format!(
            "Failed to write source list {}",
            config.source_list_path.display()
        )
    })?;
    Ok(())
}
