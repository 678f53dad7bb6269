//! Node package and final source list.

use log::info;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::write_atomically;
use crate::error_handling::StorageError;
use crate::node::ProxyNode;

#[derive(Serialize)]
struct SourceListRow<'a> {
    id: &'a str,
    url: &'a str,
}

/// Writes `{proxies: [...]}` for the selected nodes.
pub fn write_package(path: &Path, nodes: &[ProxyNode]) -> Result<(), StorageError> {
    let proxies: Vec<Value> = nodes.iter().map(ProxyNode::to_clash_value).collect();
    let mut doc = Mapping::new();
    doc.insert(Value::from("proxies"), Value::Sequence(proxies));

    write_atomically(path, |file| {
        serde_yaml::to_writer(file, &doc)?;
        Ok(())
    })?;
    info!("Wrote {} nodes to {}", nodes.len(), path.display());
    Ok(())
}

/// Writes the `id,url` list of sources represented in the package.
pub fn write_source_list<'a, I>(path: &Path, sources: I) -> Result<(), StorageError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    write_atomically(path, |file| {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(["id", "url"])?;
        for (id, url) in sources {
            writer.serialize(SourceListRow { id, url })?;
        }
        writer.flush()?;
        Ok(())
    })
}
