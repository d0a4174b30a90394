//! Reader for the pipe-delimited AS-relationship topology file.

use std::io::BufRead;

use crate::as_graph::AsGraph;
use crate::error::LoadError;

/// Parse a topology file of `SRC_ASN|DST_ASN|REL|TAG` lines into an
/// [`AsGraph`]. `#`-prefixed and blank lines are skipped. `REL` is `-1` for
/// a provider-to-customer edge (`SRC` provides to `DST`) or `0` for a
/// peer-to-peer edge; any other relationship code is logged and the line
/// is skipped rather than aborting the whole load, since a handful of
/// unrecognized codes in a real topology dump shouldn't block everything
/// else in it from loading. The trailing `TAG` field is accepted but
/// unused.
pub fn load<R: BufRead>(reader: R) -> Result<AsGraph, LoadError> {
    let mut graph = AsGraph::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| LoadError::Io {
            path: "<topology>".to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('|').collect();
        if fields.len() < 3 {
            return Err(LoadError::MalformedTopologyLine {
                line_no,
                line: trimmed.to_string(),
            });
        }

        let src: u32 = fields[0].parse().map_err(|_| LoadError::MalformedTopologyLine {
            line_no,
            line: trimmed.to_string(),
        })?;
        let dst: u32 = fields[1].parse().map_err(|_| LoadError::MalformedTopologyLine {
            line_no,
            line: trimmed.to_string(),
        })?;

        match fields[2] {
            "-1" => graph.add_provider_customer(src, dst),
            "0" => graph.add_peer(src, dst),
            other => {
                log::warn!(
                    "topology line {line_no}: unrecognized relationship code {other:?}, skipping"
                );
            }
        }
    }

    Ok(graph)
}
