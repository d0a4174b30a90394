//! Writer for the final RIB snapshot CSV.

use std::collections::HashMap;
use std::io::Write;

use crate::error::LoadError;
use crate::policy::Policy;
use crate::shared::ASN;

/// Format an AS path the way downstream tooling expects:
/// `"(a1, a2, ..., an)"`, with a trailing comma preserved when the path has
/// only one element (`"(a1,)"`) rather than normalized away.
fn format_as_path(path: &[ASN]) -> String {
    let joined = path
        .iter()
        .map(|asn| asn.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if path.len() == 1 {
        format!("({joined},)")
    } else {
        format!("({joined})")
    }
}

/// Write every AS's local RIB to `writer` as `asn,prefix,as_path` rows,
/// ASNs in ascending order for a stable diff against prior runs.
pub fn write<W: Write>(writer: W, policies: &HashMap<ASN, Policy>) -> Result<(), LoadError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["asn", "prefix", "as_path"])?;

    let mut asns: Vec<&ASN> = policies.keys().collect();
    asns.sort();

    for &asn in asns {
        let policy = &policies[asn];
        let mut prefixes: Vec<&String> = policy.local_rib().keys().collect();
        prefixes.sort();
        for prefix in prefixes {
            let ann = &policy.local_rib()[prefix];
            wtr.write_record([asn.to_string(), prefix.clone(), format_as_path(&ann.as_path)])?;
        }
    }

    wtr.flush().map_err(|source| LoadError::Io {
        path: "<output>".to_string(),
        source,
    })?;
    Ok(())
}
