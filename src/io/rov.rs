//! Reader for the ROV-deployment file: one ASN per line.

use std::collections::HashSet;
use std::io::BufRead;

use crate::error::LoadError;
use crate::shared::ASN;

/// Parse the set of ASNs that run the ROV policy. Blank lines are
/// skipped; each remaining line must hold exactly one ASN.
pub fn load<R: BufRead>(reader: R) -> Result<HashSet<ASN>, LoadError> {
    let mut out = HashSet::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| LoadError::Io {
            path: "<rov>".to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let asn: ASN = trimmed.parse().map_err(|_| LoadError::MalformedRovLine {
            line_no,
            line: trimmed.to_string(),
        })?;
        out.insert(asn);
    }
    Ok(out)
}
