//! Reader for the seeds CSV file: `asn,prefix,rov_invalid`.

use std::io::Read;

use crate::announcement::Announcement;
use crate::error::LoadError;
use crate::shared::ASN;

/// One origin announcement to seed into the graph before propagation.
pub struct Seed {
    pub origin_asn: ASN,
    pub announcement: Announcement,
}

/// Parse the seeds file. The first row is a header and is skipped. Unknown
/// ASNs (not present in `known_asns`) are logged and skipped rather than
/// failing the whole load, since a seeds file is commonly reused across
/// topology snapshots that don't all contain the same ASes.
pub fn load<R: Read>(reader: R, known_asns: &dyn Fn(ASN) -> bool) -> Result<Vec<Seed>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut seeds = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let row_no = idx + 2; // account for the header row
        let record = record?;
        if record.len() < 2 {
            return Err(LoadError::MalformedSeedRow {
                row_no,
                reason: format!("expected at least 2 columns, got {}", record.len()),
            });
        }

        let asn: ASN = record[0]
            .trim()
            .parse()
            .map_err(|_| LoadError::MalformedSeedRow {
                row_no,
                reason: format!("invalid asn {:?}", &record[0]),
            })?;
        let prefix = record[1].trim().to_string();
        let rov_invalid = record
            .get(2)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if !known_asns(asn) {
            log::warn!("seed row {row_no}: unknown ASN {asn}, skipping");
            continue;
        }

        seeds.push(Seed {
            origin_asn: asn,
            announcement: Announcement::origin(prefix, asn, rov_invalid),
        });
    }

    Ok(seeds)
}
