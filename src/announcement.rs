//! The announcement value type carried through the RIBs and wire queues.

use crate::shared::{RelationshipTag, ASN};

/// A single route advertisement for a prefix.
///
/// Announcements are immutable once created: propagation produces a new
/// `Announcement` (with the receiving AS prepended to `as_path` and
/// `relationship`/`next_hop_asn` updated) rather than mutating an existing
/// one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Opaque prefix identifier, e.g. `"1.2.3.0/24"`. No longest-prefix-match
    /// semantics are implied; prefixes are compared for exact equality only.
    pub prefix: String,
    /// ASNs this announcement has traversed, most recent receiver first,
    /// origin last. An AS prepends its own ASN here the moment it selects
    /// this route as its new best (never before, never anywhere else).
    pub as_path: Vec<ASN>,
    /// The ASN this announcement was received from (or the origin ASN, for
    /// a freshly seeded announcement).
    pub next_hop_asn: ASN,
    /// How the holder of this announcement received it.
    pub relationship: RelationshipTag,
    /// Whether this announcement failed route origin validation. Set once,
    /// at seed time, and never recomputed during propagation.
    pub rov_invalid: bool,
}

impl Announcement {
    /// Build the initial, origin announcement for a seed row.
    pub fn origin(prefix: String, origin_asn: ASN, rov_invalid: bool) -> Self {
        Announcement {
            prefix,
            as_path: vec![origin_asn],
            next_hop_asn: origin_asn,
            relationship: RelationshipTag::Origin,
            rov_invalid,
        }
    }

    /// The ASN that first announced this prefix. `as_path` holds the most
    /// recent AS first (see module docs), so the origin is the last entry.
    pub fn origin_asn(&self) -> ASN {
        *self.as_path.last().expect("as_path is never empty")
    }

    /// Produce the copy of this announcement that `sender_asn` hands to a
    /// neighbor reached over a link tagged `relationship`. `as_path` is
    /// unchanged here: the receiving AS prepends itself only once it
    /// actually selects this as its new best route (see
    /// [`crate::policy::Policy::process_queue`]), matching the spec's
    /// "selection happens before prepending" ordering.
    pub fn for_export(&self, sender_asn: ASN, relationship: RelationshipTag) -> Self {
        Announcement {
            prefix: self.prefix.clone(),
            as_path: self.as_path.clone(),
            next_hop_asn: sender_asn,
            relationship,
            rov_invalid: self.rov_invalid,
        }
    }

    /// Number of ASNs in the path, used as the Gao-Rexford path-length
    /// tie-break.
    pub fn path_len(&self) -> usize {
        self.as_path.len()
    }
}
