//! Small shared types used across the graph, policy and engine modules.

use std::fmt;

/// An Autonomous System number.
pub type ASN = u32;

/// The kind of edge stored in the AS graph's adjacency list. Directed from
/// source to destination; peer edges are inserted on both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Source is provider of destination.
    ProviderToCustomer,
    /// Symmetric relationship.
    PeerToPeer,
}

/// How an AS received an announcement. Ordered by Gao-Rexford local-pref
/// priority: higher variants win `choose_best` ties on relationship alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationshipTag {
    Provider = 1,
    Peer = 2,
    Customer = 3,
    Origin = 4,
}

impl RelationshipTag {
    /// The tag a neighbor assigns to a route received over an edge of this
    /// kind. An edge where the neighbor is my provider means the neighbor
    /// receives the route as a customer route, and vice versa; peer edges
    /// are self-inverse.
    pub fn received_as(self) -> RelationshipTag {
        match self {
            RelationshipTag::Provider => RelationshipTag::Customer,
            RelationshipTag::Customer => RelationshipTag::Provider,
            RelationshipTag::Peer => RelationshipTag::Peer,
            RelationshipTag::Origin => RelationshipTag::Origin,
        }
    }
}

impl fmt::Display for RelationshipTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipTag::Provider => "PROVIDER",
            RelationshipTag::Peer => "PEER",
            RelationshipTag::Customer => "CUSTOMER",
            RelationshipTag::Origin => "ORIGIN",
        };
        write!(f, "{}", s)
    }
}
