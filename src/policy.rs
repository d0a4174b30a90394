//! The two supported route-processing policies, BGP and ROV.

use std::collections::{HashMap, VecDeque};

use crate::announcement::Announcement;
use crate::shared::{RelationshipTag, ASN};

/// Per-AS mutable routing state shared by every policy variant.
#[derive(Debug, Clone, Default)]
pub struct PolicyState {
    /// Announcements received but not yet processed, in arrival order.
    pub recv_queue: VecDeque<Announcement>,
    /// Best announcement per prefix, after processing.
    pub local_rib: HashMap<String, Announcement>,
}

impl PolicyState {
    fn enqueue(&mut self, ann: Announcement) {
        self.recv_queue.push_back(ann);
    }
}

/// Route-processing policy run by an AS. A closed, two-variant enum rather
/// than a trait object: every AS in this simulator runs either plain BGP
/// path selection or BGP plus an ROV ingress filter, and nothing else.
#[derive(Debug, Clone)]
pub enum Policy {
    Bgp(PolicyState),
    Rov(PolicyState),
}

impl Policy {
    pub fn bgp() -> Self {
        Policy::Bgp(PolicyState::default())
    }

    pub fn rov() -> Self {
        Policy::Rov(PolicyState::default())
    }

    fn state(&self) -> &PolicyState {
        match self {
            Policy::Bgp(s) | Policy::Rov(s) => s,
        }
    }

    fn state_mut(&mut self) -> &mut PolicyState {
        match self {
            Policy::Bgp(s) | Policy::Rov(s) => s,
        }
    }

    pub fn local_rib(&self) -> &HashMap<String, Announcement> {
        &self.state().local_rib
    }

    pub fn best(&self, prefix: &str) -> Option<&Announcement> {
        self.state().local_rib.get(prefix)
    }

    /// Hand an announcement to this AS. An ROV-running AS drops an
    /// invalid announcement immediately rather than queuing it, so an
    /// invalid route never occupies a ribs-in slot or competes in
    /// `process_queue`.
    pub fn enqueue(&mut self, ann: Announcement) {
        if self.rejects_invalid(&ann) {
            return;
        }
        self.state_mut().enqueue(ann);
    }

    /// Directly install `ann` into `local_rib`, bypassing the receive
    /// queue and `choose_best` entirely. Used only to seed origin
    /// prefixes, which come from a trusted seeds file and don't compete
    /// against anything.
    pub fn add_origin(&mut self, ann: Announcement) {
        if self.rejects_invalid(&ann) {
            return;
        }
        self.state_mut().local_rib.insert(ann.prefix.clone(), ann);
    }

    fn rejects_invalid(&self, ann: &Announcement) -> bool {
        if matches!(self, Policy::Rov(_)) && ann.rov_invalid {
            log::debug!(
                "dropping ROV-invalid announcement for {} (origin {})",
                ann.prefix,
                ann.origin_asn()
            );
            true
        } else {
            false
        }
    }

    /// Process every queued announcement for the AS identified by `asn`:
    /// group by prefix, fold each group down to a single winner with
    /// [`choose_best`], and install that winner over the incumbent when it
    /// wins, prepending `asn` to its `as_path` first. A winner whose path
    /// already contains `asn` is a loop propagated back from a farther
    /// ancestor and is discarded instead of installed. Returns the
    /// prefixes whose best route actually changed, since only those need
    /// to be propagated onward.
    pub fn process_queue(&mut self, asn: ASN) -> Vec<String> {
        let state = self.state_mut();
        if state.recv_queue.is_empty() {
            return Vec::new();
        }

        let mut by_prefix: HashMap<String, Vec<Announcement>> = HashMap::new();
        for ann in state.recv_queue.drain(..) {
            by_prefix.entry(ann.prefix.clone()).or_default().push(ann);
        }

        let mut changed = Vec::new();
        for (prefix, candidates) in by_prefix {
            let mut best: Option<Announcement> = None;
            for cand in candidates {
                best = Some(match best {
                    Some(current) => choose_best(current, cand),
                    None => cand,
                });
            }
            let mut best_new = best.expect("candidates group is never empty");

            let replace = match state.local_rib.get(&prefix) {
                Some(existing) if existing == &best_new => false,
                Some(existing) => choose_best(existing.clone(), best_new.clone()) == best_new,
                None => true,
            };
            if !replace {
                continue;
            }
            if best_new.as_path.contains(&asn) {
                log::debug!("dropping looped announcement for {prefix} at AS {asn}");
                continue;
            }

            best_new.as_path.insert(0, asn);
            state.local_rib.insert(prefix.clone(), best_new);
            changed.push(prefix);
        }
        changed
    }

    /// Whether a route this AS received with tag `from` should be
    /// forwarded onward to a neighbor related to this AS as `edge_kind`
    /// (e.g. `edge_kind == Provider` means the neighbor is this AS's
    /// provider). Implements the valley-free export rule directly at the
    /// sender: routes learned from a peer or provider are only
    /// re-advertised to customers, never to another peer or provider.
    pub fn should_propagate_to(from: RelationshipTag, edge_kind: RelationshipTag) -> bool {
        match from {
            RelationshipTag::Origin | RelationshipTag::Customer => true,
            RelationshipTag::Peer | RelationshipTag::Provider => edge_kind == RelationshipTag::Customer,
        }
    }
}

/// Gao-Rexford total order over two candidate announcements for the same
/// prefix: prefer the higher relationship priority, then the shorter AS
/// path, then the lower next-hop ASN as a final deterministic tie-break.
/// Returns whichever of `a`/`b` wins.
pub fn choose_best(a: Announcement, b: Announcement) -> Announcement {
    if b.relationship != a.relationship {
        return if b.relationship > a.relationship { b } else { a };
    }
    if b.path_len() != a.path_len() {
        return if b.path_len() < a.path_len() { b } else { a };
    }
    if b.next_hop_asn < a.next_hop_asn {
        b
    } else {
        a
    }
}

#[allow(dead_code)]
pub type PolicyStore = HashMap<ASN, Policy>;

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(path: Vec<ASN>, rel: RelationshipTag) -> Announcement {
        Announcement {
            prefix: "1.2.3.0/24".to_string(),
            next_hop_asn: *path.last().unwrap(),
            as_path: path,
            relationship: rel,
            rov_invalid: false,
        }
    }

    #[test]
    fn choose_best_prefers_customer_route_over_peer() {
        let customer = ann(vec![1, 2, 3], RelationshipTag::Customer);
        let peer = ann(vec![1, 2], RelationshipTag::Peer);
        let winner = choose_best(peer, customer.clone());
        assert_eq!(winner, customer);
    }

    #[test]
    fn choose_best_prefers_shorter_path_on_tied_relationship() {
        let short = ann(vec![1, 5], RelationshipTag::Peer);
        let long = ann(vec![1, 9, 5], RelationshipTag::Peer);
        let winner = choose_best(long, short.clone());
        assert_eq!(winner, short);
    }

    #[test]
    fn choose_best_breaks_final_tie_on_next_hop_asn() {
        let a = ann(vec![1, 5], RelationshipTag::Peer);
        let b = ann(vec![1, 3], RelationshipTag::Peer);
        let winner = choose_best(a, b.clone());
        assert_eq!(winner, b);
    }

    #[test]
    fn rov_policy_drops_invalid_announcement_at_enqueue() {
        let mut policy = Policy::rov();
        let mut invalid = ann(vec![1, 2], RelationshipTag::Peer);
        invalid.rov_invalid = true;
        policy.enqueue(invalid);
        assert!(policy.process_queue(99).is_empty());
        assert!(policy.local_rib().is_empty());
    }

    #[test]
    fn bgp_policy_keeps_rov_invalid_announcements() {
        let mut policy = Policy::bgp();
        let mut invalid = ann(vec![1, 2], RelationshipTag::Peer);
        invalid.rov_invalid = true;
        policy.enqueue(invalid);
        let changed = policy.process_queue(99);
        assert_eq!(changed, vec!["1.2.3.0/24".to_string()]);
        assert_eq!(policy.best("1.2.3.0/24").unwrap().as_path, vec![99, 1, 2]);
    }

    #[test]
    fn process_queue_prepends_owner_asn_to_installed_path() {
        let mut policy = Policy::bgp();
        policy.enqueue(ann(vec![1, 2], RelationshipTag::Customer));
        policy.process_queue(7);
        assert_eq!(policy.best("1.2.3.0/24").unwrap().as_path, vec![7, 1, 2]);
    }

    #[test]
    fn process_queue_discards_a_looped_announcement() {
        let mut policy = Policy::bgp();
        // AS 7 already appears in this path, as if it came back around
        // through a cycle somewhere upstream; 7 must not install it.
        policy.enqueue(ann(vec![1, 7, 2], RelationshipTag::Customer));
        let changed = policy.process_queue(7);
        assert!(changed.is_empty());
        assert!(policy.local_rib().is_empty());
    }

    #[test]
    fn add_origin_installs_directly_without_touching_the_queue() {
        let mut policy = Policy::bgp();
        policy.add_origin(Announcement::origin("9.9.0.0/16".to_string(), 100, false));
        assert_eq!(policy.best("9.9.0.0/16").unwrap().as_path, vec![100]);
    }

    #[test]
    fn rov_policy_drops_invalid_origin_seed() {
        let mut policy = Policy::rov();
        policy.add_origin(Announcement::origin("9.9.0.0/16".to_string(), 100, true));
        assert!(policy.local_rib().is_empty());
    }

    #[test]
    fn should_propagate_to_enforces_valley_free_export() {
        assert!(Policy::should_propagate_to(
            RelationshipTag::Customer,
            RelationshipTag::Peer
        ));
        assert!(!Policy::should_propagate_to(
            RelationshipTag::Peer,
            RelationshipTag::Peer
        ));
        assert!(Policy::should_propagate_to(
            RelationshipTag::Peer,
            RelationshipTag::Customer
        ));
        assert!(!Policy::should_propagate_to(
            RelationshipTag::Provider,
            RelationshipTag::Provider
        ));
    }
}
