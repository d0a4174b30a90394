//! The three-phase propagation engine: UP, ACROSS, then DOWN.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::as_graph::AsGraph;
use crate::policy::Policy;
use crate::shared::{RelationshipTag, ASN};

/// Drives one full propagation run over a finalized [`AsGraph`].
///
/// Each rank barrier is processed by exactly two worker threads, the
/// rank's AS list split at its midpoint. This mirrors how the reference
/// implementation this crate is modeled on parallelizes per-AS route
/// processing: a fixed two-way split rather than a thread pool, since a
/// single simulation run rarely has enough ASes per rank to benefit from
/// more workers than that.
pub struct PropagationEngine<'g> {
    graph: &'g AsGraph,
    policies: Mutex<HashMap<ASN, Policy>>,
}

impl<'g> PropagationEngine<'g> {
    pub fn new(graph: &'g AsGraph, policies: HashMap<ASN, Policy>) -> Self {
        PropagationEngine {
            graph,
            policies: Mutex::new(policies),
        }
    }

    pub fn into_policies(self) -> HashMap<ASN, Policy> {
        self.policies.into_inner().expect("mutex not poisoned")
    }

    /// Run UP, then ACROSS, then DOWN, each exactly once.
    pub fn run(&self) {
        let start = std::time::Instant::now();

        let up_start = std::time::Instant::now();
        log::info!("propagation: phase UP");
        self.propagate_up();
        log::debug!("phase UP took {:?}", up_start.elapsed());

        let across_start = std::time::Instant::now();
        log::info!("propagation: phase ACROSS");
        self.propagate_across();
        log::debug!("phase ACROSS took {:?}", across_start.elapsed());

        let down_start = std::time::Instant::now();
        log::info!("propagation: phase DOWN");
        self.propagate_down();
        log::debug!("phase DOWN took {:?}", down_start.elapsed());

        log::info!("propagation finished in {:?}", start.elapsed());
    }

    /// Processes the given ASNs' receive queues across two fixed worker
    /// threads, split at the midpoint.
    fn process_barrier(&self, asns: &[ASN]) {
        if asns.is_empty() {
            return;
        }
        let mid = asns.len() / 2;
        let (left, right) = asns.split_at(mid);

        thread::scope(|scope| {
            for chunk in [left, right] {
                if chunk.is_empty() {
                    continue;
                }
                scope.spawn(move || {
                    for &asn in chunk {
                        let mut policies = self.policies.lock().expect("mutex not poisoned");
                        if let Some(policy) = policies.get_mut(&asn) {
                            policy.process_queue(asn);
                        }
                    }
                });
            }
        });
    }

    /// Export every prefix in `asn`'s local RIB to every `neighbors`, each
    /// of which is related to `asn` as `edge_kind` (e.g. `Provider` means
    /// every AS in `neighbors` is a provider of `asn`). Respects the
    /// valley-free export filter, and retags the announcement with the
    /// relationship each neighbor actually receives it as (the inverse of
    /// `edge_kind` for provider/customer edges, unchanged for peer edges).
    /// `as_path` is left untouched here: a receiving AS only prepends
    /// itself once it actually selects the route in `process_queue`.
    fn export(&self, asn: ASN, edge_kind: RelationshipTag, neighbors: &[ASN]) {
        if neighbors.is_empty() {
            return;
        }
        let mut policies = self.policies.lock().expect("mutex not poisoned");
        let received_as = edge_kind.received_as();
        let anns: Vec<_> = {
            let sender = match policies.get(&asn) {
                Some(p) => p,
                None => return,
            };
            sender
                .local_rib()
                .values()
                .filter(|ann| Policy::should_propagate_to(ann.relationship, edge_kind))
                .map(|ann| ann.for_export(asn, received_as))
                .collect()
        };
        for &neighbor in neighbors {
            if let Some(receiver) = policies.get_mut(&neighbor) {
                for ann in &anns {
                    receiver.enqueue(ann.clone());
                }
            }
        }
    }

    /// Customers export their current best routes up to their providers;
    /// each rank's export is immediately followed by a barrier over the
    /// *next* rank, since that's exactly who those exports just reached.
    /// Exporting and then barriering the *same* rank again would ship a
    /// rank's still-unprocessed (pre-barrier) RIB to its providers instead
    /// of the one just settled from below.
    fn propagate_up(&self) {
        for (i, rank) in self.graph.ranks.iter().enumerate() {
            for &asn in rank {
                if let Some(node) = self.graph.get(asn) {
                    self.export(asn, RelationshipTag::Provider, &node.providers);
                }
            }
            if let Some(next_rank) = self.graph.ranks.get(i + 1) {
                self.process_barrier(next_rank);
            }
        }
    }

    /// Every AS exports its current best routes to its peers in a single
    /// pass, then the whole graph is processed at one barrier.
    fn propagate_across(&self) {
        let all_asns: Vec<ASN> = self.graph.iter().map(|n| n.asn).collect();
        for &asn in &all_asns {
            if let Some(node) = self.graph.get(asn) {
                self.export(asn, RelationshipTag::Peer, &node.peers);
            }
        }
        self.process_barrier(&all_asns);
    }

    /// Each rank (descending, provider ranks before customer ranks) is
    /// processed at its barrier first, then exports its newly-settled
    /// routes down to its customers.
    fn propagate_down(&self) {
        for rank in self.graph.ranks.iter().rev() {
            self.process_barrier(rank);
            for &asn in rank {
                if let Some(node) = self.graph.get(asn) {
                    self.export(asn, RelationshipTag::Customer, &node.customers);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::Announcement;

    fn graph_with_provider_chain() -> AsGraph {
        // 1 (stub, origin) -- customer of --> 2 -- customer of --> 3
        let mut g = AsGraph::new();
        g.add_provider_customer(2, 1);
        g.add_provider_customer(3, 2);
        g.finalize().unwrap();
        g
    }

    #[test]
    fn route_propagates_up_the_provider_chain() {
        let graph = graph_with_provider_chain();
        let mut policies = HashMap::new();
        let mut origin_policy = Policy::bgp();
        origin_policy.add_origin(Announcement::origin("9.9.0.0/16".to_string(), 1, false));
        policies.insert(1, origin_policy);
        policies.insert(2, Policy::bgp());
        policies.insert(3, Policy::bgp());

        let engine = PropagationEngine::new(&graph, policies);
        engine.run();
        let policies = engine.into_policies();

        assert!(policies[&2].best("9.9.0.0/16").is_some());
        assert!(policies[&3].best("9.9.0.0/16").is_some());
        assert_eq!(
            policies[&3].best("9.9.0.0/16").unwrap().as_path,
            vec![3, 2, 1]
        );
    }

    #[test]
    fn route_does_not_cross_two_peer_links() {
        // 1 -peer- 2 -peer- 3: a route originated at 1 must reach 2 but
        // never 3, since 2 can't re-export a peer route to another peer.
        let mut g = AsGraph::new();
        g.add_peer(1, 2);
        g.add_peer(2, 3);
        g.finalize().unwrap();

        let mut policies = HashMap::new();
        let mut origin_policy = Policy::bgp();
        origin_policy.add_origin(Announcement::origin("5.5.0.0/16".to_string(), 1, false));
        policies.insert(1, origin_policy);
        policies.insert(2, Policy::bgp());
        policies.insert(3, Policy::bgp());

        let engine = PropagationEngine::new(&g, policies);
        engine.run();
        let policies = engine.into_policies();

        assert!(policies[&2].best("5.5.0.0/16").is_some());
        assert!(policies[&3].best("5.5.0.0/16").is_none());
    }
}
