//! The AS-relationship graph: nodes keyed by ASN, no pointers or lifetimes.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::LoadError;
use crate::shared::ASN;

/// One node in the AS-relationship graph.
#[derive(Debug, Clone, Default)]
pub struct AsNode {
    pub asn: ASN,
    pub peers: Vec<ASN>,
    pub providers: Vec<ASN>,
    pub customers: Vec<ASN>,
    /// Assigned by [`AsGraph::assign_propagation_ranks`]; `None` until then.
    pub rank: Option<u32>,
}

impl AsNode {
    fn new(asn: ASN) -> Self {
        AsNode {
            asn,
            ..Default::default()
        }
    }

    pub fn is_stub(&self) -> bool {
        self.customers.is_empty()
    }
}

/// The full AS-relationship graph plus derived propagation rank layers.
#[derive(Debug, Clone, Default)]
pub struct AsGraph {
    nodes: HashMap<ASN, AsNode>,
    /// `ranks[r]` holds every ASN whose `rank == r`, ascending from the
    /// stubs (rank 0) toward the core.
    pub ranks: Vec<Vec<ASN>>,
}

impl AsGraph {
    pub fn new() -> Self {
        AsGraph::default()
    }

    pub fn get(&self, asn: ASN) -> Option<&AsNode> {
        self.nodes.get(&asn)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsNode> {
        self.nodes.values()
    }

    fn node_mut(&mut self, asn: ASN) -> &mut AsNode {
        self.nodes.entry(asn).or_insert_with(|| AsNode::new(asn))
    }

    /// Register a provider-to-customer edge: `provider` is `customer`'s
    /// provider, `customer` is `provider`'s customer. Idempotent.
    pub fn add_provider_customer(&mut self, provider: ASN, customer: ASN) {
        if !self.node_mut(customer).providers.contains(&provider) {
            self.node_mut(customer).providers.push(provider);
        }
        if !self.node_mut(provider).customers.contains(&customer) {
            self.node_mut(provider).customers.push(customer);
        }
    }

    /// Register a symmetric peer-to-peer edge on both endpoints. Idempotent.
    pub fn add_peer(&mut self, a: ASN, b: ASN) {
        if !self.node_mut(a).peers.contains(&b) {
            self.node_mut(a).peers.push(b);
        }
        if !self.node_mut(b).peers.contains(&a) {
            self.node_mut(b).peers.push(a);
        }
    }

    /// Ensure a node exists for `asn` even if it has no edges (e.g. an
    /// origin ASN mentioned only in the seeds file).
    pub fn ensure_node(&mut self, asn: ASN) {
        self.node_mut(asn);
    }

    /// Depth-first search for a cycle among provider-customer edges only;
    /// peer edges are never part of a valley-free cycle and are ignored.
    ///
    /// Grey/black coloring: a node goes grey on entry and black once every
    /// provider beneath it (in DFS order) has been fully explored. Hitting a
    /// grey node means the current DFS path has looped back on itself.
    pub fn has_cycle(&self) -> bool {
        let mut black: HashSet<ASN> = HashSet::new();
        for &start in self.nodes.keys() {
            if !black.contains(&start) && self.node_has_cycle_from(start, &mut black) {
                return true;
            }
        }
        false
    }

    /// Same search, starting from a single ASN. Exposed separately because
    /// the original tooling this crate is modeled on offers it as a
    /// standalone diagnostic.
    pub fn node_has_cycle(&self, start: ASN) -> bool {
        let mut black = HashSet::new();
        self.node_has_cycle_from(start, &mut black)
    }

    fn node_has_cycle_from(&self, start: ASN, black: &mut HashSet<ASN>) -> bool {
        let mut grey: HashSet<ASN> = HashSet::new();
        self.dfs_provider_chain(start, &mut grey, black)
    }

    fn dfs_provider_chain(&self, asn: ASN, grey: &mut HashSet<ASN>, black: &mut HashSet<ASN>) -> bool {
        if black.contains(&asn) {
            return false;
        }
        if grey.contains(&asn) {
            return true;
        }
        grey.insert(asn);
        if let Some(node) = self.nodes.get(&asn) {
            for &provider in &node.providers {
                if self.dfs_provider_chain(provider, grey, black) {
                    return true;
                }
            }
        }
        grey.remove(&asn);
        black.insert(asn);
        false
    }

    /// Assign each ASN a propagation rank by longest-path relaxation:
    /// stubs (no customers) start at rank 0; whenever a customer's rank
    /// would push a provider's rank higher than currently recorded, the
    /// provider is updated and requeued so its own providers get relaxed
    /// too. Terminates because the graph is acyclic (checked separately by
    /// [`AsGraph::has_cycle`]) and ranks are bounded by node count.
    pub fn assign_propagation_ranks(&mut self) {
        let mut rank: HashMap<ASN, u32> = HashMap::new();
        let mut queue: VecDeque<ASN> = VecDeque::new();

        for node in self.nodes.values() {
            if node.is_stub() {
                rank.insert(node.asn, 0);
                queue.push_back(node.asn);
            }
        }

        while let Some(asn) = queue.pop_front() {
            let current_rank = rank[&asn];
            let providers = match self.nodes.get(&asn) {
                Some(n) => n.providers.clone(),
                None => continue,
            };
            for provider in providers {
                let candidate = current_rank + 1;
                let improved = match rank.get(&provider) {
                    Some(&existing) => candidate > existing,
                    None => true,
                };
                if improved {
                    rank.insert(provider, candidate);
                    queue.push_back(provider);
                }
            }
        }

        // Any ASN untouched by the relaxation (isolated node with only
        // peers, or a provider whose customers never got queued) still
        // needs a rank; default it to 0.
        for asn in self.nodes.keys() {
            rank.entry(*asn).or_insert(0);
        }

        let max_rank = rank.values().copied().max().unwrap_or(0);
        let mut ranks: Vec<Vec<ASN>> = vec![Vec::new(); max_rank as usize + 1];
        for (asn, node) in self.nodes.iter_mut() {
            let r = rank[asn];
            node.rank = Some(r);
            ranks[r as usize].push(*asn);
        }
        self.ranks = ranks;
    }

    /// Convenience used by the CLI entry point: build ranks and fail loudly
    /// if the graph contains a provider-customer cycle.
    pub fn finalize(&mut self) -> Result<(), LoadError> {
        if self.has_cycle() {
            return Err(LoadError::TopologyCycle);
        }
        self.assign_propagation_ranks();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> AsGraph {
        // 3 (provider) -> 2 (provider) -> 1 (stub)
        let mut g = AsGraph::new();
        g.add_provider_customer(2, 1);
        g.add_provider_customer(3, 2);
        g
    }

    #[test]
    fn stub_gets_rank_zero() {
        let mut g = linear_graph();
        g.assign_propagation_ranks();
        assert_eq!(g.get(1).unwrap().rank, Some(0));
        assert_eq!(g.get(2).unwrap().rank, Some(1));
        assert_eq!(g.get(3).unwrap().rank, Some(2));
    }

    #[test]
    fn rank_takes_longest_path_through_multiple_customers() {
        // 10 has two customers: 1 (stub, rank 0) and 2 (which has stub
        // customer 1b at rank 0, so 2 is rank 1). 10 must end up at rank 2,
        // not rank 1 from the first customer it happens to relax from.
        let mut g = AsGraph::new();
        g.add_provider_customer(10, 1);
        g.add_provider_customer(10, 2);
        g.add_provider_customer(2, 20);
        g.assign_propagation_ranks();
        assert_eq!(g.get(20).unwrap().rank, Some(0));
        assert_eq!(g.get(2).unwrap().rank, Some(1));
        assert_eq!(g.get(10).unwrap().rank, Some(2));
    }

    #[test]
    fn peer_edges_are_symmetric_and_ignored_by_cycle_check() {
        let mut g = AsGraph::new();
        g.add_peer(1, 2);
        assert!(g.get(1).unwrap().peers.contains(&2));
        assert!(g.get(2).unwrap().peers.contains(&1));
        assert!(!g.has_cycle());
    }

    #[test]
    fn provider_customer_cycle_is_detected() {
        let mut g = AsGraph::new();
        g.add_provider_customer(1, 2);
        g.add_provider_customer(2, 3);
        g.add_provider_customer(3, 1);
        assert!(g.has_cycle());
    }

    #[test]
    fn acyclic_diamond_has_no_cycle() {
        let mut g = AsGraph::new();
        g.add_provider_customer(1, 2);
        g.add_provider_customer(1, 3);
        g.add_provider_customer(2, 4);
        g.add_provider_customer(3, 4);
        assert!(!g.has_cycle());
    }
}
