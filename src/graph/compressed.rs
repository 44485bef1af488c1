//! Compact undirected graph representation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data::SampleMetadata;

/// Sample attributes copied onto a node when the graph is built
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub sequence_type: Option<String>,
    pub location: Option<String>,
    pub collection: Option<String>,
    pub resistance: Option<f64>,
    pub virulence: Option<f64>,
    pub isolation_source: Option<String>,
}

impl From<&SampleMetadata> for NodeAttributes {
    fn from(sample: &SampleMetadata) -> Self {
        Self {
            sequence_type: sample.sequence_type.clone(),
            location: sample.location.clone(),
            collection: sample.collection.clone(),
            resistance: sample.resistance_score,
            virulence: sample.virulence_score,
            isolation_source: sample.isolation_source.clone(),
        }
    }
}

/// Compressed sparse representation of an undirected weighted graph.
///
/// Every edge is stored in both endpoint lists, so `edges.len()` is twice
/// the number of undirected edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] defines the neighbor range for node i
    pub offsets: Vec<u32>,

    /// Concatenated, sorted neighbor lists
    pub edges: Vec<u32>,

    /// Edge weights, parallel to `edges`
    pub weights: Vec<f64>,

    /// Original sample identifiers
    pub node_ids: Vec<String>,

    /// Node attribute snapshots, parallel to `node_ids`
    pub attributes: Vec<NodeAttributes>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count),
            weights: Vec::with_capacity(edge_count),
            node_ids: Vec::with_capacity(node_count),
            attributes: Vec::with_capacity(node_count),
        }
    }

    /// Neighbors of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Neighbors of a node paired with the connecting edge weight
    pub fn weighted_neighbors(&self, node: usize) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        self.edges[start..end]
            .iter()
            .copied()
            .zip(self.weights[start..end].iter().copied())
    }

    pub fn has_edge(&self, src: usize, dst: u32) -> bool {
        self.neighbors(src).binary_search(&dst).is_ok()
    }

    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Index of a sample identifier
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_ids.iter().position(|n| n == id)
    }

    /// Induced subgraph over `members`, re-indexed in the given order
    pub fn subgraph(&self, members: &[u32]) -> CompressedGraph {
        let orig_to_sub: HashMap<u32, u32> = members
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i as u32))
            .collect();

        let mut sub = CompressedGraph::with_capacity(members.len(), 0);
        sub.offsets.push(0);
        let mut offset = 0;

        for &node in members {
            let mut local: Vec<(u32, f64)> = self
                .weighted_neighbors(node as usize)
                .filter_map(|(target, w)| orig_to_sub.get(&target).map(|&t| (t, w)))
                .collect();
            local.sort_unstable_by_key(|&(t, _)| t);

            for (target, weight) in local {
                sub.edges.push(target);
                sub.weights.push(weight);
                offset += 1;
            }
            sub.offsets.push(offset);

            sub.node_ids.push(self.node_ids[node as usize].clone());
            sub.attributes.push(self.attributes[node as usize].clone());
        }

        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn path_graph() -> CompressedGraph {
        let mut builder = GraphBuilder::with_capacity(4);
        let ids: Vec<u32> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| builder.add_node(id, NodeAttributes::default()))
            .collect();
        builder.add_edge(ids[0], ids[1], 1.0);
        builder.add_edge(ids[1], ids[2], 2.0);
        builder.add_edge(ids[2], ids[3], 3.0);
        builder.build()
    }

    #[test]
    fn test_undirected_storage() {
        let graph = path_graph();
        assert_eq!(graph.node_count, 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(0, 3));
        assert_eq!(graph.degree(3), 1);
    }

    #[test]
    fn test_subgraph_reindexes() {
        let graph = path_graph();
        let sub = graph.subgraph(&[2, 3]);
        assert_eq!(sub.node_count, 2);
        assert_eq!(sub.node_ids, vec!["c", "d"]);
        assert_eq!(sub.edge_count(), 1);
        let (target, weight) = sub.weighted_neighbors(0).next().unwrap();
        assert_eq!(target, 1);
        assert_eq!(weight, 3.0);
    }
}
