//! Graph construction module

use crate::graph::compressed::NodeAttributes;
use crate::graph::CompressedGraph;
use std::collections::HashMap;

/// Builder for incrementally constructing an undirected CompressedGraph
pub struct GraphBuilder {
    /// Mapping from sample IDs to node indices
    id_to_index: HashMap<String, u32>,

    /// Node sample IDs
    node_ids: Vec<String>,

    /// Attribute snapshot per node
    attributes: Vec<NodeAttributes>,

    /// Adjacency lists with edge weights
    adjacency_lists: Vec<Vec<(u32, f64)>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            attributes: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Get or create the node for a sample; an existing node keeps its attributes
    pub fn add_node(&mut self, id: &str, attributes: NodeAttributes) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.attributes.push(attributes);
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add an undirected edge; re-adding an edge replaces its weight
    pub fn add_edge(&mut self, a: u32, b: u32, weight: f64) {
        if a == b {
            return;
        }
        Self::upsert(&mut self.adjacency_lists[a as usize], b, weight);
        Self::upsert(&mut self.adjacency_lists[b as usize], a, weight);
    }

    fn upsert(list: &mut Vec<(u32, f64)>, target: u32, weight: f64) {
        match list.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 = weight,
            None => list.push((target, weight)),
        }
    }

    /// Build the compressed graph
    pub fn build(mut self) -> CompressedGraph {
        let node_count = self.node_ids.len();
        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();

        let mut graph = CompressedGraph::with_capacity(node_count, edge_count);
        graph.offsets.push(0);

        let mut offset = 0;
        for list in &mut self.adjacency_lists {
            // Sorted for binary search
            list.sort_unstable_by_key(|&(target, _)| target);
            for &(target, weight) in list.iter() {
                graph.edges.push(target);
                graph.weights.push(weight);
            }
            offset += list.len() as u32;
            graph.offsets.push(offset);
        }

        graph.node_ids = self.node_ids;
        graph.attributes = self.attributes;
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_are_idempotent() {
        let mut builder = GraphBuilder::with_capacity(2);
        let first = NodeAttributes {
            sequence_type: Some("ST307".into()),
            ..Default::default()
        };
        let a = builder.add_node("a", first.clone());
        let again = builder.add_node("a", NodeAttributes::default());
        assert_eq!(a, again);
        assert_eq!(builder.node_count(), 1);

        let graph = builder.build();
        assert_eq!(graph.attributes[0], first);
    }

    #[test]
    fn test_repeated_edge_overwrites_weight() {
        let mut builder = GraphBuilder::with_capacity(2);
        let a = builder.add_node("a", NodeAttributes::default());
        let b = builder.add_node("b", NodeAttributes::default());
        builder.add_edge(a, b, 4.0);
        builder.add_edge(b, a, 7.0);
        builder.add_edge(a, a, 1.0);

        let graph = builder.build();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.weights, vec![7.0, 7.0]);
    }
}
