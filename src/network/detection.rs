//! Connected component detection

use std::collections::BTreeMap;

use crate::graph::CompressedGraph;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach the smaller tree under the root of the larger one
        if self.rank[root_x as usize] > self.rank[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.rank[root as usize]
    }
}

/// Connected components of an undirected graph.
///
/// Members are sorted ascending; components are ordered by their smallest
/// member. Isolated nodes form singleton components.
pub fn connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let mut sets = DisjointSets::new(graph.node_count);

    for node in 0..graph.node_count {
        for &neighbor in graph.neighbors(node) {
            sets.union(node as u32, neighbor);
        }
    }

    let mut by_root: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for node in 0..graph.node_count as u32 {
        let root = sets.find(node);
        by_root.entry(root).or_default().push(node);
    }

    let mut components: Vec<Vec<u32>> = by_root.into_values().collect();
    components.sort_by_key(|members| members[0]);

    log::debug!(
        "Found {} components over {} nodes",
        components.len(),
        graph.node_count
    );
    components
}
