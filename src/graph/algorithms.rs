//! Graph algorithms shared by the centrality measures

use ndarray::Array2;

use crate::graph::CompressedGraph;

/// Breadth-first shortest path structure from a single source
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    /// Reached nodes in visiting order (non-decreasing distance)
    pub order: Vec<u32>,

    /// Hop distance from the source, `None` when unreachable
    pub distance: Vec<Option<u32>>,

    /// Number of shortest paths from the source
    pub sigma: Vec<f64>,

    /// Predecessors on shortest paths, in discovery order
    pub predecessors: Vec<Vec<u32>>,
}

/// Unweighted single-source shortest paths
pub fn shortest_paths(graph: &CompressedGraph, source: usize) -> ShortestPaths {
    let n = graph.node_count;
    let mut paths = ShortestPaths {
        order: Vec::with_capacity(n),
        distance: vec![None; n],
        sigma: vec![0.0; n],
        predecessors: vec![Vec::new(); n],
    };

    paths.distance[source] = Some(0);
    paths.sigma[source] = 1.0;

    let mut head = 0;
    paths.order.push(source as u32);
    while head < paths.order.len() {
        let v = paths.order[head] as usize;
        head += 1;
        let dist_v = paths.distance[v].unwrap_or(0);

        for &w in graph.neighbors(v) {
            let w = w as usize;
            match paths.distance[w] {
                None => {
                    paths.distance[w] = Some(dist_v + 1);
                    paths.order.push(w as u32);
                    paths.sigma[w] += paths.sigma[v];
                    paths.predecessors[w].push(v as u32);
                }
                Some(d) if d == dist_v + 1 => {
                    paths.sigma[w] += paths.sigma[v];
                    paths.predecessors[w].push(v as u32);
                }
                Some(_) => {}
            }
        }
    }

    paths
}

/// Invert a square matrix with Gauss-Jordan elimination and partial pivoting.
///
/// Returns `None` for singular (or numerically singular) input.
pub fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return None;
    }

    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
                inv.swap([pivot, k], [col, k]);
            }
        }

        let p = a[[col, col]];
        for k in 0..n {
            a[[col, k]] /= p;
            inv[[col, k]] /= p;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                a[[row, k]] -= factor * a[[col, k]];
                inv[[row, k]] -= factor * inv[[col, k]];
            }
        }
    }

    Some(inv)
}

/// Pseudo-potentials of a connected graph grounded at its last node.
///
/// Entry `[v, s]` is the potential of `v` when a unit current enters at `s`
/// and leaves at the ground. `None` when the Laplacian cannot be solved.
pub fn grounded_potentials(graph: &CompressedGraph) -> Option<Array2<f64>> {
    let n = graph.node_count;
    if n < 2 {
        return None;
    }

    let mut laplacian = Array2::<f64>::zeros((n - 1, n - 1));
    for u in 0..n - 1 {
        for (v, w) in graph.weighted_neighbors(u) {
            laplacian[[u, u]] += w;
            if (v as usize) < n - 1 {
                laplacian[[u, v as usize]] -= w;
            }
        }
    }

    let reduced = invert(&laplacian)?;
    let mut potentials = Array2::<f64>::zeros((n, n));
    potentials
        .slice_mut(ndarray::s![..n - 1, ..n - 1])
        .assign(&reduced);
    Some(potentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, NodeAttributes};

    fn graph(n: usize, edges: &[(u32, u32)]) -> CompressedGraph {
        let mut builder = GraphBuilder::with_capacity(n);
        for i in 0..n {
            builder.add_node(&i.to_string(), NodeAttributes::default());
        }
        for &(a, b) in edges {
            builder.add_edge(a, b, 1.0);
        }
        builder.build()
    }

    #[test]
    fn test_shortest_paths_on_cycle() {
        // 0-1-2-3-0: two shortest paths from 0 to 2
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let sp = shortest_paths(&g, 0);
        assert_eq!(sp.distance, vec![Some(0), Some(1), Some(2), Some(1)]);
        assert_eq!(sp.sigma[2], 2.0);
        assert_eq!(sp.predecessors[2], vec![1, 3]);
        assert_eq!(sp.order[0], 0);
    }

    #[test]
    fn test_unreachable_nodes() {
        let g = graph(3, &[(0, 1)]);
        let sp = shortest_paths(&g, 0);
        assert_eq!(sp.distance[2], None);
        assert_eq!(sp.order.len(), 2);
    }

    #[test]
    fn test_invert() {
        let m = ndarray::arr2(&[[1.0, -1.0], [-1.0, 2.0]]);
        let inv = invert(&m).unwrap();
        assert!((inv[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((inv[[0, 1]] - 1.0).abs() < 1e-12);
        assert!((inv[[1, 1]] - 1.0).abs() < 1e-12);

        let singular = ndarray::arr2(&[[1.0, 1.0], [1.0, 1.0]]);
        assert!(invert(&singular).is_none());
    }

    #[test]
    fn test_grounded_potentials_on_path() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        let p = grounded_potentials(&g).unwrap();
        assert!((p[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((p[[1, 0]] - 1.0).abs() < 1e-12);
        assert_eq!(p[[2, 0]], 0.0);
        assert_eq!(p[[0, 2]], 0.0);
    }
}
