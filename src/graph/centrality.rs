//! Node centrality measures for a single connected component.
//!
//! Every function takes a connected graph and returns one value per node,
//! or `None` when the measure's normalisation is undefined for the graph
//! (e.g. a single node for degree centrality). Distances are hop counts;
//! only current-flow betweenness looks at edge weights.
//!
//! | Measure | Normalisation |
//! |---------|---------------|
//! | degree | `1 / (n - 1)` |
//! | closeness | Wasserman-Faust |
//! | betweenness | `1 / ((n - 1)(n - 2))` for `n > 2` |
//! | current-flow betweenness | `2 / ((n - 1)(n - 2))` |
//! | load | `1 / ((n - 1)(n - 2))` for `n > 2` |
//! | harmonic | none |

use ndarray::Array1;

use crate::graph::algorithms::{grounded_potentials, shortest_paths};
use crate::graph::CompressedGraph;

pub fn degree_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let n = graph.node_count;
    if n < 2 {
        return None;
    }
    let scale = 1.0 / (n - 1) as f64;
    Some((0..n).map(|v| graph.degree(v) as f64 * scale).collect())
}

pub fn closeness_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let n = graph.node_count;
    let values = (0..n)
        .map(|u| {
            let sp = shortest_paths(graph, u);
            let total: u64 = sp.distance.iter().flatten().map(|&d| d as u64).sum();
            let reachable = sp.order.len();
            if total > 0 && n > 1 {
                let r = (reachable - 1) as f64;
                (r / total as f64) * (r / (n - 1) as f64)
            } else {
                0.0
            }
        })
        .collect();
    Some(values)
}

fn path_scale(n: usize) -> Option<f64> {
    (n > 2).then(|| 1.0 / ((n - 1) * (n - 2)) as f64)
}

/// Brandes betweenness
pub fn betweenness_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let n = graph.node_count;
    let mut betweenness = vec![0.0; n];

    for s in 0..n {
        let sp = shortest_paths(graph, s);
        let mut delta = vec![0.0; n];

        for &w in sp.order.iter().rev() {
            let w = w as usize;
            for &v in &sp.predecessors[w] {
                let v = v as usize;
                delta[v] += sp.sigma[v] / sp.sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                betweenness[w] += delta[w];
            }
        }
    }

    if let Some(scale) = path_scale(n) {
        betweenness.iter_mut().for_each(|b| *b *= scale);
    }
    Some(betweenness)
}

/// Newman's load centrality: one unit sent from each source, split evenly
/// over the predecessors of every node on the way back
pub fn load_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let n = graph.node_count;
    let mut load = vec![0.0; n];

    for s in 0..n {
        let sp = shortest_paths(graph, s);
        let mut between = vec![0.0; n];
        for &v in &sp.order {
            between[v as usize] = 1.0;
        }

        for &v in sp.order.iter().rev() {
            let v = v as usize;
            if v == s {
                continue;
            }
            let preds = &sp.predecessors[v];
            let share = between[v] / preds.len() as f64;
            for &x in preds {
                if x as usize == s {
                    break;
                }
                between[x as usize] += share;
            }
        }

        for &v in &sp.order {
            load[v as usize] += between[v as usize] - 1.0;
        }
    }

    if let Some(scale) = path_scale(n) {
        load.iter_mut().for_each(|l| *l *= scale);
    }
    Some(load)
}

pub fn harmonic_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let values = (0..graph.node_count)
        .map(|u| {
            shortest_paths(graph, u)
                .distance
                .iter()
                .flatten()
                .filter(|&&d| d > 0)
                .map(|&d| 1.0 / d as f64)
                .sum::<f64>()
        })
        .collect();
    Some(values)
}

/// Sum of |a_i - a_j| over all unordered pairs
fn pairwise_abs_sum(values: &Array1<f64>) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &a)| a * (2.0 * i as f64 - (n - 1.0)))
        .sum()
}

/// Random-walk (current-flow) betweenness with edge weights as conductances.
///
/// For an edge `e = (u, v)`, `flow[k]` is the current through `e` when a unit
/// enters at `k` and leaves at the ground; the current for a pair `(s, t)` is
/// `flow[s] - flow[t]`. A node's throughput for a pair is half the absolute
/// current over its edges, summed over pairs it is not an endpoint of.
pub fn current_flow_betweenness_centrality(graph: &CompressedGraph) -> Option<Vec<f64>> {
    let n = graph.node_count;
    if n < 3 || graph.weights.iter().any(|&w| !(w > 0.0)) {
        return None;
    }

    let potentials = grounded_potentials(graph)?;
    let mut throughput = vec![0.0; n];

    for u in 0..n {
        for (v, w) in graph.weighted_neighbors(u) {
            let v = v as usize;
            if v < u {
                continue;
            }

            let flow: Array1<f64> = (&potentials.row(u) - &potentials.row(v)) * w;
            let all_pairs = pairwise_abs_sum(&flow);

            for endpoint in [u, v] {
                let own: f64 = flow.iter().map(|&f| (flow[endpoint] - f).abs()).sum();
                throughput[endpoint] += 0.5 * (all_pairs - own);
            }
        }
    }

    let scale = 2.0 / ((n - 1) * (n - 2)) as f64;
    Some(throughput.into_iter().map(|t| t * scale).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, NodeAttributes};

    fn graph(n: usize, edges: &[(u32, u32)]) -> CompressedGraph {
        let mut builder = GraphBuilder::with_capacity(n);
        for i in 0..n {
            builder.add_node(&format!("n{}", i), NodeAttributes::default());
        }
        for &(a, b) in edges {
            builder.add_edge(a, b, 1.0);
        }
        builder.build()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    fn complete(n: u32) -> CompressedGraph {
        let edges: Vec<(u32, u32)> = (0..n)
            .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
            .collect();
        graph(n as usize, &edges)
    }

    #[test]
    fn test_single_edge() {
        let g = graph(2, &[(0, 1)]);
        assert_close(&degree_centrality(&g).unwrap(), &[1.0, 1.0]);
        assert_close(&closeness_centrality(&g).unwrap(), &[1.0, 1.0]);
        assert_close(&betweenness_centrality(&g).unwrap(), &[0.0, 0.0]);
        assert_close(&load_centrality(&g).unwrap(), &[0.0, 0.0]);
        assert_close(&harmonic_centrality(&g).unwrap(), &[1.0, 1.0]);
        assert!(current_flow_betweenness_centrality(&g).is_none());
    }

    #[test]
    fn test_singleton() {
        let g = graph(1, &[]);
        assert!(degree_centrality(&g).is_none());
        assert_close(&closeness_centrality(&g).unwrap(), &[0.0]);
        assert_close(&betweenness_centrality(&g).unwrap(), &[0.0]);
        assert_close(&load_centrality(&g).unwrap(), &[0.0]);
        assert_close(&harmonic_centrality(&g).unwrap(), &[0.0]);
        assert!(current_flow_betweenness_centrality(&g).is_none());
    }

    #[test]
    fn test_path_of_four() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let third = 1.0 / 3.0;
        assert_close(&degree_centrality(&g).unwrap(), &[third, 2.0 * third, 2.0 * third, third]);
        assert_close(&closeness_centrality(&g).unwrap(), &[0.5, 0.75, 0.75, 0.5]);
        assert_close(
            &betweenness_centrality(&g).unwrap(),
            &[0.0, 2.0 * third, 2.0 * third, 0.0],
        );
        assert_close(&load_centrality(&g).unwrap(), &[0.0, 2.0 * third, 2.0 * third, 0.0]);
        assert_close(
            &current_flow_betweenness_centrality(&g).unwrap(),
            &[0.0, 2.0 * third, 2.0 * third, 0.0],
        );
        assert_close(
            &harmonic_centrality(&g).unwrap(),
            &[1.0 + 0.5 + third, 2.0 + 0.5, 2.0 + 0.5, 1.0 + 0.5 + third],
        );
    }

    #[test]
    fn test_star() {
        let g = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_close(&betweenness_centrality(&g).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
        assert_close(&load_centrality(&g).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
        assert_close(
            &current_flow_betweenness_centrality(&g).unwrap(),
            &[1.0, 0.0, 0.0, 0.0],
        );
    }

    #[test]
    fn test_complete_graph_current_flow() {
        let g = complete(4);
        assert_close(
            &current_flow_betweenness_centrality(&g).unwrap(),
            &[0.25, 0.25, 0.25, 0.25],
        );
        assert_close(&betweenness_centrality(&g).unwrap(), &[0.0; 4]);
        assert_close(&closeness_centrality(&g).unwrap(), &[1.0; 4]);
    }

    #[test]
    fn test_cycle_load_matches_betweenness() {
        // 0-1-2-3-0: each node lies on half of the two shortest paths between
        // its neighbors
        let g = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let expected = [1.0 / 6.0; 4];
        assert_close(&betweenness_centrality(&g).unwrap(), &expected);
        assert_close(&load_centrality(&g).unwrap(), &expected);
    }

    #[test]
    fn test_current_flow_rejects_zero_weight() {
        let mut builder = GraphBuilder::with_capacity(3);
        for id in ["a", "b", "c"] {
            builder.add_node(id, NodeAttributes::default());
        }
        builder.add_edge(0, 1, 1.0);
        builder.add_edge(1, 2, 0.0);
        assert!(current_flow_betweenness_centrality(&builder.build()).is_none());
    }
}
