//! All-pairs hop distances over a network.

use log::debug;
use rayon::prelude::*;
use std::collections::VecDeque;

use crate::network::Network;

/// Dense n x n matrix of hop counts; unreachable pairs are `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn size(&self) -> usize {
        self.n
    }

    /// Distance from node index `from` to node index `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }
}

/// Breadth-first hop counts from a single source.
fn bfs_row(network: &Network, source: usize) -> Vec<f64> {
    let mut dist = vec![f64::INFINITY; network.node_count()];
    let mut queue = VecDeque::new();
    dist[source] = 0.0;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        let next = dist[u] + 1.0;
        for &v in network.successors(u) {
            if dist[v].is_infinite() {
                dist[v] = next;
                queue.push_back(v);
            }
        }
    }
    dist
}

/// Shortest-path (hop count) matrix between every ordered pair of nodes,
/// indexed by node insertion order. Each source row is computed in parallel.
pub fn shortest_path_matrix(network: &Network) -> DistanceMatrix {
    let n = network.node_count();
    debug!("Computing {}x{} shortest path matrix", n, n);

    let rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|source| bfs_row(network, source))
        .collect();

    let mut data = Vec::with_capacity(n * n);
    for row in rows {
        data.extend(row);
    }

    DistanceMatrix { n, data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::AttrValue;

    fn path_graph(directed: bool) -> Network {
        let mut net = Network::new(directed);
        for id in ["a", "b", "c"] {
            net.add_node(id, Vec::<(String, AttrValue)>::new());
        }
        net.add_edge("a", "b").unwrap();
        net.add_edge("b", "c").unwrap();
        net
    }

    #[test]
    fn directed_distances_respect_direction() {
        let spm = shortest_path_matrix(&path_graph(true));
        assert_eq!(spm.size(), 3);
        assert_eq!(spm.distance(0, 0), 0.0);
        assert_eq!(spm.distance(0, 2), 2.0);
        assert!(spm.distance(2, 0).is_infinite());
    }

    #[test]
    fn undirected_distances_are_symmetric() {
        let spm = shortest_path_matrix(&path_graph(false));
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(spm.distance(i, j), spm.distance(j, i));
            }
        }
        assert_eq!(spm.row(2), &[2.0, 1.0, 0.0]);
    }

    #[test]
    fn empty_network_gives_empty_matrix() {
        let spm = shortest_path_matrix(&Network::new(true));
        assert_eq!(spm.size(), 0);
    }
}
