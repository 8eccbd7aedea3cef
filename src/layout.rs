//! Flattened cluster layout: clusters are spread along x, nodes sit at their
//! fitness on y.

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::{Result, VizError};
use crate::network::{Clusters, Network};
use crate::paths::DistanceMatrix;

/// Horizontal step between members of the same cluster, before scaling.
const CLUSTER_SPREAD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Node id -> 2D position
pub type Positions = FxHashMap<String, Point>;

/// Layout parameters for [`cluster_positions`]
#[derive(Debug, Clone)]
pub struct ClusterLayout {
    /// Multiplies the horizontal spread of nodes within a cluster.
    pub scale: f64,
    /// Numeric node attribute used as the y coordinate.
    pub y_attribute: String,
}

impl Default for ClusterLayout {
    fn default() -> Self {
        ClusterLayout {
            scale: 1.0,
            y_attribute: "phenotypes".to_string(),
        }
    }
}

/// Node indices per cluster, with unassigned nodes gathered in a trailing group.
fn cluster_groups(network: &Network, clusters: &Clusters) -> Result<Vec<Vec<usize>>> {
    let mut groups = Vec::with_capacity(clusters.len() + 1);
    for members in clusters.iter() {
        let group = members
            .iter()
            .map(|id| {
                network
                    .index_of(id)
                    .ok_or_else(|| VizError::UnknownNode(id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        groups.push(group);
    }

    let unassigned: Vec<usize> = network
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| clusters.cluster_of(&node.id).is_none())
        .map(|(i, _)| i)
        .collect();
    if !unassigned.is_empty() {
        debug!("{} nodes outside any cluster placed in a trailing group", unassigned.len());
        groups.push(unassigned);
    }
    Ok(groups)
}

/// Mean finite hop distance from the first group to every group.
/// `None` when no member of the first group reaches the group.
fn mean_distances(groups: &[Vec<usize>], spm: &DistanceMatrix) -> Vec<Option<f64>> {
    let source = &groups[0];
    groups
        .iter()
        .map(|group| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for &i in source {
                for &j in group {
                    let d = spm.distance(i, j);
                    if d.is_finite() {
                        sum += d;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                Some(sum / count as f64)
            } else {
                None
            }
        })
        .collect()
}

/// x coordinate of every group's center, in [0, 1].
fn group_centers(groups: &[Vec<usize>], spm: Option<&DistanceMatrix>) -> Vec<f64> {
    let k = groups.len();
    if k == 1 {
        return vec![0.5];
    }

    match spm {
        None => (0..k).map(|i| i as f64 / (k - 1) as f64).collect(),
        Some(spm) => {
            let means = mean_distances(groups, spm);
            let max = means.iter().flatten().fold(0.0f64, |a, &b| a.max(b));
            if max == 0.0 {
                return means
                    .iter()
                    .map(|m| if m.is_some() { 0.0 } else { 1.0 })
                    .collect();
            }
            means
                .iter()
                .map(|m| match m {
                    Some(d) => d / max,
                    None => 1.0,
                })
                .collect()
        }
    }
}

/// Position every node of `network`: clusters get an x center (ordered by
/// hop distance from cluster 0 when `spm` is given, by cluster number
/// otherwise), and each node's y is its `y_attribute`.
pub fn cluster_positions(
    network: &Network,
    clusters: &Clusters,
    spm: Option<&DistanceMatrix>,
    layout: &ClusterLayout,
) -> Result<Positions> {
    let mut positions = Positions::default();
    if network.node_count() == 0 {
        return Ok(positions);
    }

    let groups = cluster_groups(network, clusters)?;
    let groups: Vec<Vec<usize>> = groups.into_iter().filter(|g| !g.is_empty()).collect();
    let centers = group_centers(&groups, spm);
    let step = CLUSTER_SPREAD * layout.scale;

    for (group, &center) in groups.iter().zip(&centers) {
        let mut members = Vec::with_capacity(group.len());
        for &idx in group {
            let id = &network.nodes()[idx].id;
            let y = network.numeric_attribute(id, &layout.y_attribute)?;
            members.push((y, id));
        }
        members.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        let half = (members.len() as f64 - 1.0) / 2.0;
        for (i, (y, id)) in members.into_iter().enumerate() {
            let x = center + (i as f64 - half) * step;
            positions.insert(id.clone(), Point::new(x, y));
        }
    }

    debug!(
        "Laid out {} nodes in {} cluster groups",
        positions.len(),
        groups.len()
    );
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::shortest_path_matrix;

    fn chain() -> (Network, Clusters) {
        let mut net = Network::new(true);
        for (id, p) in [("a", 0.1), ("b", 0.4), ("c", 0.3), ("d", 0.9)] {
            net.add_node(id, [("phenotypes", p)]);
        }
        net.add_edge("a", "b").unwrap();
        net.add_edge("b", "c").unwrap();
        net.add_edge("c", "d").unwrap();
        let clusters = Clusters::new(vec![
            vec!["a".into()],
            vec!["b".into(), "c".into()],
            vec!["d".into()],
        ])
        .unwrap();
        (net, clusters)
    }

    #[test]
    fn every_node_placed_once() {
        let (mut net, clusters) = chain();
        net.add_node("lonely", [("phenotypes", 0.5)]);
        let pos = cluster_positions(&net, &clusters, None, &ClusterLayout::default()).unwrap();
        assert_eq!(pos.len(), net.node_count());
        for id in net.node_ids() {
            assert!(pos.contains_key(&id));
        }
    }

    #[test]
    fn y_is_the_attribute() {
        let (net, clusters) = chain();
        let pos = cluster_positions(&net, &clusters, None, &ClusterLayout::default()).unwrap();
        assert_eq!(pos["d"].y, 0.9);
        assert_eq!(pos["c"].y, 0.3);
    }

    #[test]
    fn clusters_ordered_by_number_without_distances() {
        let (net, clusters) = chain();
        let pos = cluster_positions(&net, &clusters, None, &ClusterLayout::default()).unwrap();
        assert_eq!(pos["a"].x, 0.0);
        assert_eq!(pos["d"].x, 1.0);
        // members of the middle cluster straddle 0.5, lower fitness on the left
        assert!((pos["c"].x - 0.49).abs() < 1e-12);
        assert!((pos["b"].x - 0.51).abs() < 1e-12);
    }

    #[test]
    fn distances_set_cluster_centers() {
        let (net, clusters) = chain();
        let spm = shortest_path_matrix(&net);
        let pos = cluster_positions(&net, &clusters, Some(&spm), &ClusterLayout::default()).unwrap();
        // mean hops from a: middle cluster 1.5, last cluster 3
        let middle = (pos["b"].x + pos["c"].x) / 2.0;
        assert!((middle - 0.5).abs() < 1e-12);
        assert_eq!(pos["d"].x, 1.0);
        assert_eq!(pos["a"].x, 0.0);
    }

    #[test]
    fn scale_widens_spread() {
        let (net, clusters) = chain();
        let layout = ClusterLayout {
            scale: 2.0,
            ..ClusterLayout::default()
        };
        let pos = cluster_positions(&net, &clusters, None, &layout).unwrap();
        assert!((pos["b"].x - pos["c"].x - 0.04).abs() < 1e-12);
    }

    #[test]
    fn single_cluster_is_centered() {
        let (net, _) = chain();
        let pos = cluster_positions(&net, &Clusters::default(), None, &ClusterLayout::default())
            .unwrap();
        let mean_x: f64 = pos.values().map(|p| p.x).sum::<f64>() / pos.len() as f64;
        assert!((mean_x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_cluster_member_fails() {
        let (net, _) = chain();
        let clusters = Clusters::new(vec![vec!["ghost".into()]]).unwrap();
        assert!(matches!(
            cluster_positions(&net, &clusters, None, &ClusterLayout::default()),
            Err(VizError::UnknownNode(_))
        ));
    }

    #[test]
    fn layout_is_deterministic() {
        let (net, clusters) = chain();
        let spm = shortest_path_matrix(&net);
        let a = cluster_positions(&net, &clusters, Some(&spm), &ClusterLayout::default()).unwrap();
        let b = cluster_positions(&net, &clusters, Some(&spm), &ClusterLayout::default()).unwrap();
        assert_eq!(a, b);
    }
}
