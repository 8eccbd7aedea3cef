//! Attributed genotype-phenotype network and cluster assignments.
//!
//! Networks are loaded from a small tab-separated text format:
//!
//! ```text
//! H   directed
//! N   00  phenotypes=0.1  binary=00
//! N   01  phenotypes=0.5  binary=01
//! E   00  01
//! C   0   00
//! C   1   01
//! ```

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, VizError};

/// A node attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    /// Numbers parse as numbers, anything else is kept as text.
    pub fn parse(s: &str) -> Self {
        match s.parse::<f64>() {
            Ok(v) => AttrValue::Number(v),
            Err(_) => AttrValue::Text(s.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            AttrValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(v) => write!(f, "{}", v),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

/// A node (genotype) with its attributes
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub attrs: FxHashMap<String, AttrValue>,
}

/// Directed or undirected graph with attributed nodes
#[derive(Debug, Clone)]
pub struct Network {
    directed: bool,
    nodes: Vec<Node>,
    index: FxHashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    edge_set: FxHashSet<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl Network {
    pub fn new(directed: bool) -> Self {
        Network {
            directed,
            nodes: Vec::new(),
            index: FxHashMap::default(),
            edges: Vec::new(),
            edge_set: FxHashSet::default(),
            adjacency: Vec::new(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add a node, or merge `attrs` into an existing node with the same id.
    pub fn add_node<I, K, V>(&mut self, id: &str, attrs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push(Node {
                    id: id.to_string(),
                    attrs: FxHashMap::default(),
                });
                self.index.insert(id.to_string(), idx);
                self.adjacency.push(Vec::new());
                idx
            }
        };
        for (k, v) in attrs {
            self.nodes[idx].attrs.insert(k.into(), v.into());
        }
        idx
    }

    /// Add an edge between two existing nodes. Duplicates are ignored.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<()> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        let key = if self.directed || a <= b { (a, b) } else { (b, a) };
        if !self.edge_set.insert(key) {
            return Ok(());
        }
        self.edges.push(key);
        self.adjacency[a].push(b);
        if !self.directed && a != b {
            self.adjacency[b].push(a);
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| VizError::UnknownNode(id.to_string()))
    }

    /// Edges as (from, to) node indices
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Nodes reachable in one step from `index`
    pub fn successors(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    pub fn attribute(&self, id: &str, name: &str) -> Result<&AttrValue> {
        let node = &self.nodes[self.require(id)?];
        node.attrs.get(name).ok_or_else(|| VizError::MissingAttribute {
            node: id.to_string(),
            attribute: name.to_string(),
        })
    }

    pub fn numeric_attribute(&self, id: &str, name: &str) -> Result<f64> {
        self.attribute(id, name)?
            .as_f64()
            .ok_or_else(|| VizError::NonNumericAttribute {
                node: id.to_string(),
                attribute: name.to_string(),
            })
    }
}

/// Partition of (some of) the network's nodes into numbered clusters
#[derive(Debug, Clone, Default)]
pub struct Clusters {
    members: Vec<Vec<String>>,
    lookup: FxHashMap<String, usize>,
}

impl Clusters {
    /// Clusters given as lists of node ids; cluster `k` is `lists[k]`.
    pub fn new(lists: Vec<Vec<String>>) -> Result<Self> {
        let mut lookup = FxHashMap::default();
        for (k, list) in lists.iter().enumerate() {
            for id in list {
                if lookup.insert(id.clone(), k).is_some() {
                    return Err(VizError::DuplicateClusterMember(id.clone()));
                }
            }
        }
        Ok(Clusters {
            members: lists,
            lookup,
        })
    }

    /// Build from a node -> cluster id map. Cluster ids are sorted and
    /// renumbered from zero; members keep ascending id order.
    pub fn from_assignment<S: AsRef<str>>(assignment: &[(S, usize)]) -> Result<Self> {
        let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (id, cluster) in assignment {
            grouped
                .entry(*cluster)
                .or_default()
                .push(id.as_ref().to_string());
        }
        let lists = grouped
            .into_values()
            .map(|mut ids| {
                ids.sort();
                ids
            })
            .collect();
        Clusters::new(lists)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self, cluster: usize) -> &[String] {
        &self.members[cluster]
    }

    pub fn cluster_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.members.iter().map(|m| m.as_slice())
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> VizError {
    VizError::Parse {
        line,
        message: message.into(),
    }
}

/// Load a network and its clusters from the tab-separated record format.
pub fn load_network(path: &Path) -> Result<(Network, Clusters)> {
    info!("Loading network from {:?}...", path);
    let reader = BufReader::new(File::open(path)?);

    let mut directed = true;
    let mut node_lines: Vec<(usize, String)> = Vec::new();
    let mut edge_lines: Vec<(usize, String)> = Vec::new();
    let mut cluster_map: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = i + 1;
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed.starts_with("H\t") {
            directed = match trimmed[2..].trim() {
                "directed" => true,
                "undirected" => false,
                other => {
                    return Err(parse_error(lineno, format!("unknown header {:?}", other)))
                }
            };
        } else if trimmed.starts_with("N\t") {
            node_lines.push((lineno, trimmed.to_string()));
        } else if trimmed.starts_with("E\t") {
            edge_lines.push((lineno, trimmed.to_string()));
        } else if trimmed.starts_with("C\t") {
            let parts: Vec<&str> = trimmed.split('\t').collect();
            if parts.len() < 3 {
                return Err(parse_error(lineno, "cluster record needs an id and members"));
            }
            let cluster: usize = parts[1]
                .trim()
                .parse()
                .map_err(|_| parse_error(lineno, format!("bad cluster id {:?}", parts[1])))?;
            let entry = cluster_map.entry(cluster).or_default();
            for id in parts[2].split(',') {
                let id = id.trim();
                if !id.is_empty() {
                    entry.push(id.to_string());
                }
            }
        } else {
            debug!("Skipping unknown record on line {}", lineno);
        }
    }

    let mut network = Network::new(directed);
    for (lineno, line) in &node_lines {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 || parts[1].is_empty() {
            return Err(parse_error(*lineno, "node record needs an id"));
        }
        let mut attrs = Vec::new();
        for field in &parts[2..] {
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| parse_error(*lineno, format!("expected key=value, got {:?}", field)))?;
            attrs.push((key.to_string(), AttrValue::parse(value)));
        }
        network.add_node(parts[1], attrs);
    }

    for (lineno, line) in &edge_lines {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(parse_error(*lineno, "edge record needs two node ids"));
        }
        network.add_edge(parts[1], parts[2]).map_err(|e| match e {
            VizError::UnknownNode(id) => parse_error(*lineno, format!("unknown node {:?}", id)),
            other => other,
        })?;
    }

    let clusters = Clusters::new(cluster_map.into_values().collect())?;

    info!(
        "Found {} nodes, {} edges, {} clusters",
        network.node_count(),
        network.edge_count(),
        clusters.len()
    );

    Ok((network, clusters))
}

/// Load a numeric sequence (timescales or eigenvalues), one or more values per line.
pub fn load_spectrum(path: &Path) -> Result<Vec<f64>> {
    let reader = BufReader::new(File::open(path)?);
    let mut values = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let v: f64 = token
                .parse()
                .map_err(|_| parse_error(i + 1, format!("not a number: {:?}", token)))?;
            values.push(v);
        }
    }

    debug!("Loaded {} spectrum values from {:?}", values.len(), path);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn triangle() -> Network {
        let mut net = Network::new(true);
        net.add_node("a", [("phenotypes", 1.0)]);
        net.add_node("b", [("phenotypes", 2.0)]);
        net.add_node("c", [("phenotypes", 3.0)]);
        net.add_edge("a", "b").unwrap();
        net.add_edge("b", "c").unwrap();
        net
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut net = triangle();
        net.add_edge("a", "b").unwrap();
        assert_eq!(net.edge_count(), 2);
    }

    #[test]
    fn undirected_edges_traverse_both_ways() {
        let mut net = Network::new(false);
        net.add_node("x", Vec::<(String, AttrValue)>::new());
        net.add_node("y", Vec::<(String, AttrValue)>::new());
        net.add_edge("y", "x").unwrap();
        net.add_edge("x", "y").unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.successors(0), &[1]);
        assert_eq!(net.successors(1), &[0]);
    }

    #[test]
    fn edge_to_unknown_node_fails() {
        let mut net = triangle();
        assert!(matches!(net.add_edge("a", "zz"), Err(VizError::UnknownNode(id)) if id == "zz"));
    }

    #[test]
    fn attribute_lookup_errors() {
        let mut net = triangle();
        net.add_node("a", [("binary", AttrValue::from("00"))]);
        assert_eq!(net.numeric_attribute("a", "phenotypes").unwrap(), 1.0);
        assert!(matches!(
            net.attribute("a", "fitness"),
            Err(VizError::MissingAttribute { .. })
        ));
        assert!(matches!(
            net.numeric_attribute("a", "binary"),
            Err(VizError::NonNumericAttribute { .. })
        ));
    }

    #[test]
    fn clusters_from_assignment_renumber() {
        let clusters =
            Clusters::from_assignment(&[("c", 7), ("a", 3), ("b", 7)]).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.members(0), &["a".to_string()]);
        assert_eq!(clusters.members(1), &["b".to_string(), "c".to_string()]);
        assert_eq!(clusters.cluster_of("c"), Some(1));
        assert_eq!(clusters.cluster_of("zz"), None);
    }

    #[test]
    fn clusters_reject_repeated_member() {
        let lists = vec![vec!["a".to_string()], vec!["a".to_string()]];
        assert!(matches!(
            Clusters::new(lists),
            Err(VizError::DuplicateClusterMember(_))
        ));
    }

    #[test]
    fn load_network_reads_all_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# toy landscape").unwrap();
        writeln!(file, "H\tundirected").unwrap();
        writeln!(file, "N\t00\tphenotypes=0.1\tbinary=00").unwrap();
        writeln!(file, "N\t01\tphenotypes=0.7\tbinary=01").unwrap();
        writeln!(file, "E\t00\t01").unwrap();
        writeln!(file, "C\t0\t00").unwrap();
        writeln!(file, "C\t1\t01").unwrap();
        writeln!(file, "X\tignored").unwrap();
        file.flush().unwrap();

        let (net, clusters) = load_network(file.path()).unwrap();
        assert!(!net.is_directed());
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(net.attribute("01", "binary").unwrap(), &AttrValue::from("01"));
        assert_eq!(net.numeric_attribute("01", "phenotypes").unwrap(), 0.7);
    }

    #[test]
    fn load_network_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N\ta\tphenotypes=1").unwrap();
        writeln!(file, "E\ta\tmissing").unwrap();
        file.flush().unwrap();

        match load_network(file.path()) {
            Err(VizError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn load_spectrum_mixed_separators() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# eigenvalues").unwrap();
        writeln!(file, "1.0, 0.5").unwrap();
        writeln!(file, "0.25 0.125").unwrap();
        file.flush().unwrap();

        let values = load_spectrum(file.path()).unwrap();
        assert_eq!(values, vec![1.0, 0.5, 0.25, 0.125]);
    }
}
