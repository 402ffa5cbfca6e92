//! Evidence similarity network over the final causal genes.
//!
//! Nodes live in an arena (`Vec`) and edges refer to them by index, so the
//! graph has no shared ownership and serializes as flat node/edge lists.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use omicsloop_common::{CausalGene, ConfidenceLevel, GeneEvidence};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub gene_id: String,
    pub causal_score: f64,
    pub confidence_level: ConfidenceLevel,
}

/// Undirected edge between two node indices, `source < target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: usize,
    pub target: usize,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvidenceNetwork {
    nodes: Vec<NetworkNode>,
    edges: Vec<NetworkEdge>,
    /// Edge indices incident to each node.
    #[serde(skip)]
    adjacency: Vec<Vec<usize>>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

/// Mean of `1 - |score_a - score_b|` over the evidence types both genes
/// carry; 0 when they share none.
pub fn evidence_similarity(a: &GeneEvidence, b: &GeneEvidence) -> f64 {
    let (sum, shared) = a
        .iter()
        .filter_map(|(t, ea)| b.get(t).map(|eb| 1.0 - (ea.score - eb.score).abs()))
        .fold((0.0, 0usize), |(s, n), sim| (s + sim, n + 1));
    if shared == 0 {
        0.0
    } else {
        sum / shared as f64
    }
}

impl EvidenceNetwork {
    /// Build the network. An edge joins two genes when their similarity is
    /// strictly greater than `threshold`.
    pub fn build(genes: &[CausalGene], threshold: f64) -> Self {
        let mut network = Self {
            nodes: Vec::with_capacity(genes.len()),
            edges: Vec::new(),
            adjacency: vec![Vec::new(); genes.len()],
            index: BTreeMap::new(),
        };

        for (i, gene) in genes.iter().enumerate() {
            network.index.insert(gene.gene_id.clone(), i);
            network.nodes.push(NetworkNode {
                gene_id: gene.gene_id.clone(),
                causal_score: gene.causal_score,
                confidence_level: gene.confidence_level,
            });
        }

        for i in 0..genes.len() {
            for j in (i + 1)..genes.len() {
                let similarity =
                    evidence_similarity(&genes[i].evidence_scores, &genes[j].evidence_scores);
                if similarity > threshold {
                    let e = network.edges.len();
                    network.edges.push(NetworkEdge {
                        source: i,
                        target: j,
                        similarity,
                    });
                    network.adjacency[i].push(e);
                    network.adjacency[j].push(e);
                }
            }
        }

        debug!(
            "Evidence network: {} nodes, {} edges",
            network.nodes.len(),
            network.edges.len()
        );
        network
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[NetworkEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, gene_id: &str) -> bool {
        self.index.contains_key(gene_id)
    }

    /// Neighbours of `gene_id` with edge similarity, in edge insertion order.
    pub fn neighbors<'a>(&'a self, gene_id: &str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        let incident: &'a [usize] = match self.index.get(gene_id) {
            Some(&i) => &self.adjacency[i],
            None => &[],
        };
        let me = self.index.get(gene_id).copied();
        incident.iter().map(move |&e| {
            let edge = &self.edges[e];
            let other = if Some(edge.source) == me {
                edge.target
            } else {
                edge.source
            };
            (self.nodes[other].gene_id.as_str(), edge.similarity)
        })
    }
}
