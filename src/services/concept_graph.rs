//! Static prerequisite graph. Loaded once at startup from a JSON file and
//! never mutated; node order follows file order so traversal ties are
//! deterministic.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to read graph file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse graph file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate concept id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone)]
pub struct ConceptGraph {
    nodes: Vec<ConceptNode>,
    index: HashMap<String, usize>,
}

impl ConceptGraph {
    pub fn new(nodes: Vec<ConceptNode>) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateId(node.id.clone()));
            }
        }
        Ok(Self { nodes, index })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let raw = std::fs::read_to_string(path)?;
        let nodes: Vec<ConceptNode> = serde_json::from_str(&raw)?;
        Self::new(nodes)
    }

    /// Minimal built-in graph used when no graph file is available, so path
    /// planning still works instead of failing outright.
    pub fn fallback() -> Self {
        let nodes = vec![
            ConceptNode {
                id: "algebra_basics".to_string(),
                name: "Algebra Basics".to_string(),
                description: "Basic algebraic concepts".to_string(),
                prerequisites: vec![],
            },
            ConceptNode {
                id: "linear_equations".to_string(),
                name: "Linear Equations".to_string(),
                description: "Solving linear equations".to_string(),
                prerequisites: vec!["algebra_basics".to_string()],
            },
            ConceptNode {
                id: "quadratic_equations".to_string(),
                name: "Quadratic Equations".to_string(),
                description: "Solving quadratic equations".to_string(),
                prerequisites: vec!["linear_equations".to_string()],
            },
        ];
        Self::new(nodes).expect("fallback graph ids are unique")
    }

    pub fn get(&self, concept_id: &str) -> Option<&ConceptNode> {
        self.index.get(concept_id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, concept_id: &str) -> bool {
        self.index.contains_key(concept_id)
    }

    pub fn nodes(&self) -> &[ConceptNode] {
        &self.nodes
    }

    /// Insertion rank of a node, used for deterministic tie-breaking.
    pub fn rank(&self, concept_id: &str) -> Option<usize> {
        self.index.get(concept_id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
