//! Per-vertex scalar storage shared by curvature and roughness.

use std::collections::HashMap;

use meshstat_topo::VertexId;

/// One value per vertex, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexField {
    entries: Vec<(VertexId, f64)>,
    index: HashMap<VertexId, usize>,
}

impl VertexField {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
            index: HashMap::with_capacity(n),
        }
    }

    pub(crate) fn insert(&mut self, vertex: VertexId, value: f64) {
        match self.index.get(&vertex) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(vertex, self.entries.len());
                self.entries.push((vertex, value));
            }
        }
    }

    /// Value at `vertex`, if it was computed.
    pub fn get(&self, vertex: VertexId) -> Option<f64> {
        self.index.get(&vertex).map(|&i| self.entries[i].1)
    }

    /// `(vertex, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no vertex has a value.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
