use crate::mesh::MeshError;
use fnv::FnvBuildHasher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An ordered walk along a region's boundary, as vertex ids into the
/// region's vertex buffer. A closed outline loops back from its last vertex
/// to its first; the first vertex is **not** repeated at the end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub vertices: Vec<u32>,
    pub closed: bool,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of boundary edges this outline walks over
    pub fn edge_count(&self) -> usize {
        if self.closed {
            self.vertices.len()
        } else {
            self.vertices.len().saturating_sub(1)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Edge {
    a: u32,
    b: u32,
}

impl Edge {
    fn other(self, vertex: u32) -> u32 {
        if vertex == self.a {
            self.b
        } else {
            self.a
        }
    }
}

/// The edges touching one vertex. A vertex on a well-formed boundary has at
/// most two, so this never allocates.
#[derive(Copy, Clone, Debug, Default)]
struct Incident {
    edges: [usize; 2],
    len: usize,
}

impl Incident {
    /// Returns false if the list is already full
    fn push(&mut self, edge: usize) -> bool {
        if self.len < self.edges.len() {
            self.edges[self.len] = edge;
            self.len += 1;
            true
        } else {
            false
        }
    }

    fn first(&self) -> Option<usize> {
        if self.len > 0 {
            Some(self.edges[0])
        } else {
            None
        }
    }

    /// Swap-pop removal, order isn't preserved
    fn remove(&mut self, edge: usize) {
        if let Some(i) = self.edges[..self.len].iter().position(|e| *e == edge)
        {
            self.len -= 1;
            self.edges[i] = self.edges[self.len];
        }
    }
}

/// Collects the boundary edges emitted while triangulating a region, then
/// chains them up into [Outline]s.
#[derive(Clone, Debug, Default)]
pub struct EdgeGraph {
    edges: Vec<Edge>,
    consumed: Vec<bool>,
    incident: HashMap<u32, Incident, FnvBuildHasher>,
}

impl EdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boundary edge between two vertices. Fails if either vertex
    /// already has two boundary edges.
    pub fn add_edge(&mut self, a: u32, b: u32) -> Result<(), MeshError> {
        let id = self.edges.len();
        for vertex in [a, b].iter().copied() {
            if !self.incident.entry(vertex).or_default().push(id) {
                return Err(MeshError::NonManifold { vertex });
            }
        }
        self.edges.push(Edge { a, b });
        self.consumed.push(false);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Chain every edge into outlines. Tracing starts from the first edge
    /// that hasn't been used yet, in the order edges were added, and repeats
    /// until all edges belong to an outline.
    pub fn into_outlines(mut self) -> Vec<Outline> {
        let mut outlines = Vec::new();
        for start in 0..self.edges.len() {
            if !self.consumed[start] {
                outlines.push(self.trace(start));
            }
        }
        outlines
    }

    /// Mark an edge as used and detach it from both of its vertices
    fn consume(&mut self, id: usize) {
        let edge = self.edges[id];
        self.consumed[id] = true;
        for vertex in [edge.a, edge.b].iter() {
            if let Some(incident) = self.incident.get_mut(vertex) {
                incident.remove(id);
            }
        }
    }

    /// Take the next unused edge leaving `vertex` and return the vertex on
    /// the far end of it
    fn step(&mut self, vertex: u32) -> Option<u32> {
        let id = self.incident.get(&vertex)?.first()?;
        self.consume(id);
        Some(self.edges[id].other(vertex))
    }

    fn trace(&mut self, start: usize) -> Outline {
        let origin = self.edges[start].a;
        let mut pivot = self.edges[start].b;
        self.consume(start);

        let mut vertices = vec![origin];
        let closed = loop {
            if pivot == origin {
                break true;
            }
            vertices.push(pivot);
            match self.step(pivot) {
                Some(next) => pivot = next,
                None => break false,
            }
        };

        if !closed {
            // We started somewhere in the middle of a chain, so pick up
            // whatever hangs off the other side of the origin
            let mut backward = Vec::new();
            let mut pivot = origin;
            while let Some(next) = self.step(pivot) {
                backward.push(next);
                pivot = next;
            }
            if !backward.is_empty() {
                backward.reverse();
                backward.append(&mut vertices);
                vertices = backward;
            }
        }

        Outline { vertices, closed }
    }
}
