//! Rebuilding a mesh with captured topology at new vertex positions.
//!
//! [`MeshBuilder`] appends vertices, edges and faces strictly in insertion order, and loops
//! are enumerated face by face, so a rebuilt mesh in which nothing was skipped has the same
//! face and loop numbering as the captured one. A skipped face shifts every later face and
//! loop down; attribute reattachment stays positional regardless.

use crate::mesh::MeshEdge;
use crate::snapshot::Snapshot;
use crate::{F, FaceKind, Mesh, minmax};
use std::collections::{HashMap, HashSet};

/// Why a single edge or face was not built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// An earlier captured edge had the same endpoints.
    DuplicateEdge,
    /// Both endpoints are the same vertex.
    SelfLoop,
    /// References a vertex that does not exist.
    OutOfRange,
    /// The builder already holds an element with these vertices.
    AlreadyExists,
    /// A face needs at least 3 vertices.
    TooFewVertices,
    /// A face visits the same vertex twice.
    RepeatedVertex,
}

/// Result of one attempt to build an edge or face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Built, at this index in the builder.
    Built(usize),
    Skipped(SkipReason),
}

impl BuildOutcome {
    pub fn built(self) -> Option<usize> {
        match self {
            BuildOutcome::Built(i) => Some(i),
            BuildOutcome::Skipped(_) => None,
        }
    }
    pub fn is_built(self) -> bool {
        matches!(self, BuildOutcome::Built(_))
    }
}

/// Incrementally constructs a mesh, rejecting invalid elements instead of failing.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    v: Vec<[F; 3]>,
    e: Vec<MeshEdge>,
    edge_lookup: HashMap<[usize; 2], usize>,
    f: Vec<FaceKind>,
    face_lookup: HashSet<Vec<usize>>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_verts(&self) -> usize {
        self.v.len()
    }
    pub fn num_edges(&self) -> usize {
        self.e.len()
    }
    pub fn num_faces(&self) -> usize {
        self.f.len()
    }

    pub fn add_vert(&mut self, p: [F; 3]) -> usize {
        self.v.push(p);
        self.v.len() - 1
    }

    pub fn add_edge(&mut self, a: usize, b: usize) -> BuildOutcome {
        use SkipReason::*;
        if a >= self.v.len() || b >= self.v.len() {
            return BuildOutcome::Skipped(OutOfRange);
        }
        if a == b {
            return BuildOutcome::Skipped(SelfLoop);
        }
        let key = minmax(a, b);
        if self.edge_lookup.contains_key(&key) {
            return BuildOutcome::Skipped(AlreadyExists);
        }
        self.e.push(MeshEdge::new(a, b));
        let ei = self.e.len() - 1;
        self.edge_lookup.insert(key, ei);
        BuildOutcome::Built(ei)
    }

    /// Sets whether shading is smooth across edge `ei`.
    pub fn set_edge_smooth(&mut self, ei: usize, smooth: bool) {
        if let Some(e) = self.e.get_mut(ei) {
            e.sharp = !smooth;
        }
    }

    /// Adds a face over `vis` in the given winding. Boundary edges the builder doesn't have yet
    /// are created, smooth.
    pub fn add_face(&mut self, vis: &[usize]) -> BuildOutcome {
        use SkipReason::*;
        if vis.len() < 3 {
            return BuildOutcome::Skipped(TooFewVertices);
        }
        if vis.iter().any(|&vi| vi >= self.v.len()) {
            return BuildOutcome::Skipped(OutOfRange);
        }
        let face = FaceKind::from_slice(vis);
        if face.has_repeated_vertex() {
            return BuildOutcome::Skipped(RepeatedVertex);
        }
        let mut key = vis.to_vec();
        key.sort_unstable();
        if !self.face_lookup.insert(key) {
            return BuildOutcome::Skipped(AlreadyExists);
        }
        for [a, b] in face.edges() {
            // already present is the common case here
            let _ = self.add_edge(a, b);
        }
        self.f.push(face);
        BuildOutcome::Built(self.f.len() - 1)
    }

    /// Replaces the contents of `dst` with what was built. Material slot names on `dst` are
    /// kept; face materials reset to slot 0 and UV channels are removed.
    pub fn commit(self, dst: &mut Mesh) {
        dst.face_mat = vec![0; self.f.len()];
        dst.v = self.v;
        dst.e = self.e;
        dst.f = self.f;
        dst.uv.clear();
    }
}

/// What happened to each captured edge and face, in capture order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconstructReport {
    pub edges: Vec<BuildOutcome>,
    pub faces: Vec<BuildOutcome>,
}

impl ReconstructReport {
    pub fn num_skipped_edges(&self) -> usize {
        self.edges.iter().filter(|o| !o.is_built()).count()
    }
    pub fn num_skipped_faces(&self) -> usize {
        self.faces.iter().filter(|o| !o.is_built()).count()
    }
}

/// Builds `snapshot`'s topology at `positions` and commits it into `dst`.
///
/// Exactly `snapshot.num_v` vertices are created. Captured edges with the same unordered
/// endpoints as an earlier one are skipped, so the first one's sharpness wins. Any position
/// missing from `positions` falls back to the captured one.
pub fn reconstruct(positions: &[[F; 3]], snapshot: &Snapshot, dst: &mut Mesh) -> ReconstructReport {
    let mut b = MeshBuilder::new();
    for vi in 0..snapshot.num_v {
        let p = positions.get(vi).or(snapshot.v.get(vi)).copied();
        b.add_vert(p.unwrap_or([0.; 3]));
    }

    let mut report = ReconstructReport::default();
    let mut seen = HashSet::new();
    for e in &snapshot.edges {
        let [a, c] = e.vs;
        let outcome = if !seen.insert(minmax(a, c)) {
            BuildOutcome::Skipped(SkipReason::DuplicateEdge)
        } else {
            b.add_edge(a, c)
        };
        match outcome {
            BuildOutcome::Built(ei) => b.set_edge_smooth(ei, !e.sharp),
            BuildOutcome::Skipped(reason) => tracing::trace!(?reason, vs = ?e.vs, "edge skipped"),
        }
        report.edges.push(outcome);
    }

    for (fi, f) in snapshot.faces.iter().enumerate() {
        let outcome = b.add_face(&f.verts);
        if let BuildOutcome::Skipped(reason) = outcome {
            tracing::trace!(?reason, fi, "face skipped");
        }
        report.faces.push(outcome);
    }

    tracing::debug!(
        verts = b.num_verts(),
        edges = b.num_edges(),
        faces = b.num_faces(),
        skipped_edges = report.num_skipped_edges(),
        skipped_faces = report.num_skipped_faces(),
        "reconstructed topology"
    );
    b.commit(dst);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;
    use crate::snapshot::{CapturedEdge, CapturedFace};

    #[test]
    fn test_builder_rejects() {
        let mut b = MeshBuilder::new();
        for _ in 0..4 {
            b.add_vert([0.; 3]);
        }
        assert_eq!(b.add_edge(0, 0), BuildOutcome::Skipped(SkipReason::SelfLoop));
        assert_eq!(b.add_edge(0, 9), BuildOutcome::Skipped(SkipReason::OutOfRange));
        assert_eq!(b.add_edge(0, 1), BuildOutcome::Built(0));
        assert_eq!(b.add_edge(1, 0), BuildOutcome::Skipped(SkipReason::AlreadyExists));

        use SkipReason::*;
        assert_eq!(b.add_face(&[0, 1]), BuildOutcome::Skipped(TooFewVertices));
        assert_eq!(b.add_face(&[0, 1, 1, 2]), BuildOutcome::Skipped(RepeatedVertex));
        assert_eq!(b.add_face(&[0, 1, 7]), BuildOutcome::Skipped(OutOfRange));
        assert_eq!(b.add_face(&[0, 1, 2, 3]), BuildOutcome::Built(0));
        assert_eq!(b.add_face(&[3, 2, 1, 0]), BuildOutcome::Skipped(AlreadyExists));
        // face created its missing boundary edges
        assert_eq!(b.num_edges(), 4);
    }

    #[test]
    fn test_reconstruct_keeps_counts() {
        let src = quad_grid(3);
        let s = Snapshot::capture(&src);
        let moved = s.v.iter().map(|&[x, y, z]| [x, y, z + 1.]).collect::<Vec<_>>();
        let mut dst = Mesh::default();
        let report = reconstruct(&moved, &s, &mut dst);
        assert_eq!(dst.v.len(), 16);
        assert_eq!(dst.e.len(), src.e.len());
        assert_eq!(dst.f, src.f);
        assert_eq!(dst.v, moved);
        assert_eq!(report.num_skipped_edges(), 0);
        assert_eq!(report.num_skipped_faces(), 0);
        assert!(dst.is_valid());
    }

    #[test]
    fn test_duplicate_edge_first_wins() {
        let s = Snapshot {
            num_v: 3,
            v: vec![[0.; 3]; 3],
            edges: vec![
                CapturedEdge {
                    vs: [0, 1],
                    sharp: true,
                },
                CapturedEdge {
                    vs: [1, 0],
                    sharp: false,
                },
                CapturedEdge {
                    vs: [2, 2],
                    sharp: false,
                },
            ],
            faces: vec![CapturedFace {
                verts: vec![0, 1, 1],
                material: 0,
            }],
            ..Default::default()
        };
        let mut dst = Mesh::default();
        let report = reconstruct(&s.v, &s, &mut dst);
        assert_eq!(
            report.edges,
            vec![
                BuildOutcome::Built(0),
                BuildOutcome::Skipped(SkipReason::DuplicateEdge),
                BuildOutcome::Skipped(SkipReason::SelfLoop),
            ]
        );
        assert_eq!(
            report.faces,
            vec![BuildOutcome::Skipped(SkipReason::RepeatedVertex)]
        );
        assert_eq!(dst.e.len(), 1);
        assert!(dst.e[0].sharp);
        assert!(dst.f.is_empty());
    }
}
