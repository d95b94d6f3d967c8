use super::{F, FaceKind, minmax};

use std::collections::HashMap;

/// Name given to the first UV channel of a mesh when a file format doesn't name it.
pub const DEFAULT_UV_NAME: &str = "UVMap";

/// An edge between two vertices, with its shading and unwrapping flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MeshEdge {
    pub vs: [usize; 2],
    /// Hard shading across this edge.
    pub sharp: bool,
    /// UV unwrapping cut.
    pub seam: bool,
}

impl MeshEdge {
    pub fn new(v0: usize, v1: usize) -> Self {
        Self {
            vs: [v0, v1],
            ..Default::default()
        }
    }
    /// Unordered key of this edge.
    #[inline]
    pub fn key(&self) -> [usize; 2] {
        let [a, b] = self.vs;
        minmax(a, b)
    }
}

/// A named set of per-loop UV coordinates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UvChannel {
    pub name: String,
    /// Indexed by loop index, one entry per loop of the mesh.
    pub data: Vec<[F; 2]>,
}

/// Polygonal mesh as held by a scene object.
///
/// Loops are enumerated face by face in face order, so loop `k` of face `fi` has the
/// loop index `loop_starts()[fi] + k`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Mesh {
    pub v: Vec<[F; 3]>,
    pub e: Vec<MeshEdge>,

    pub f: Vec<FaceKind>,
    /// 1-1 relation between faces and material slots.
    pub face_mat: Vec<usize>,

    pub uv: Vec<UvChannel>,

    /// Names of material slots, indexed by `face_mat`.
    pub materials: Vec<String>,
}

impl Mesh {
    /// Constructs a mesh with only positions and faces. Edges are derived from the faces.
    pub fn new_geometry(v: Vec<[F; 3]>, f: Vec<FaceKind>) -> Self {
        let mut out = Self {
            v,
            face_mat: vec![0; f.len()],
            f,
            ..Default::default()
        };
        out.derive_edges();
        out
    }

    /// Total number of loops, which is the sum of all face lengths.
    pub fn num_loops(&self) -> usize {
        self.f.iter().map(FaceKind::len).sum()
    }

    /// Loop index of the first loop of each face.
    pub fn loop_starts(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.f.len());
        let mut curr = 0;
        for f in &self.f {
            out.push(curr);
            curr += f.len();
        }
        out
    }

    pub fn uv_channel(&self, name: &str) -> Option<&UvChannel> {
        self.uv.iter().find(|c| c.name == name)
    }

    /// Returns the channel named `name`, creating it with zeroed coordinates for every
    /// loop if it does not exist.
    pub fn ensure_uv_channel(&mut self, name: &str) -> &mut UvChannel {
        let idx = match self.uv.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                let num_loops = self.num_loops();
                self.uv.push(UvChannel {
                    name: name.to_string(),
                    data: vec![[0.; 2]; num_loops],
                });
                self.uv.len() - 1
            }
        };
        &mut self.uv[idx]
    }

    /// Finds the edge connecting `a` and `b`, in either direction.
    pub fn edge_index(&self, a: usize, b: usize) -> Option<usize> {
        let key = minmax(a, b);
        self.e.iter().position(|e| e.key() == key)
    }

    /// Appends an edge for each face boundary segment not already in `e`.
    /// Returns the number of edges added.
    pub fn derive_edges(&mut self) -> usize {
        let mut seen = self
            .e
            .iter()
            .enumerate()
            .map(|(ei, e)| (e.key(), ei))
            .collect::<HashMap<_, _>>();
        let prev = self.e.len();
        for f in &self.f {
            for [a, b] in f.edges() {
                if a == b {
                    continue;
                }
                seen.entry(minmax(a, b)).or_insert_with(|| {
                    self.e.push(MeshEdge::new(a, b));
                    self.e.len() - 1
                });
            }
        }
        self.e.len() - prev
    }

    /// Checks that every index is in range and every per-element array has the right length.
    pub fn is_valid(&self) -> bool {
        let nv = self.v.len();
        let num_loops = self.num_loops();
        self.e.iter().all(|e| e.vs.iter().all(|&vi| vi < nv))
            && self.f.iter().all(|f| f.as_slice().iter().all(|&vi| vi < nv))
            && self.face_mat.len() == self.f.len()
            && self.uv.iter().all(|c| c.data.len() == num_loops)
    }

    /// Index of the material slot named `name`, adding it if missing.
    pub fn material_slot(&mut self, name: &str) -> usize {
        if let Some(i) = self.materials.iter().position(|m| m == name) {
            return i;
        }
        self.materials.push(name.to_string());
        self.materials.len() - 1
    }
}

#[cfg(test)]
pub(crate) fn quad_grid(n: usize) -> Mesh {
    // (n+1) x (n+1) vertices on the unit square, n x n quads.
    let w = n + 1;
    let v = (0..w * w)
        .map(|i| [(i % w) as F / n as F, (i / w) as F / n as F, 0.])
        .collect::<Vec<_>>();
    let f = (0..n * n)
        .map(|i| {
            let (x, y) = (i % n, i / n);
            let a = y * w + x;
            FaceKind::Quad([a, a + 1, a + 1 + w, a + w])
        })
        .collect::<Vec<_>>();
    Mesh::new_geometry(v, f)
}

#[test]
fn test_derive_edges_grid() {
    let m = quad_grid(3);
    assert_eq!(m.v.len(), 16);
    assert_eq!(m.f.len(), 9);
    // 3 rows of 4 vertical + 4 rows of 3 horizontal
    assert_eq!(m.e.len(), 24);
    assert!(m.is_valid());
}

#[test]
fn test_loop_starts() {
    let mut m = quad_grid(1);
    m.f.push(FaceKind::Tri([0, 1, 2]));
    m.face_mat.push(0);
    assert_eq!(m.loop_starts(), vec![0, 4]);
    assert_eq!(m.num_loops(), 7);
}

#[test]
fn test_ensure_uv_channel_reuses() {
    let mut m = quad_grid(1);
    m.ensure_uv_channel("UVMap").data[2] = [0.5, 0.25];
    assert_eq!(m.ensure_uv_channel("UVMap").data[2], [0.5, 0.25]);
    assert_eq!(m.uv.len(), 1);
    assert_eq!(m.uv[0].data.len(), 4);
}

#[test]
fn test_edge_index_unordered() {
    let m = quad_grid(1);
    let ei = m.edge_index(1, 0).expect("edge exists");
    assert_eq!(m.e[ei].key(), [0, 1]);
    // quad_grid(1) is the loop [0, 1, 3, 2], so (0, 2) is a side and (0, 3) a diagonal
    assert!(m.edge_index(2, 0).is_some());
    assert_eq!(m.edge_index(0, 3), None);
    assert_eq!(m.edge_index(1, 2), None);
}
