use super::{F, Mesh, Vec3};
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

#[cfg(not(feature = "f64"))]
type I = i32;
#[cfg(feature = "f64")]
type I = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    Bits([u64; 3]),
    Cell([I; 3]),
}

/// Returns mapping between original vertex coordinate and new vertex coordinate.
/// With `dist == 0.` only bit-identical positions are fused.
pub fn fuse_vertices(vertices: &[Vec3], dist: F) -> Vec<usize> {
    let mut out = (0..vertices.len()).collect::<Vec<_>>();
    if dist < 0. {
        return out;
    }
    let mut spatial_hash = HashMap::new();
    let inv_dist = dist.recip();

    let to_hash = |v: Vec3| {
        if dist == 0. || inv_dist.is_nan() {
            return Key::Bits(v.map(|v| v.to_bits() as u64));
        }
        Key::Cell(v.map(|v| (v * inv_dist) as I))
    };

    for (i, v) in vertices.iter().enumerate() {
        match spatial_hash.entry(to_hash(*v)) {
            Entry::Occupied(o) => {
                out[i] = *o.get();
            }
            Entry::Vacant(v) => {
                v.insert(i);
            }
        }
    }
    out
}

impl Mesh {
    /// Merges vertices closer than `dist` and drops the vertices no longer referenced.
    /// Per-loop data is untouched, so UV seams survive welding. Edges and faces which
    /// collapse are removed. Returns the number of vertices removed.
    pub fn weld(&mut self, dist: F) -> usize {
        let remap = fuse_vertices(&self.v, dist);
        if remap.iter().enumerate().all(|(i, &r)| i == r) {
            return 0;
        }
        // compact
        let mut new_idx = vec![usize::MAX; self.v.len()];
        let mut new_v = vec![];
        for (i, &r) in remap.iter().enumerate() {
            if r == i {
                new_idx[i] = new_v.len();
                new_v.push(self.v[i]);
            }
        }
        let map = |vi: usize| new_idx[remap[vi]];
        let removed = self.v.len() - new_v.len();
        self.v = new_v;

        // collapsed faces are dropped together with their loops
        let starts = self.loop_starts();
        let mut keep_loops = vec![];
        let mut new_f = vec![];
        let mut new_mat = vec![];
        for (fi, f) in self.f.iter().enumerate() {
            let mut nf = f.clone();
            nf.remap(map);
            if nf.has_repeated_vertex() {
                continue;
            }
            keep_loops.extend(starts[fi]..starts[fi] + f.len());
            new_f.push(nf);
            new_mat.push(self.face_mat.get(fi).copied().unwrap_or(0));
        }
        for chan in &mut self.uv {
            chan.data = keep_loops
                .iter()
                .filter_map(|&l| chan.data.get(l).copied())
                .collect();
        }
        self.f = new_f;
        self.face_mat = new_mat;

        let mut seen = HashSet::new();
        let old_e = std::mem::take(&mut self.e);
        for mut e in old_e {
            e.vs = e.vs.map(map);
            if e.vs[0] == e.vs[1] || !seen.insert(e.key()) {
                continue;
            }
            self.e.push(e);
        }
        self.derive_edges();
        removed
    }
}

#[test]
fn test_fuse() {
    let a = [0., 0., 0.];
    let b = [0., 0., 1e-5];
    assert_eq!(fuse_vertices(&[a, b], 0.), vec![0, 1]);
    assert_eq!(fuse_vertices(&[a, b], 1e-4), vec![0, 0]);

    assert_eq!(fuse_vertices(&[a, a], 0.), vec![0, 0]);
    assert_eq!(fuse_vertices(&[a, a], 1e-8), vec![0, 0]);
}

#[test]
fn test_weld_split_quads() {
    use crate::FaceKind;
    // two quads sharing an edge, stored with the shared vertices duplicated
    let v = vec![
        [0., 0., 0.],
        [1., 0., 0.],
        [1., 1., 0.],
        [0., 1., 0.],
        [1., 0., 0.],
        [2., 0., 0.],
        [2., 1., 0.],
        [1., 1., 0.],
    ];
    let f = vec![FaceKind::Quad([0, 1, 2, 3]), FaceKind::Quad([4, 5, 6, 7])];
    let mut m = Mesh::new_geometry(v, f);
    m.ensure_uv_channel("UVMap").data[4] = [0.5, 0.5];
    assert_eq!(m.e.len(), 8);
    assert_eq!(m.weld(0.), 2);
    assert_eq!(m.v.len(), 6);
    assert_eq!(m.f[1], FaceKind::Quad([1, 4, 5, 2]));
    assert_eq!(m.e.len(), 7);
    assert_eq!(m.uv[0].data[4], [0.5, 0.5]);
    assert!(m.is_valid());
}
