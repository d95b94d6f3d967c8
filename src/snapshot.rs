//! Capture of a mesh's topology and attributes, taken before smoothing so they can be
//! restored onto a mesh with the same structure afterwards.

use crate::{F, Mesh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedEdge {
    pub vs: [usize; 2],
    pub sharp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFace {
    /// Vertex loop, in the face's winding order.
    pub verts: Vec<usize>,
    pub material: usize,
}

/// One UV coordinate at one loop of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvSample {
    /// Index into [`Snapshot::uv_channels`].
    pub channel: usize,
    /// Loop index in the captured mesh.
    pub loop_idx: usize,
    pub uv: [F; 2],
}

/// Everything about a mesh at one point in time that smoothing must not lose.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    pub num_v: usize,
    pub v: Vec<[F; 3]>,
    pub edges: Vec<CapturedEdge>,
    /// Endpoints of each seam edge, as stored on the edge.
    pub seams: Vec<[usize; 2]>,
    pub faces: Vec<CapturedFace>,
    pub uv_channels: Vec<String>,
    pub uv: Vec<UvSample>,
}

impl Snapshot {
    /// Reads everything out of `mesh` without modifying it.
    pub fn capture(mesh: &Mesh) -> Self {
        let edges = mesh
            .e
            .iter()
            .map(|e| CapturedEdge {
                vs: e.vs,
                sharp: e.sharp,
            })
            .collect();
        let seams = mesh.e.iter().filter(|e| e.seam).map(|e| e.vs).collect();
        let faces = mesh
            .f
            .iter()
            .enumerate()
            .map(|(fi, f)| CapturedFace {
                verts: f.as_slice().to_vec(),
                material: mesh.face_mat.get(fi).copied().unwrap_or(0),
            })
            .collect();

        let uv_channels = mesh.uv.iter().map(|c| c.name.clone()).collect();
        let uv = mesh
            .uv
            .iter()
            .enumerate()
            .flat_map(|(channel, c)| {
                c.data
                    .iter()
                    .enumerate()
                    .map(move |(loop_idx, &uv)| UvSample {
                        channel,
                        loop_idx,
                        uv,
                    })
            })
            .collect();

        Self {
            num_v: mesh.v.len(),
            v: mesh.v.clone(),
            edges,
            seams,
            faces,
            uv_channels,
            uv,
        }
    }

    /// Total loops across all captured faces.
    pub fn num_loops(&self) -> usize {
        self.faces.iter().map(|f| f.verts.len()).sum()
    }

    /// Compares two snapshots bit for bit, so `-0.0` and `0.0` differ and NaNs are equal to
    /// themselves.
    pub fn bit_eq(&self, o: &Self) -> bool {
        let pos_eq = |a: &[F], b: &[F]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        };
        self.num_v == o.num_v
            && self.v.len() == o.v.len()
            && self.v.iter().zip(&o.v).all(|(a, b)| pos_eq(a.as_slice(), b.as_slice()))
            && self.edges == o.edges
            && self.seams == o.seams
            && self.faces == o.faces
            && self.uv_channels == o.uv_channels
            && self.uv.len() == o.uv.len()
            && self.uv.iter().zip(&o.uv).all(|(a, b)| {
                a.channel == b.channel
                    && a.loop_idx == b.loop_idx
                    && pos_eq(a.uv.as_slice(), b.uv.as_slice())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;

    #[test]
    fn test_capture_counts() {
        let mut m = quad_grid(2);
        m.e[0].sharp = true;
        m.e[3].seam = true;
        m.face_mat[1] = 2;
        m.ensure_uv_channel("UVMap");
        m.ensure_uv_channel("Lightmap");
        let s = Snapshot::capture(&m);
        assert_eq!(s.num_v, 9);
        assert_eq!(s.edges.len(), m.e.len());
        assert!(s.edges[0].sharp);
        assert_eq!(s.seams, vec![m.e[3].vs]);
        assert_eq!(s.faces[1].material, 2);
        assert_eq!(s.faces[0].verts, vec![0, 1, 4, 3]);
        assert_eq!(s.uv_channels, vec!["UVMap", "Lightmap"]);
        assert_eq!(s.uv.len(), 2 * 16);
        assert_eq!(s.num_loops(), 16);
    }

    #[test]
    fn test_capture_does_not_mutate() {
        let m = quad_grid(3);
        let before = m.clone();
        let _ = Snapshot::capture(&m);
        assert_eq!(m, before);
    }

    #[test]
    fn test_capture_idempotent() {
        let mut m = quad_grid(3);
        m.ensure_uv_channel("UVMap").data[5] = [0.25, -0.0];
        let a = Snapshot::capture(&m);
        let b = Snapshot::capture(&m);
        assert!(a.bit_eq(&b));

        let mut c = b.clone();
        c.uv[5].uv[1] = 0.;
        assert!(!a.bit_eq(&c));
    }
}
