//! Reapplies captured seams, UVs and materials onto a rebuilt mesh.
//!
//! Seams are matched by endpoint identity. UVs are matched by loop index and materials by face
//! position, both of which only line up when reconstruction skipped nothing before them.
//! Nothing here fails: out of range entries are dropped and missing channels are created.

use crate::snapshot::Snapshot;
use crate::{Mesh, minmax};
use std::collections::HashSet;

/// Counts of what was written and what was dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReattachReport {
    pub seams: usize,
    pub uv_written: usize,
    /// UV samples whose loop index was past the end of the target channel.
    pub uv_dropped: usize,
    pub materials: usize,
}

/// Marks every edge of `mesh` whose endpoints match a captured seam. Returns how many were
/// marked.
pub fn reattach_seams(mesh: &mut Mesh, snapshot: &Snapshot) -> usize {
    let seams = snapshot
        .seams
        .iter()
        .map(|&[a, b]| minmax(a, b))
        .collect::<HashSet<_>>();
    let mut cnt = 0;
    for e in &mut mesh.e {
        if seams.contains(&e.key()) {
            e.seam = true;
            cnt += 1;
        }
    }
    cnt
}

/// Ensures every captured channel exists on `mesh` and writes each sample at its loop index.
/// Returns `(written, dropped)`.
pub fn reattach_uvs(mesh: &mut Mesh, snapshot: &Snapshot) -> (usize, usize) {
    for name in &snapshot.uv_channels {
        mesh.ensure_uv_channel(name);
    }
    let (mut written, mut dropped) = (0, 0);
    for s in &snapshot.uv {
        let Some(name) = snapshot.uv_channels.get(s.channel) else {
            dropped += 1;
            continue;
        };
        let chan = mesh.ensure_uv_channel(name);
        match chan.data.get_mut(s.loop_idx) {
            Some(dst) => {
                *dst = s.uv;
                written += 1;
            }
            None => dropped += 1,
        }
    }
    (written, dropped)
}

/// Copies the captured material of face `i` onto face `i` of `mesh`, for every position both
/// have. Returns how many faces were assigned.
pub fn reattach_materials(mesh: &mut Mesh, snapshot: &Snapshot) -> usize {
    mesh.face_mat.resize(mesh.f.len(), 0);
    let n = mesh.face_mat.len().min(snapshot.faces.len());
    for (dst, src) in mesh.face_mat.iter_mut().zip(&snapshot.faces) {
        *dst = src.material;
    }
    n
}

/// Runs every reattachment step.
pub fn reattach(mesh: &mut Mesh, snapshot: &Snapshot) -> ReattachReport {
    let seams = reattach_seams(mesh, snapshot);
    let (uv_written, uv_dropped) = reattach_uvs(mesh, snapshot);
    let materials = reattach_materials(mesh, snapshot);
    if uv_dropped > 0 {
        tracing::warn!(uv_dropped, "UV samples fell outside the rebuilt loops");
    }
    ReattachReport {
        seams,
        uv_written,
        uv_dropped,
        materials,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;
    use crate::snapshot::UvSample;

    #[test]
    fn test_uv_out_of_bounds_dropped() {
        let mut m = quad_grid(1);
        let s = Snapshot {
            uv_channels: vec!["UVMap".into()],
            uv: vec![
                UvSample {
                    channel: 0,
                    loop_idx: 3,
                    uv: [0.5, 0.5],
                },
                UvSample {
                    channel: 0,
                    loop_idx: 4,
                    uv: [1., 1.],
                },
            ],
            ..Default::default()
        };
        assert_eq!(reattach_uvs(&mut m, &s), (1, 1));
        assert_eq!(m.uv_channel("UVMap").unwrap().data[3], [0.5, 0.5]);
        assert_eq!(m.uv_channel("UVMap").unwrap().data.len(), 4);
    }

    #[test]
    fn test_existing_channel_reused() {
        let mut m = quad_grid(1);
        m.ensure_uv_channel("UVMap").data[0] = [0.75, 0.75];
        let s = Snapshot {
            uv_channels: vec!["UVMap".into()],
            ..Default::default()
        };
        reattach_uvs(&mut m, &s);
        assert_eq!(m.uv.len(), 1);
        assert_eq!(m.uv[0].data[0], [0.75, 0.75]);
    }

    #[test]
    fn test_materials_positional() {
        let mut src = quad_grid(2);
        src.face_mat = vec![3, 1, 4, 1];
        let s = Snapshot::capture(&src);
        let mut dst = quad_grid(2);
        dst.f.truncate(3);
        dst.face_mat.truncate(3);
        assert_eq!(reattach_materials(&mut dst, &s), 3);
        assert_eq!(dst.face_mat, vec![3, 1, 4]);
    }

    #[test]
    fn test_seams_by_endpoints() {
        let mut src = quad_grid(1);
        let ei = src.edge_index(0, 1).unwrap();
        src.e[ei].seam = true;
        let s = Snapshot::capture(&src);
        let mut dst = quad_grid(1);
        // same edge stored the other way around
        dst.e.reverse();
        for e in &mut dst.e {
            e.vs.reverse();
        }
        assert_eq!(reattach_seams(&mut dst, &s), 1);
        let ei = dst.edge_index(1, 0).unwrap();
        assert!(dst.e[ei].seam);
        assert_eq!(dst.e.iter().filter(|e| e.seam).count(), 1);
    }
}
