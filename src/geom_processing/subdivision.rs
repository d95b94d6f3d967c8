use crate::edge::EdgeKind;
use crate::{F, FaceKind, add, kmul, minmax};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::edge_kinds;

/// One level of Catmull-Clark subdivision over arbitrary polygons.
///
/// The output vertices are ordered as: the `vs.len()` smoothed input vertices in input
/// order, then one point per unique edge in first-seen order, then one point per face.
/// Each k-gon becomes k quads. Faces with fewer than 3 vertices are dropped.
///
/// Boundary vertices with exactly two boundary neighbours follow the boundary curve rule,
/// corners included. Non-manifold edges are treated as boundaries.
pub fn catmull_clark(vs: &[[F; 3]], fs: &[FaceKind]) -> (Vec<[F; 3]>, Vec<FaceKind>) {
    let nv = vs.len();
    let fs = fs.iter().filter(|f| f.len() >= 3).collect::<Vec<_>>();

    let face_points = fs.iter().map(|f| f.centroid(vs)).collect::<Vec<_>>();

    let kinds = edge_kinds(fs.iter().copied());
    let mut edge_ids: HashMap<[usize; 2], usize> = HashMap::new();
    let mut edge_list: Vec<([usize; 2], &EdgeKind)> = vec![];
    for f in &fs {
        for e in f.edges_ord() {
            if let Entry::Vacant(v) = edge_ids.entry(e) {
                v.insert(edge_list.len());
                edge_list.push((e, &kinds[&e]));
            }
        }
    }

    let mid = |[a, b]: [usize; 2]| kmul(0.5, add(vs[a], vs[b]));

    let edge_points = edge_list
        .iter()
        .map(|&(e, ek)| match *ek {
            EdgeKind::Manifold([f0, f1]) => {
                let s = add(add(vs[e[0]], vs[e[1]]), add(face_points[f0], face_points[f1]));
                kmul(0.25, s)
            }
            _ => mid(e),
        })
        .collect::<Vec<_>>();

    // per vertex: sum of adjacent face points & count, sum of edge midpoints & count.
    let mut face_sum = vec![([0.; 3], 0usize); nv];
    for (fi, f) in fs.iter().enumerate() {
        for &vi in f.as_slice() {
            let (s, n) = &mut face_sum[vi];
            *s = add(*s, face_points[fi]);
            *n += 1;
        }
    }
    let mut edge_sum = vec![([0.; 3], 0usize); nv];
    let mut boundary_nbrs = vec![vec![]; nv];
    for (e, ek) in &edge_list {
        let [a, b] = *e;
        let m = mid(*e);
        for vi in [a, b] {
            let (s, n) = &mut edge_sum[vi];
            *s = add(*s, m);
            *n += 1;
        }
        if !ek.is_manifold() {
            boundary_nbrs[a].push(b);
            boundary_nbrs[b].push(a);
        }
    }

    let mut out_vs = Vec::with_capacity(nv + edge_points.len() + face_points.len());
    for (vi, &p) in vs.iter().enumerate() {
        let (fsum, nf) = face_sum[vi];
        let (esum, ne) = edge_sum[vi];
        let new_p = match boundary_nbrs[vi].as_slice() {
            _ if nf == 0 || ne == 0 => p,
            &[n0, n1] => add(kmul(0.75, p), kmul(0.125, add(vs[n0], vs[n1]))),
            [_, ..] => p,
            [] => {
                let n = ne as F;
                let q = kmul((nf as F).recip(), fsum);
                let r = kmul(n.recip(), esum);
                kmul(n.recip(), add(add(q, kmul(2., r)), kmul(n - 3., p)))
            }
        };
        out_vs.push(new_p);
    }
    out_vs.extend(edge_points);
    let face_point_start = out_vs.len();
    out_vs.extend(face_points);

    let edge_vi = |a: usize, b: usize| nv + edge_ids[&minmax(a, b)];
    let mut out_fs = Vec::with_capacity(fs.iter().map(|f| f.len()).sum());
    for (fi, f) in fs.iter().enumerate() {
        let s = f.as_slice();
        let k = s.len();
        for i in 0..k {
            let prev = s[(i + k - 1) % k];
            let curr = s[i];
            let next = s[(i + 1) % k];
            out_fs.push(FaceKind::Quad([
                curr,
                edge_vi(curr, next),
                face_point_start + fi,
                edge_vi(prev, curr),
            ]));
        }
    }

    (out_vs, out_fs)
}

/// Applies `levels` rounds of [`catmull_clark`]. The first `vs.len()` output vertices still
/// correspond to the input vertices in order.
pub fn catmull_clark_levels(
    vs: &[[F; 3]],
    fs: &[FaceKind],
    levels: u32,
) -> (Vec<[F; 3]>, Vec<FaceKind>) {
    let mut curr = (vs.to_vec(), fs.to_vec());
    for _ in 0..levels {
        curr = catmull_clark(&curr.0, &curr.1);
    }
    curr
}

#[cfg(test)]
fn approx_eq<const N: usize>(a: [F; N], b: [F; N]) -> bool {
    crate::dist(a, b) < 1e-5
}

#[test]
fn test_single_quad_counts() {
    let vs = [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]];
    let (new_v, new_f) = catmull_clark(&vs, &[FaceKind::Quad([0, 1, 2, 3])]);
    assert_eq!(new_v.len(), 4 + 4 + 1);
    assert_eq!(new_f.len(), 4);
    // corners pulled towards their two boundary neighbours
    assert!(approx_eq(new_v[0], [0.125, 0.125, 0.]));
    assert!(approx_eq(new_v[8], [0.5, 0.5, 0.]));
}

#[test]
fn test_cube_vertex_rule() {
    let vs = [
        [-1., -1., -1.],
        [1., -1., -1.],
        [1., 1., -1.],
        [-1., 1., -1.],
        [-1., -1., 1.],
        [1., -1., 1.],
        [1., 1., 1.],
        [-1., 1., 1.],
    ];
    let fs = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
    ]
    .map(FaceKind::Quad);
    let (new_v, new_f) = catmull_clark(&vs, &fs);
    assert_eq!(new_v.len(), 8 + 12 + 6);
    assert_eq!(new_f.len(), 24);
    let k = 5. / 9.;
    assert!(approx_eq(new_v[6], [k, k, k]));
    assert!(approx_eq(new_v[0], [-k, -k, -k]));
}

#[test]
fn test_levels_preserve_prefix_count() {
    let vs = [[0., 0., 0.], [1., 0., 0.], [0., 1., 0.]];
    let (v1, f1) = catmull_clark_levels(&vs, &[FaceKind::Tri([0, 1, 2])], 2);
    // 3 + 3 + 1 = 7 vertices and 3 quads, then 7 + 9 + 3
    assert_eq!(v1.len(), 19);
    assert_eq!(f1.len(), 12);
}

#[test]
fn test_degenerate_faces_dropped() {
    let vs = [[0., 0., 0.], [1., 0., 0.]];
    let (new_v, new_f) = catmull_clark(&vs, &[FaceKind::Poly(vec![0, 1])]);
    assert_eq!(new_v, vs.to_vec());
    assert!(new_f.is_empty());
}

#[test]
fn test_non_manifold_edge_is_boundary() {
    // three fins sharing the edge 0-1
    let vs = [
        [0., 0., 0.],
        [1., 0., 0.],
        [0.5, 1., 0.],
        [0.5, -1., 0.],
        [0.5, 0., 1.],
    ];
    let fs = [
        FaceKind::Tri([0, 1, 2]),
        FaceKind::Tri([1, 0, 3]),
        FaceKind::Tri([0, 1, 4]),
    ];
    let (new_v, new_f) = catmull_clark(&vs, &fs);
    assert_eq!(new_f.len(), 9);
    // shared edge is seen first, its point is the plain midpoint
    assert!(approx_eq(new_v[5], [0.5, 0., 0.]));
    // 0 has boundary neighbours 1, 2, 3 and 4, so it stays put
    assert!(approx_eq(new_v[0], vs[0]));
}
