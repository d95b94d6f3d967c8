use super::mesh::{DEFAULT_UV_NAME, UvChannel};
use super::{F, FaceKind, Mesh};
use std::io;
use std::path::Path;

type Mat4 = [[f32; 4]; 4];

fn identity() -> Mat4 {
    std::array::from_fn(|i| std::array::from_fn(|j| if i == j { 1. } else { 0. }))
}

/// Column-major product `a * b`.
fn matmul(a: Mat4, b: Mat4) -> Mat4 {
    std::array::from_fn(|c| std::array::from_fn(|r| (0..4).map(|k| a[k][r] * b[c][k]).sum()))
}

fn transform_point(m: &Mat4, [x, y, z]: [f32; 3]) -> [F; 3] {
    std::array::from_fn(|r| (m[0][r] * x + m[1][r] * y + m[2][r] * z + m[3][r]) as F)
}

/// Name of the `i`th UV channel of an imported mesh.
pub fn uv_channel_name(i: usize) -> String {
    if i == 0 {
        String::from(DEFAULT_UV_NAME)
    } else {
        format!("{DEFAULT_UV_NAME}.{i:03}")
    }
}

/// Appends one triangle primitive. `uv_sets` holds per-vertex coordinates for each texture
/// coordinate set, which become per-loop data. Triangles indexing out of range are skipped.
pub fn append_triangles(
    mesh: &mut Mesh,
    positions: &[[F; 3]],
    indices: &[usize],
    uv_sets: &[Vec<[F; 2]>],
    material: usize,
) {
    let offset = mesh.v.len();
    let prev_loops = mesh.num_loops();
    mesh.v.extend_from_slice(positions);

    while mesh.uv.len() < uv_sets.len() {
        let name = uv_channel_name(mesh.uv.len());
        mesh.uv.push(UvChannel {
            name,
            data: vec![[0.; 2]; prev_loops],
        });
    }

    for tri in indices.chunks_exact(3) {
        if tri.iter().any(|&vi| vi >= positions.len()) {
            tracing::warn!(?tri, "triangle index out of range, skipping");
            continue;
        }
        mesh.f.push(FaceKind::Tri([tri[0], tri[1], tri[2]].map(|vi| vi + offset)));
        mesh.face_mat.push(material);
        for (ci, chan) in mesh.uv.iter_mut().enumerate() {
            let set = uv_sets.get(ci);
            chan.data.extend(
                tri.iter()
                    .map(|&vi| set.and_then(|s| s.get(vi)).copied().unwrap_or([0.; 2])),
            );
        }
    }
}

/// Loads every triangle primitive of the default scene of a GLTF/GLB file into one mesh, with
/// node transforms applied. Vertices at identical positions are welded, so the per-vertex
/// splits GLTF uses for UV seams don't cut the surface apart.
pub fn load(p: impl AsRef<Path>) -> io::Result<Mesh> {
    let (doc, buffers, _images) = gltf::import(p).map_err(io::Error::other)?;

    fn traverse_node(
        buffers: &[gltf::buffer::Data],
        node: &gltf::scene::Node,
        parent: Mat4,
        out: &mut Mesh,
    ) {
        let tform = matmul(parent, node.transform().matrix());
        if let Some(m) = node.mesh() {
            for p in m.primitives() {
                if p.mode() != gltf::mesh::Mode::Triangles {
                    tracing::warn!(mode = ?p.mode(), "skipping non-triangle primitive");
                    continue;
                }
                let reader = p.reader(|buffer: gltf::Buffer| {
                    buffers.get(buffer.index()).map(|data| &data[..])
                });
                let ps = reader
                    .read_positions()
                    .into_iter()
                    .flatten()
                    .map(|p| transform_point(&tform, p))
                    .collect::<Vec<_>>();
                let idxs = match reader.read_indices() {
                    Some(idxs) => idxs.into_u32().map(|i| i as usize).collect::<Vec<_>>(),
                    None => (0..ps.len()).collect(),
                };
                let uv_sets = (0..)
                    .map_while(|set| reader.read_tex_coords(set))
                    .map(|uvs| {
                        uvs.into_f32()
                            .map(|[u, v]| [u as F, 1. - v as F])
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>();

                let mat = p.material();
                let mat_name = match (mat.name(), mat.index()) {
                    (Some(name), _) => name.to_string(),
                    (None, Some(idx)) => format!("mat_{idx}"),
                    (None, None) => String::from("default"),
                };
                let slot = out.material_slot(&mat_name);
                append_triangles(out, &ps, &idxs, &uv_sets, slot);
            }
        }
        for child in node.children() {
            traverse_node(buffers, &child, tform, out);
        }
    }

    let mut out = Mesh::default();
    let Some(scene) = doc.default_scene().or_else(|| doc.scenes().next()) else {
        return Ok(out);
    };
    for root_node in scene.nodes() {
        traverse_node(&buffers, &root_node, identity(), &mut out);
    }
    out.derive_edges();
    let welded = out.weld(0.);
    tracing::debug!(welded, v = out.v.len(), f = out.f.len(), "loaded GLTF");
    Ok(out)
}

#[test]
fn test_append_triangles() {
    let mut m = Mesh::default();
    let ps = [[0., 0., 0.], [1., 0., 0.], [1., 1., 0.], [0., 1., 0.]];
    let uvs = vec![vec![[0., 0.], [1., 0.], [1., 1.], [0., 1.]]];
    append_triangles(&mut m, &ps, &[0, 1, 2, 0, 2, 3], &uvs, 0);
    // second primitive without texture coordinates
    append_triangles(&mut m, &ps, &[0, 1, 2, 0, 9, 3], &[], 1);
    m.derive_edges();

    assert_eq!(m.v.len(), 8);
    assert_eq!(m.f.len(), 3);
    assert_eq!(m.f[2], FaceKind::Tri([4, 5, 6]));
    assert_eq!(m.face_mat, vec![0, 0, 1]);
    assert_eq!(m.uv[0].name, "UVMap");
    assert_eq!(m.uv[0].data[5], [0., 1.]);
    assert!(m.is_valid());

    assert_eq!(m.weld(0.), 4);
    assert_eq!(m.f[2], FaceKind::Tri([0, 1, 2]));
    assert!(m.is_valid());
}

#[test]
fn test_uv_channel_names() {
    assert_eq!(uv_channel_name(0), "UVMap");
    assert_eq!(uv_channel_name(2), "UVMap.002");
}

#[test]
fn test_matmul_identity() {
    let mut t = identity();
    t[3] = [1., 2., 3., 1.];
    assert_eq!(matmul(identity(), t), t);
    assert_eq!(transform_point(&t, [1., 1., 1.]), [2., 3., 4.]);
}
