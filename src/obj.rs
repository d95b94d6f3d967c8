use super::mesh::DEFAULT_UV_NAME;
use super::{F, FaceKind, Mesh};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Parses an OBJ file at `p` into a single mesh.
pub fn parse(p: impl AsRef<Path>) -> io::Result<Mesh> {
    let f = File::open(p.as_ref())?;
    parse_from(BufReader::new(f))
}

fn invalid(i: usize, l: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("Malformed OBJ line {i}: {l}"))
}

fn floats<'a>(it: impl Iterator<Item = &'a str>, i: usize, l: &str) -> io::Result<Vec<F>> {
    it.map(|v| v.parse::<F>().map_err(|_| invalid(i, l)))
        .collect()
}

/// Resolves a 1-based (or negative, relative) OBJ index against `len` elements.
fn resolve(idx: &str, len: usize) -> Option<usize> {
    let idx = idx.parse::<isize>().ok()?;
    match idx {
        0 => None,
        i if i > 0 => Some(i as usize - 1),
        i => len.checked_sub(i.unsigned_abs()),
    }
}

/// Parses OBJ text. All objects and groups are merged into one mesh. Texture coordinates
/// become per-loop data in a channel named [`DEFAULT_UV_NAME`], and `usemtl` assigns material
/// slots to the faces that follow it. Normals and smoothing groups are ignored.
pub fn parse_from(buf_read: impl BufRead) -> io::Result<Mesh> {
    let mut mesh = Mesh::default();
    let mut vt = vec![];
    let mut loop_uvs: Vec<[F; 2]> = vec![];
    let mut any_uv = false;
    let mut curr_mat = 0;

    for (i, l) in buf_read.lines().enumerate() {
        let l = l?;
        let mut iter = l.split_whitespace();
        let Some(kind) = iter.next() else { continue };
        match kind {
            // comment
            ht if ht.starts_with('#') => continue,
            "v" => match floats(&mut iter, i, &l)?.as_slice() {
                &[x, y, z, ..] => mesh.v.push([x, y, z]),
                _ => return Err(invalid(i, &l)),
            },
            "vt" => match floats(&mut iter, i, &l)?.as_slice() {
                &[u, v, ..] => vt.push([u, v]),
                _ => return Err(invalid(i, &l)),
            },
            "f" => {
                let mut vis = vec![];
                let mut uvs = vec![];
                for corner in iter {
                    let mut parts = corner.split('/');
                    let vi = parts
                        .next()
                        .and_then(|v| resolve(v, mesh.v.len()))
                        .filter(|&vi| vi < mesh.v.len())
                        .ok_or_else(|| invalid(i, &l))?;
                    let uv = parts
                        .next()
                        .filter(|t| !t.is_empty())
                        .and_then(|t| resolve(t, vt.len()))
                        .and_then(|ti| vt.get(ti).copied());
                    any_uv |= uv.is_some();
                    vis.push(vi);
                    uvs.push(uv.unwrap_or([0.; 2]));
                }
                if vis.len() < 3 {
                    tracing::warn!(line = i, "face with fewer than 3 vertices, ignoring");
                    continue;
                }
                mesh.f.push(FaceKind::from_slice(&vis));
                mesh.face_mat.push(curr_mat);
                loop_uvs.extend(uvs);
            }
            "usemtl" => {
                let name = l.trim_start()[kind.len()..].trim();
                curr_mat = mesh.material_slot(name);
            }
            "mtllib" | "o" | "g" | "s" | "vn" | "l" => {}
            k => tracing::warn!(line = i, kind = k, "unknown OBJ element"),
        }
    }

    if any_uv {
        mesh.uv.push(crate::mesh::UvChannel {
            name: String::from(DEFAULT_UV_NAME),
            data: loop_uvs,
        });
    }
    mesh.derive_edges();
    Ok(mesh)
}

/// Writes `mesh` as OBJ. The first UV channel is written with one `vt` per loop.
///
/// Every material slot is declared up front with a bare `usemtl` in slot order, so
/// [`parse_from`] gives the slots back with the same indices, unused ones included. Faces
/// pointing past the last slot are written as `mat_N` and come back as a new slot.
pub fn write(mesh: &Mesh, mut dst: impl Write) -> io::Result<()> {
    for name in &mesh.materials {
        writeln!(dst, "usemtl {name}")?;
    }
    for [x, y, z] in &mesh.v {
        writeln!(dst, "v {x} {y} {z}")?;
    }
    let uv = mesh.uv.first().filter(|c| c.data.len() == mesh.num_loops());
    if let Some(uv) = uv {
        for [u, v] in &uv.data {
            writeln!(dst, "vt {u} {v}")?;
        }
    }

    let mut curr_mat = None;
    let mut loop_idx = 0;
    for (fi, f) in mesh.f.iter().enumerate() {
        let mat = mesh.face_mat.get(fi).copied().unwrap_or(0);
        if !mesh.materials.is_empty() && curr_mat != Some(mat) {
            let name = mesh
                .materials
                .get(mat)
                .cloned()
                .unwrap_or_else(|| format!("mat_{mat}"));
            writeln!(dst, "usemtl {name}")?;
            curr_mat = Some(mat);
        }

        dst.write_all(b"f")?;
        for &vi in f.as_slice() {
            let v = vi + 1;
            loop_idx += 1;
            if uv.is_some() {
                write!(dst, " {v}/{loop_idx}")?;
            } else {
                write!(dst, " {v}")?;
            }
        }
        dst.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUADS: &str = "\
# two quads
v 0 0 0
v 1 0 0
v 2 0 0
v 0 1 0
v 1 1 0
v 2 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl red
f 1/1 2/2 5/3 4/4
usemtl blue
f 2/1 3/2 6/3 -2/4
";

    #[test]
    fn test_parse_quads() {
        let m = parse_from(QUADS.as_bytes()).expect("parses");
        assert_eq!(m.v.len(), 6);
        assert_eq!(m.f, vec![FaceKind::Quad([0, 1, 4, 3]), FaceKind::Quad([1, 2, 5, 4])]);
        assert_eq!(m.materials, vec!["red", "blue"]);
        assert_eq!(m.face_mat, vec![0, 1]);
        assert_eq!(m.e.len(), 7);
        let uv = m.uv_channel(DEFAULT_UV_NAME).expect("uv channel");
        assert_eq!(uv.data.len(), 8);
        assert_eq!(uv.data[6], [1., 1.]);
        assert!(m.is_valid());
    }

    #[test]
    fn test_write_then_parse() {
        let m = parse_from(QUADS.as_bytes()).expect("parses");
        let mut out = vec![];
        write(&m, &mut out).expect("writes");
        let back = parse_from(out.as_slice()).expect("parses again");
        assert_eq!(back.f, m.f);
        assert_eq!(back.face_mat, m.face_mat);
        assert_eq!(back.uv, m.uv);
    }

    #[test]
    fn test_material_slots_keep_indices() {
        let mut m = parse_from(QUADS.as_bytes()).expect("parses");
        m.materials = vec!["unused".into(), "blue".into(), "red".into()];
        m.face_mat = vec![2, 1];
        let mut out = vec![];
        write(&m, &mut out).expect("writes");
        let back = parse_from(out.as_slice()).expect("parses again");
        assert_eq!(back.materials, m.materials);
        assert_eq!(back.face_mat, vec![2, 1]);
    }

    #[test]
    fn test_bad_index_is_error() {
        let err = parse_from("v 0 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
