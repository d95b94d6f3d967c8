use super::FaceKind;
use super::edge::EdgeKind;
use std::collections::BTreeMap;

/// Subdivision
pub mod subdivision;

/// For a given set of faces, computes an adjacency map between them.
pub fn edge_kinds<'a>(
    fs: impl IntoIterator<Item = &'a FaceKind>,
) -> BTreeMap<[usize; 2], EdgeKind> {
    let mut edges: BTreeMap<[usize; 2], EdgeKind> = BTreeMap::new();
    for (fi, f) in fs.into_iter().enumerate() {
        for e in f.edges_ord() {
            edges
                .entry(e)
                .and_modify(|ek| {
                    ek.insert(fi);
                })
                .or_insert_with(|| EdgeKind::Boundary(fi));
        }
    }
    edges
}

#[test]
fn test_edge_kinds_two_quads() {
    let fs = [
        FaceKind::Quad([0, 1, 4, 3]),
        FaceKind::Quad([1, 2, 5, 4]),
        FaceKind::Tri([1, 4, 9]),
    ];
    let ek = edge_kinds(&fs);
    assert_eq!(ek.len(), 9);
    assert!(ek[&[0, 1]].is_boundary());
    assert_eq!(ek[&[1, 2]], EdgeKind::Boundary(1));
    assert_eq!(ek[&[1, 4]], EdgeKind::NonManifold(vec![0, 1, 2]));
    assert_eq!(ek.values().filter(|k| k.is_boundary()).count(), 8);
}
