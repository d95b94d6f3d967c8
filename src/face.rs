use crate::{F, add, edges, kmul, minmax};

/// Face representation for meshes.
/// Tris and quads are stack allocated,
/// If you're a madman and store general polygons they're on the heap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceKind<T = usize> {
    Tri([T; 3]),
    Quad([T; 4]),
    Poly(Vec<T>),
}

impl<T> FaceKind<T> {
    pub fn as_slice(&self) -> &[T] {
        use FaceKind::*;
        match self {
            Tri(t) => t.as_slice(),
            Quad(q) => q.as_slice(),
            Poly(v) => v.as_slice(),
        }
    }
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        use FaceKind::*;
        match self {
            Tri(t) => t.as_mut_slice(),
            Quad(q) => q.as_mut_slice(),
            Poly(v) => v.as_mut_slice(),
        }
    }
    /// Number of vertices in this face, which is also its number of loops.
    pub fn len(&self) -> usize {
        use FaceKind::*;
        match self {
            Tri(_) => 3,
            Quad(_) => 4,
            Poly(v) => v.len(),
        }
    }
    /// `true` if there are no vertices in this face.
    pub fn is_empty(&self) -> bool {
        match self {
            FaceKind::Poly(v) => v.is_empty(),
            _ => false,
        }
    }
}

impl FaceKind {
    /// Builds the smallest representation for a loop of vertex indices.
    pub fn from_slice(vis: &[usize]) -> Self {
        match *vis {
            [a, b, c] => FaceKind::Tri([a, b, c]),
            [a, b, c, d] => FaceKind::Quad([a, b, c, d]),
            _ => FaceKind::Poly(vis.to_vec()),
        }
    }

    /// Returns each edge in this face: [vi0, vi1], [vi1, vi2]... [viN, vi0]
    pub fn edges(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        edges(self.as_slice())
    }

    /// Returns each edge in sorted order in this face: minmax(vi0, vi1), minmax(vi1, vi2), ...
    pub fn edges_ord(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.edges().map(|[a, b]| minmax(a, b))
    }

    /// `true` if any vertex appears more than once in this face's loop.
    pub fn has_repeated_vertex(&self) -> bool {
        let s = self.as_slice();
        s.iter()
            .enumerate()
            .any(|(i, v)| s[(i + 1)..].contains(v))
    }

    /// Remaps each vertex in this face.
    pub fn remap(&mut self, mut f: impl FnMut(usize) -> usize) {
        for v in self.as_mut_slice() {
            *v = f(*v);
        }
    }

    /// Average position of this face's vertices.
    pub fn centroid(&self, vs: &[[F; 3]]) -> [F; 3] {
        let s = self.as_slice();
        if s.is_empty() {
            return [0.; 3];
        }
        let sum = s.iter().fold([0.; 3], |acc, &vi| add(acc, vs[vi]));
        kmul((s.len() as F).recip(), sum)
    }
}

#[test]
fn test_from_slice_kinds() {
    assert!(matches!(FaceKind::from_slice(&[0, 1, 2]), FaceKind::Tri(_)));
    assert!(matches!(FaceKind::from_slice(&[0, 1, 2, 3]), FaceKind::Quad(_)));
    assert_eq!(FaceKind::from_slice(&[0, 1, 2, 3, 4]).len(), 5);
    assert!(FaceKind::from_slice(&[]).is_empty());
}

#[test]
fn test_repeated_vertex() {
    assert!(FaceKind::Quad([0, 1, 2, 1]).has_repeated_vertex());
    assert!(!FaceKind::Quad([0, 1, 2, 3]).has_repeated_vertex());
}

#[test]
fn test_centroid() {
    let vs = [[0., 0., 0.], [2., 0., 0.], [2., 2., 0.], [0., 2., 0.]];
    assert_eq!(FaceKind::Quad([0, 1, 2, 3]).centroid(&vs), [1., 1., 0.]);
}
