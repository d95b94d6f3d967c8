use crate::minmax;

/// Description of an edge and its adjacent faces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind<T = usize> {
    Boundary(T),
    Manifold([T; 2]),
    NonManifold(Vec<T>),
}

impl<T> EdgeKind<T> {
    pub fn is_boundary(&self) -> bool {
        matches!(self, EdgeKind::Boundary(_))
    }
    pub fn is_non_manifold(&self) -> bool {
        matches!(self, EdgeKind::NonManifold(_))
    }
    pub fn is_manifold(&self) -> bool {
        matches!(self, EdgeKind::Manifold(_))
    }
}

impl EdgeKind {
    /// Adds face `v` to this edge. Returns false if it was already present.
    pub fn insert(&mut self, v: usize) -> bool {
        let new = match self {
            &mut EdgeKind::Boundary(f) if f != v => EdgeKind::Manifold(minmax(f, v)),
            &mut EdgeKind::Manifold([f0, f1]) if f0 != v && f1 != v => {
                EdgeKind::NonManifold(vec![f0, f1, v])
            }
            EdgeKind::NonManifold(fs) if !fs.contains(&v) => {
                fs.push(v);
                return true;
            }
            _ => return false,
        };
        *self = new;
        true
    }
}

#[test]
fn test_edge_kind_insert() {
    let mut ek = EdgeKind::Boundary(4);
    assert!(ek.is_boundary());
    assert!(!ek.insert(4));
    assert!(ek.insert(1));
    assert_eq!(ek, EdgeKind::Manifold([1, 4]));
    assert!(ek.insert(7));
    assert!(ek.is_non_manifold());
    assert!(!ek.insert(7));
    assert_eq!(ek, EdgeKind::NonManifold(vec![1, 4, 7]));
}
