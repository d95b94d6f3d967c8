#[cfg(not(feature = "f64"))]
pub type F = f32;

#[cfg(feature = "f64")]
pub type F = f64;

use std::path::Path;

/// Alias for array of floats.
pub type Vector<const N: usize, T = F> = [T; N];

pub type Vec3 = Vector<3>;
pub type Vec2 = Vector<2>;

/// Error types for the smoothing operator.
pub mod error;
pub use error::{Result, SmoothError};

/// Face representations
pub mod face;
pub use face::FaceKind;

/// Edge representations
pub mod edge;

/// Editable mesh data block with edge flags, materials and UV channels.
pub mod mesh;
pub use mesh::Mesh;

/// Scene objects, interaction modes and the modifier evaluation seam.
pub mod object;
pub use object::{Context, Evaluate, ModifierStack, Object, ObjectData};

/// Geometry kernels.
pub mod geom_processing;

/// Capture of topology and attributes before smoothing.
pub mod snapshot;
pub use snapshot::Snapshot;

/// Evaluation of smoothed positions on a throwaway duplicate.
pub mod evaluate;

/// Rebuilding a mesh from captured topology and new positions.
pub mod reconstruct;

/// Reapplying captured attributes onto a rebuilt mesh.
pub mod reattach;

/// The smooth-and-clean operator.
pub mod operator;
pub use operator::{SmoothMode, SmoothOperator, SmoothOptions};

/// Operator registration and the sidebar panel.
pub mod ui;

/// Merging coincident vertices.
pub mod fuse;

/// OBJ parsing
pub mod obj;

/// Load GLTF meshes.
#[cfg(feature = "gltf")]
pub mod gltf;

pub mod util;

/// Loads a single mesh from a file, dispatching on its extension.
pub fn load(p: impl AsRef<Path>) -> std::io::Result<Mesh> {
    use util::FileFormat::*;
    match util::extension_to_format(&p) {
        OBJ => obj::parse(p),
        #[cfg(feature = "gltf")]
        GLB => gltf::load(p),
        #[cfg(not(feature = "gltf"))]
        GLB => Err(std::io::Error::other("Not compiled with GLTF support")),
        Unknown => Err(std::io::Error::other("Don't know how to load")),
    }
}

/// Saves a mesh to a file. Only OBJ output is supported.
pub fn save(p: impl AsRef<Path>, mesh: &Mesh) -> std::io::Result<()> {
    use util::FileFormat::*;
    match util::extension_to_format(&p) {
        OBJ => {
            let f = std::fs::File::create(p)?;
            let buf = std::io::BufWriter::new(f);
            obj::write(mesh, buf)
        }
        GLB | Unknown => Err(std::io::Error::other("Don't know how to save")),
    }
}

pub(crate) fn kmul<const N: usize>(k: F, v: [F; N]) -> [F; N] {
    v.map(|v| v * k)
}

pub(crate) fn add<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    std::array::from_fn(|i| a[i] + b[i])
}

pub(crate) fn sub<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    std::array::from_fn(|i| a[i] - b[i])
}

pub fn length<const N: usize>(v: [F; N]) -> F {
    v.iter().map(|v| v * v).sum::<F>().max(0.).sqrt()
}

/// Euclidean distance between two points.
pub fn dist<const N: usize>(a: [F; N], b: [F; N]) -> F {
    length(sub(a, b))
}

/// Returns `[min, max]` of two values, used as a key for unordered edges.
#[inline]
pub fn minmax<T: Ord>(a: T, b: T) -> [T; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

pub fn edges(vis: &[usize]) -> impl Iterator<Item = [usize; 2]> + '_ {
    (0..vis.len()).map(|vi| [vis[vi], vis[(vi + 1) % vis.len()]])
}

#[test]
fn test_edges_wrap() {
    let es = edges(&[3, 4, 5]).collect::<Vec<_>>();
    assert_eq!(es, vec![[3, 4], [4, 5], [5, 3]]);
    assert_eq!(minmax(5, 3), [3, 5]);
}

#[test]
fn test_dist() {
    assert_eq!(dist([0., 0., 0.], [3., 4., 0.]), 5.);
}
