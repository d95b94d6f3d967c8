use std::path::Path;

/// File formats supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// GLTF Binary or JSON Format (.glb, .gltf), read only
    GLB,
    /// OBJ Format (.obj), mtl not included
    OBJ,

    /// Other unsupported file formats
    Unknown,
}

/// Given something that looks like a path parse it into a FileFormat.
pub fn extension_to_format(s: impl AsRef<Path>) -> FileFormat {
    let s = s.as_ref();
    let Some(e) = s.extension() else {
        return FileFormat::Unknown;
    };
    let Some(e) = e.to_str() else {
        return FileFormat::Unknown;
    };

    let matches = [
        ("glb", FileFormat::GLB),
        ("gltf", FileFormat::GLB),
        ("obj", FileFormat::OBJ),
    ];
    for (ext, fmt) in matches {
        if ext.eq_ignore_ascii_case(e) {
            return fmt;
        }
    }
    FileFormat::Unknown
}

#[test]
fn test_extension_to_format() {
    assert_eq!(extension_to_format("a/b/mesh.OBJ"), FileFormat::OBJ);
    assert_eq!(extension_to_format("scene.gltf"), FileFormat::GLB);
    assert_eq!(extension_to_format("model.fbx"), FileFormat::Unknown);
    assert_eq!(extension_to_format("no_ext"), FileFormat::Unknown);
}
