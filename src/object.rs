//! Scene objects and the parts of the host that the smoothing operator touches:
//! interaction modes, modifier stacks and evaluation.

use crate::Mesh;
use crate::geom_processing::subdivision::catmull_clark_levels;

/// Stable handle for an object in a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Interaction mode of an object.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Object,
    Edit,
    Sculpt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Mesh(Mesh),
    Curve,
    Empty,
}

impl ObjectData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectData::Mesh(_) => "mesh",
            ObjectData::Curve => "curve",
            ObjectData::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Catmull-Clark subdivision surface.
    Subsurf { levels: u32, render_levels: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub data: ObjectData,
    pub modifiers: Vec<Modifier>,

    mode: Mode,
    /// Working copy of the mesh while in edit mode, flushed back on leaving it.
    edit_mesh: Option<Mesh>,
}

impl Object {
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            id: ObjectId(0),
            name: name.into(),
            data,
            modifiers: vec![],
            mode: Mode::Object,
            edit_mesh: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }
    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }

    /// The mesh being edited while in edit mode.
    pub fn edit_mesh_mut(&mut self) -> Option<&mut Mesh> {
        self.edit_mesh.as_mut()
    }

    /// Switches interaction mode. Entering edit mode on a mesh takes a working copy of its
    /// data; leaving edit mode writes that copy back.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        if let Some(edited) = self.edit_mesh.take()
            && let ObjectData::Mesh(m) = &mut self.data
        {
            *m = edited;
        }
        if mode == Mode::Edit {
            self.edit_mesh = self.mesh().cloned();
        }
        tracing::trace!(object = %self.name, from = ?self.mode, to = ?mode, "mode switch");
        self.mode = mode;
    }
}

/// The scene an operator runs in: every object and which one is active.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Context {
    pub objects: Vec<Object>,
    pub active: Option<ObjectId>,
    next_id: u32,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to the scene, assigning it a fresh id.
    pub fn link(&mut self, mut obj: Object) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        obj.id = id;
        self.objects.push(obj);
        id
    }

    /// Adds an object and makes it active.
    pub fn link_active(&mut self, obj: Object) -> ObjectId {
        let id = self.link(obj);
        self.active = Some(id);
        id
    }

    /// Removes an object from the scene, returning it if it was present.
    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.objects.remove(idx))
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|o| o.id == id)
    }
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn active_object(&self) -> Option<&Object> {
        self.get(self.active?)
    }

    /// Deep copies an object, data included, and links the copy into the scene.
    /// The copy always starts in object mode.
    pub fn duplicate(&mut self, id: ObjectId) -> Option<ObjectId> {
        let src = self.get(id)?;
        let mut copy = Object::new(format!("{}.001", src.name), src.data.clone());
        copy.modifiers = src.modifiers.clone();
        Some(self.link(copy))
    }
}

/// Dependency evaluation: produces the mesh an object displays once its modifiers run.
pub trait Evaluate {
    /// Returns `None` if the object has no evaluable mesh.
    fn evaluate(&self, obj: &Object) -> Option<Mesh>;
}

/// Evaluates an object's modifier stack in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModifierStack;

impl Evaluate for ModifierStack {
    fn evaluate(&self, obj: &Object) -> Option<Mesh> {
        let mesh = obj.mesh()?;
        if !mesh.is_valid() {
            return None;
        }
        let mut out = mesh.clone();
        for m in &obj.modifiers {
            match *m {
                Modifier::Subsurf { levels, .. } => {
                    let (v, f) = catmull_clark_levels(&out.v, &out.f, levels);
                    let mut next = Mesh::new_geometry(v, f);
                    next.materials = std::mem::take(&mut out.materials);
                    out = next;
                }
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;

    #[test]
    fn test_edit_mode_flushes_on_exit() {
        let mut obj = Object::new("Plane", ObjectData::Mesh(quad_grid(1)));
        obj.set_mode(Mode::Edit);
        obj.edit_mesh_mut().expect("in edit mode").v[0] = [9., 9., 9.];
        assert_eq!(obj.mesh().unwrap().v[0], [0., 0., 0.]);
        obj.set_mode(Mode::Object);
        assert_eq!(obj.mesh().unwrap().v[0], [9., 9., 9.]);
        assert!(obj.edit_mesh_mut().is_none());
    }

    #[test]
    fn test_duplicate_and_remove() {
        let mut ctx = Context::new();
        let id = ctx.link_active(Object::new("Plane", ObjectData::Mesh(quad_grid(2))));
        let dup = ctx.duplicate(id).expect("source exists");
        assert_ne!(id, dup);
        assert_eq!(ctx.objects.len(), 2);
        ctx.get_mut(dup).unwrap().mesh_mut().unwrap().v.clear();
        assert_eq!(ctx.get(id).unwrap().mesh().unwrap().v.len(), 9);
        assert!(ctx.remove(dup).is_some());
        assert_eq!(ctx.objects.len(), 1);
        assert_eq!(ctx.active, Some(id));
    }

    #[test]
    fn test_modifier_stack_subsurf() {
        let mut obj = Object::new("Plane", ObjectData::Mesh(quad_grid(1)));
        obj.modifiers.push(Modifier::Subsurf {
            levels: 1,
            render_levels: 1,
        });
        let m = ModifierStack.evaluate(&obj).expect("mesh evaluates");
        assert_eq!(m.v.len(), 9);
        assert_eq!(m.f.len(), 4);

        let empty = Object::new("Empty", ObjectData::Empty);
        assert!(ModifierStack.evaluate(&empty).is_none());
    }
}
