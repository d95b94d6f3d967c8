//! Smoothed positions from a throwaway duplicate of an object.
//!
//! The duplicate gets a single subdivision modifier and is evaluated; only the first
//! `num_v` evaluated vertices are kept, relying on subdivision emitting the original
//! vertices first and in order.

use crate::object::{Context, Evaluate, Modifier, Object, ObjectId};
use crate::{F, Result, SmoothError};

/// A duplicate object linked into a context, unlinked again when dropped.
pub struct DuplicateGuard<'a> {
    ctx: &'a mut Context,
    id: ObjectId,
}

impl<'a> DuplicateGuard<'a> {
    /// Duplicates `src`. Returns `None` if `src` is not in the context.
    pub fn new(ctx: &'a mut Context, src: ObjectId) -> Option<Self> {
        let id = ctx.duplicate(src)?;
        Some(Self { ctx, id })
    }
    pub fn id(&self) -> ObjectId {
        self.id
    }
    pub fn object(&self) -> Option<&Object> {
        self.ctx.get(self.id)
    }
    pub fn object_mut(&mut self) -> Option<&mut Object> {
        self.ctx.get_mut(self.id)
    }
}

impl Drop for DuplicateGuard<'_> {
    fn drop(&mut self) {
        self.ctx.remove(self.id);
        tracing::trace!(id = self.id.0, "released duplicate");
    }
}

/// Evaluates `level` rounds of subdivision on a copy of `src` and returns the new positions of
/// its original vertices.
///
/// The copy and its evaluated mesh are released before returning, on success or failure.
pub fn smoothed_positions(
    ctx: &mut Context,
    src: ObjectId,
    level: u32,
    evaluator: &dyn Evaluate,
) -> Result<Vec<[F; 3]>> {
    let num_v = ctx
        .get(src)
        .and_then(Object::mesh)
        .map(|m| m.v.len())
        .ok_or(SmoothError::EvaluationFailed)?;

    let mut dup = DuplicateGuard::new(ctx, src).ok_or(SmoothError::EvaluationFailed)?;
    let obj = dup.object_mut().ok_or(SmoothError::EvaluationFailed)?;
    obj.modifiers.clear();
    obj.modifiers.push(Modifier::Subsurf {
        levels: level,
        render_levels: level,
    });

    let Some(evaluated) = dup.object().and_then(|o| evaluator.evaluate(o)) else {
        tracing::warn!("evaluation of duplicate produced no mesh");
        return Err(SmoothError::EvaluationFailed);
    };
    if evaluated.v.len() < num_v {
        return Err(SmoothError::VertexCountMismatch {
            expected: num_v,
            got: evaluated.v.len(),
        });
    }
    tracing::debug!(
        num_v,
        evaluated = evaluated.v.len(),
        "evaluated subdivision on duplicate"
    );

    let mut v = evaluated.v;
    v.truncate(num_v);
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;
    use crate::mesh::quad_grid;
    use crate::object::{ModifierStack, ObjectData};

    struct Nothing;
    impl Evaluate for Nothing {
        fn evaluate(&self, _: &Object) -> Option<Mesh> {
            None
        }
    }

    fn scene() -> (Context, ObjectId) {
        let mut ctx = Context::new();
        let mut obj = Object::new("Grid", ObjectData::Mesh(quad_grid(3)));
        // existing modifiers on the source must not leak into the evaluation
        obj.modifiers.push(Modifier::Subsurf {
            levels: 2,
            render_levels: 2,
        });
        let id = ctx.link_active(obj);
        (ctx, id)
    }

    #[test]
    fn test_positions_truncated_to_source() {
        let (mut ctx, id) = scene();
        let v = smoothed_positions(&mut ctx, id, 1, &ModifierStack).expect("evaluates");
        assert_eq!(v.len(), 16);
        assert_eq!(ctx.objects.len(), 1);
        assert_eq!(ctx.get(id).unwrap().modifiers.len(), 1);
    }

    #[test]
    fn test_no_mesh_releases_duplicate() {
        let (mut ctx, id) = scene();
        let err = smoothed_positions(&mut ctx, id, 1, &Nothing).unwrap_err();
        assert_eq!(err, SmoothError::EvaluationFailed);
        assert_eq!(ctx.objects.len(), 1);
        assert_eq!(ctx.active, Some(id));
    }
}
