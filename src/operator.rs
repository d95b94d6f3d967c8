//! The smooth-and-clean operator: smooths the active mesh by one level of subdivision while
//! keeping its topology and attributes.

use crate::evaluate::smoothed_positions;
use crate::object::{Context, Evaluate, Mode, ObjectData, ObjectId};
use crate::reattach::{ReattachReport, reattach};
use crate::reconstruct::{ReconstructReport, reconstruct};
use crate::{Mesh, Result, SmoothError, Snapshot};

pub const OPERATOR_ID: &str = "mesh.subdivision_clean_copy_add_subsurf";
pub const OPERATOR_LABEL: &str = "Smooth Base Vertices via Subsurf Copy";
pub const OPERATOR_DESCRIPTION: &str =
    "Smooth base mesh using Subsurf Level 1 without modifying topology or data";

/// How the smoothed positions are applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SmoothMode {
    /// Write positions straight onto the existing mesh.
    PositionsOnly,
    /// Rebuild the mesh from a snapshot and reattach its attributes.
    #[default]
    Rebuild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothOptions {
    /// Subdivision level evaluated on the duplicate.
    pub level: u32,
    pub mode: SmoothMode,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            level: 1,
            mode: SmoothMode::default(),
        }
    }
}

/// Stages of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Idle,
    Validating,
    Snapshotting,
    Evaluating,
    Reconstructing,
    Reattaching,
    Done,
    Failed,
}

impl OpState {
    fn advance(&mut self, next: OpState) {
        tracing::debug!(from = ?*self, to = ?next, "operator stage");
        *self = next;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Error,
}

/// User facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorResult {
    pub status: Status,
    pub report: Report,
    pub state: OpState,
    pub error: Option<SmoothError>,
    /// Only present when the mesh was rebuilt.
    pub reconstruct: Option<ReconstructReport>,
    pub reattach: Option<ReattachReport>,
}

impl OperatorResult {
    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

/// Switches an object into a mode and back to its previous one when dropped.
struct ModeGuard<'a> {
    ctx: &'a mut Context,
    id: ObjectId,
    prev: Mode,
}

impl<'a> ModeGuard<'a> {
    fn enter(ctx: &'a mut Context, id: ObjectId, mode: Mode) -> Self {
        let prev = match ctx.get_mut(id) {
            Some(obj) => {
                let prev = obj.mode();
                obj.set_mode(mode);
                prev
            }
            None => mode,
        };
        Self { ctx, id, prev }
    }
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        if let Some(obj) = self.ctx.get_mut(self.id) {
            obj.set_mode(self.prev);
        }
    }
}

fn live_mesh(ctx: &mut Context, id: ObjectId) -> Result<&mut Mesh> {
    ctx.get_mut(id)
        .and_then(|o| o.mesh_mut())
        .ok_or(SmoothError::NoActiveObject)
}

/// What a successful run changed.
struct Outcome {
    reconstruct: Option<ReconstructReport>,
    reattach: Option<ReattachReport>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SmoothOperator {
    pub options: SmoothOptions,
}

impl SmoothOperator {
    pub fn new(options: SmoothOptions) -> Self {
        Self { options }
    }

    /// Smooths the active object of `ctx`.
    ///
    /// On failure the active mesh is untouched, any duplicate is gone and the object is back
    /// in the mode it started in.
    pub fn execute(&self, ctx: &mut Context, evaluator: &dyn Evaluate) -> OperatorResult {
        let mut state = OpState::Idle;
        state.advance(OpState::Validating);
        let result = self.validate(ctx).and_then(|id| {
            let guard = ModeGuard::enter(ctx, id, Mode::Object);
            self.run(&mut *guard.ctx, id, evaluator, &mut state)
        });

        match result {
            Ok(Outcome {
                reconstruct,
                reattach,
            }) => {
                state.advance(OpState::Done);
                let message = format!(
                    "Base vertices smoothed using Subsurf Level {}",
                    self.options.level
                );
                tracing::info!("{message}");
                OperatorResult {
                    status: Status::Finished,
                    report: Report {
                        level: ReportLevel::Info,
                        message,
                    },
                    state,
                    error: None,
                    reconstruct,
                    reattach,
                }
            }
            Err(e) => {
                state.advance(OpState::Failed);
                tracing::warn!(error = %e, "smoothing cancelled");
                OperatorResult {
                    status: Status::Cancelled,
                    report: Report {
                        level: ReportLevel::Error,
                        message: e.to_string(),
                    },
                    state,
                    error: Some(e),
                    reconstruct: None,
                    reattach: None,
                }
            }
        }
    }

    fn validate(&self, ctx: &Context) -> Result<ObjectId> {
        if self.options.level == 0 {
            return Err(SmoothError::InvalidLevel(0));
        }
        let obj = ctx.active_object().ok_or(SmoothError::NoActiveObject)?;
        match &obj.data {
            ObjectData::Mesh(_) => Ok(obj.id),
            other => Err(SmoothError::NotAMesh {
                name: obj.name.clone(),
                kind: other.kind_name(),
            }),
        }
    }

    fn run(
        &self,
        ctx: &mut Context,
        id: ObjectId,
        evaluator: &dyn Evaluate,
        state: &mut OpState,
    ) -> Result<Outcome> {
        let snapshot = match self.options.mode {
            SmoothMode::Rebuild => {
                state.advance(OpState::Snapshotting);
                Some(Snapshot::capture(live_mesh(ctx, id)?))
            }
            SmoothMode::PositionsOnly => None,
        };

        state.advance(OpState::Evaluating);
        let positions = smoothed_positions(ctx, id, self.options.level, evaluator)?;

        let Some(snapshot) = snapshot else {
            let mesh = live_mesh(ctx, id)?;
            for (dst, src) in mesh.v.iter_mut().zip(positions) {
                *dst = src;
            }
            return Ok(Outcome {
                reconstruct: None,
                reattach: None,
            });
        };

        state.advance(OpState::Reconstructing);
        let mesh = live_mesh(ctx, id)?;
        let mut rebuilt = Mesh {
            materials: mesh.materials.clone(),
            ..Default::default()
        };
        let rec = reconstruct(&positions, &snapshot, &mut rebuilt);

        state.advance(OpState::Reattaching);
        let att = reattach(&mut rebuilt, &snapshot);

        *mesh = rebuilt;
        Ok(Outcome {
            reconstruct: Some(rec),
            reattach: Some(att),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;
    use crate::object::{ModifierStack, Object};

    #[test]
    fn test_positions_only_keeps_attributes() {
        let mut m = quad_grid(3);
        m.ensure_uv_channel("UVMap").data[0] = [0.1, 0.2];
        m.e[2].seam = true;
        let mut ctx = Context::new();
        let id = ctx.link_active(Object::new("Grid", ObjectData::Mesh(m.clone())));
        let op = SmoothOperator::new(SmoothOptions {
            mode: SmoothMode::PositionsOnly,
            ..Default::default()
        });
        let res = op.execute(&mut ctx, &ModifierStack);
        assert!(res.is_finished());
        assert_eq!(res.state, OpState::Done);
        assert!(res.reconstruct.is_none());
        let after = ctx.get(id).unwrap().mesh().unwrap();
        assert_eq!(after.uv, m.uv);
        assert_eq!(after.e, m.e);
        assert_ne!(after.v, m.v);
    }

    #[test]
    fn test_level_zero_rejected() {
        let mut ctx = Context::new();
        ctx.link_active(Object::new("Grid", ObjectData::Mesh(quad_grid(1))));
        let op = SmoothOperator::new(SmoothOptions {
            level: 0,
            ..Default::default()
        });
        let res = op.execute(&mut ctx, &ModifierStack);
        assert_eq!(res.status, Status::Cancelled);
        assert_eq!(res.error, Some(SmoothError::InvalidLevel(0)));
        assert_eq!(res.report.level, ReportLevel::Error);
    }

    #[test]
    fn test_no_active_object() {
        let mut ctx = Context::new();
        let res = SmoothOperator::default().execute(&mut ctx, &ModifierStack);
        assert_eq!(res.error, Some(SmoothError::NoActiveObject));
        assert_eq!(res.report.message, "Active object must be a mesh");
    }
}
