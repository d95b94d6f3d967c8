//! Registration of the operator and the one-button sidebar panel that triggers it.

use crate::object::{Context, Evaluate};
use crate::operator::{OPERATOR_ID, OPERATOR_LABEL, OperatorResult, SmoothOperator};

pub const PANEL_ID: &str = "OBJECT_PT_subsurf_cleaner";
pub const PANEL_LABEL: &str = "Subsurf Cleaner";
pub const PANEL_CATEGORY: &str = "Subsurf Cleaner";

/// A button in a panel which runs an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub operator: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Sidebar panel with a single button for the smoothing operator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Panel {
    pub operator: SmoothOperator,
}

impl Panel {
    pub fn draw(&self) -> Vec<Button> {
        vec![Button {
            operator: OPERATOR_ID,
            label: OPERATOR_LABEL,
            icon: "MOD_SUBSURF",
        }]
    }

    /// What clicking the panel's button does.
    pub fn press(&self, ctx: &mut Context, evaluator: &dyn Evaluate) -> OperatorResult {
        self.operator.execute(ctx, evaluator)
    }
}

/// Names of registered operators and panels.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    pub operators: Vec<&'static str>,
    pub panels: Vec<&'static str>,
}

impl Registry {
    pub fn is_registered(&self, id: &str) -> bool {
        self.operators.iter().chain(&self.panels).any(|&o| o == id)
    }
}

pub fn register(r: &mut Registry) {
    if !r.operators.contains(&OPERATOR_ID) {
        r.operators.push(OPERATOR_ID);
    }
    if !r.panels.contains(&PANEL_ID) {
        r.panels.push(PANEL_ID);
    }
}

pub fn unregister(r: &mut Registry) {
    r.operators.retain(|&o| o != OPERATOR_ID);
    r.panels.retain(|&p| p != PANEL_ID);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;
    use crate::object::{ModifierStack, Object, ObjectData};

    #[test]
    fn test_register_roundtrip() {
        let mut r = Registry::default();
        register(&mut r);
        register(&mut r);
        assert_eq!(r.operators.len(), 1);
        assert!(r.is_registered(OPERATOR_ID));
        assert!(r.is_registered(PANEL_ID));
        unregister(&mut r);
        assert_eq!(r, Registry::default());
    }

    #[test]
    fn test_button_triggers_operator() {
        let panel = Panel::default();
        assert_eq!(panel.draw()[0].operator, OPERATOR_ID);

        let mut ctx = Context::new();
        let id = ctx.link_active(Object::new("Grid", ObjectData::Mesh(quad_grid(2))));
        let before = ctx.get(id).unwrap().mesh().unwrap().v.clone();
        let res = panel.press(&mut ctx, &ModifierStack);
        assert!(res.is_finished());
        assert_ne!(ctx.get(id).unwrap().mesh().unwrap().v, before);
    }
}
