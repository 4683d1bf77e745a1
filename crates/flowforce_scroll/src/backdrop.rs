// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed page backdrop that follows the section in the middle of the viewport.

use crate::host::Layout;
use crate::trigger::{ScrollTriggers, TriggerHandler, TriggerId, TriggerSpec};
use flowforce_motion::{ElementId, TriggerAnchor};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Background layers available to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backdrop {
    /// Floral photograph
    #[default]
    Floral,
    /// Concrete texture
    Concrete,
    /// Plain neutral fill
    Neutral,
}

struct BackdropHandler {
    backdrop: Backdrop,
    active: Rc<Cell<Backdrop>>,
}

impl TriggerHandler for BackdropHandler {
    fn on_enter(&mut self, _id: TriggerId) {
        self.active.set(self.backdrop);
    }

    fn on_enter_back(&mut self, _id: TriggerId) {
        self.active.set(self.backdrop);
    }
}

/// Switches the active backdrop as sections cross the viewport center
pub struct BackdropSwitcher {
    active: Rc<Cell<Backdrop>>,
    triggers: Vec<TriggerId>,
}

impl BackdropSwitcher {
    /// Register one trigger per section, `top 50%` to `bottom 50%`.
    /// Sections missing from the layout are skipped.
    pub fn register(
        triggers: &mut ScrollTriggers,
        sections: &[(ElementId, Backdrop)],
        layout: &dyn Layout,
    ) -> Self {
        let active = Rc::new(Cell::new(Backdrop::default()));
        let center_top = TriggerAnchor::new(0.0, 0.5);
        let center_bottom = TriggerAnchor::new(1.0, 0.5);

        let ids = sections
            .iter()
            .filter_map(|(section, backdrop)| {
                let handler = BackdropHandler {
                    backdrop: *backdrop,
                    active: active.clone(),
                };
                triggers
                    .register(
                        TriggerSpec::new(*section, center_top, center_bottom),
                        Some(Box::new(handler)),
                        layout,
                    )
                    .map_err(|err| tracing::debug!("Backdrop section skipped: {err}"))
                    .ok()
            })
            .collect();

        Self {
            active,
            triggers: ids,
        }
    }

    /// Backdrop currently shown
    pub fn active(&self) -> Backdrop {
        self.active.get()
    }

    /// Opacity of a layer; only the active one is shown
    pub fn opacity(&self, backdrop: Backdrop) -> f32 {
        if self.active() == backdrop {
            1.0
        } else {
            0.0
        }
    }

    /// Remove every trigger
    pub fn teardown(&mut self, triggers: &mut ScrollTriggers) {
        for id in self.triggers.drain(..) {
            triggers.unregister(id);
        }
    }
}
