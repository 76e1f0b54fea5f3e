//! Undo functionality for the drawing engine

use tracing::debug;

use crate::tools::DrawingTool;

use super::DrawingEngine;

impl DrawingEngine {
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last committed action.
    ///
    /// A stroke in progress is cancelled first so its preview never sits on
    /// top of a state it was not drawn against.
    pub fn undo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.cancel_stroke();
        let done = self.history.undo(&mut self.scene);
        if !done {
            debug!("Undo: no entries available");
        }
        done
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.cancel_stroke();
        let done = self.history.redo(&mut self.scene);
        if !done {
            debug!("Redo: no entries available");
        }
        done
    }

    /// Commit the following strokes as one undo step
    pub fn begin_group(&mut self) {
        self.history.begin_group();
    }

    pub fn end_group(&mut self, label: impl Into<String>) {
        self.history.end_group(label);
    }

    fn cancel_stroke(&mut self) {
        if let Some(tool) = self.tool_mut(self.active_tool) {
            if tool.is_drawing() {
                tool.cancel();
            }
        }
    }
}
