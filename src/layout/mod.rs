pub mod carousel;
pub mod list;

pub use carousel::DragState;

use std::cell::Cell;
use std::rc::Rc;

use crate::host::PageHost;
use crate::log_info;
use crate::models::LayoutVariant;

const ENABLE_LOGS: bool = true;

/// Applies the session's layout to the options container.
///
/// The layout is chosen once per page load; switching means reloading with a
/// different `layout` parameter.
pub struct LayoutDispatcher {
    page: Rc<dyn PageHost>,
    drag_multiplier: f64,
    applied: Cell<Option<LayoutVariant>>,
}

impl LayoutDispatcher {
    pub fn new(page: Rc<dyn PageHost>, drag_multiplier: f64) -> Self {
        Self {
            page,
            drag_multiplier,
            applied: Cell::new(None),
        }
    }

    pub fn apply(&self, layout: LayoutVariant) {
        self.page.set_container_class(layout.container_class());

        match layout {
            LayoutVariant::Grid => {}
            LayoutVariant::List => {
                let split = list::restructure_cards(self.page.as_ref());
                log_info!("List layout: restructured {split} cards");
            }
            LayoutVariant::Carousel => {
                // Listeners only go on once; a second apply just resets the class.
                if self.applied.get() != Some(LayoutVariant::Carousel) {
                    carousel::bind_drag(&self.page, self.drag_multiplier);
                    carousel::bind_scroll_into_view(&self.page);
                }
            }
        }

        self.applied.set(Some(layout));
    }

    pub fn applied(&self) -> Option<LayoutVariant> {
        self.applied.get()
    }
}
