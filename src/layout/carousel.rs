use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{DomEvent, DomEventKind, ListenTarget, PageHost};

/// Horizontal drag-to-scroll state for the carousel container.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    multiplier: f64,
    session: Option<DragSession>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start_x: f64,
    start_scroll: f64,
}

impl DragState {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier,
            session: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// `x` is the pointer position relative to the container.
    pub fn press(&mut self, x: f64, scroll_left: f64) {
        self.session = Some(DragSession {
            start_x: x,
            start_scroll: scroll_left,
        });
    }

    /// New scroll offset for a pointer at `x`, or `None` when not dragging.
    pub fn drag_to(&self, x: f64) -> Option<f64> {
        let session = self.session?;
        let walk = (x - session.start_x) * self.multiplier;
        Some(session.start_scroll - walk)
    }

    pub fn release(&mut self) {
        self.session = None;
    }
}

/// Wire drag-to-scroll onto the container.
pub fn bind_drag(page: &Rc<dyn PageHost>, multiplier: f64) {
    let state = Rc::new(RefCell::new(DragState::new(multiplier)));

    {
        let state = state.clone();
        let host = page.clone();
        page.listen(
            ListenTarget::Container,
            DomEventKind::MouseDown,
            Rc::new(move |event: &DomEvent| {
                let x = event.page_x - host.container_offset_left();
                state.borrow_mut().press(x, host.container_scroll_left());
            }),
        );
    }

    for kind in [DomEventKind::MouseLeave, DomEventKind::MouseUp] {
        let state = state.clone();
        page.listen(
            ListenTarget::Container,
            kind,
            Rc::new(move |_: &DomEvent| state.borrow_mut().release()),
        );
    }

    let host = page.clone();
    page.listen(
        ListenTarget::Container,
        DomEventKind::MouseMove,
        Rc::new(move |event: &DomEvent| {
            let x = event.page_x - host.container_offset_left();
            let Some(scroll_left) = state.borrow().drag_to(x) else {
                return;
            };
            event.prevent_default();
            host.set_container_scroll_left(scroll_left);
        }),
    );
}

/// Smooth-scroll each clicked card into centered view.
pub fn bind_scroll_into_view(page: &Rc<dyn PageHost>) {
    for card in page.cards() {
        let host = page.clone();
        page.listen(
            ListenTarget::Card(card),
            DomEventKind::Click,
            Rc::new(move |_: &DomEvent| host.scroll_card_into_view(card)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drag_moves_opposite_to_pointer_with_amplification() {
        let mut drag = DragState::new(2.0);
        assert_eq!(drag.drag_to(140.0), None);

        drag.press(100.0, 0.0);
        assert_eq!(drag.drag_to(140.0), Some(-80.0));
        assert_eq!(drag.drag_to(60.0), Some(80.0));

        drag.release();
        assert!(!drag.is_dragging());
        assert_eq!(drag.drag_to(200.0), None);
    }

    #[test]
    fn drag_is_relative_to_offset_at_press() {
        let mut drag = DragState::new(2.0);
        drag.press(10.0, 300.0);
        assert_eq!(drag.drag_to(0.0), Some(320.0));
    }
}
