//! Pointer state machine, hover tracking and click dispatch.
//!
//! ```text
//! Idle --down (zoom > 1)--> Dragging --move--> Dragging
//! Dragging --up | leave--> Idle
//! ```
//!
//! Hover is tracked independently of the drag state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{DrawableItem, ItemKey, ItemRef, SpecLinks};
use crate::tooltip::place_tooltip;
use crate::viewport::{Point, Size, Viewport};
use crate::TimelineConfig;

/// Navigation requested by a click on an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Navigation {
    /// Detail view of a concrete item, keyed by its cleaned id.
    ItemDetail(String),
    ExternalLink(String),
}

/// Host side of navigation (router, `window.open`, test recorder...).
pub trait Navigator {
    fn navigate(&mut self, request: Navigation);
}

impl<F: FnMut(Navigation)> Navigator for F {
    fn navigate(&mut self, request: Navigation) {
        self(request)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointerState {
    Idle,
    Dragging,
}

/// What a click on `item` should open, if anything.
pub fn resolve_navigation(
    item: &DrawableItem,
    spec_links: &BTreeMap<String, SpecLinks>,
) -> Option<Navigation> {
    match &item.item {
        ItemRef::Numbered(id) => Some(Navigation::ItemDetail(id.clone())),
        sentinel => {
            let layer = sentinel.sentinel_layer()?;
            let link = spec_links
                .get(&item.upgrade_name)
                .and_then(|links| links.for_layer(layer));
            if link.is_none() {
                tracing::debug!(
                    upgrade = %item.upgrade_name,
                    layer = layer.as_str(),
                    "no spec link for upgrade, ignoring click"
                );
            }
            link.map(|url| Navigation::ExternalLink(url.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    viewport: Viewport,
    hover: Option<ItemKey>,
    pointer: Option<Point>,
    /// Set when the current gesture entered `Dragging`.
    suppress_click: bool,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&TimelineConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            viewport: Viewport::new(config),
            hover: None,
            pointer: None,
            suppress_click: false,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn state(&self) -> PointerState {
        if self.viewport.is_dragging() {
            PointerState::Dragging
        } else {
            PointerState::Idle
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    pub fn reset(&mut self) {
        self.viewport.reset();
    }

    /// Pointer position relative to the container, device pixels.
    pub fn pointer_down(&mut self, pointer: Point) -> PointerState {
        self.pointer = Some(pointer);
        self.suppress_click = self.viewport.begin_drag(pointer);
        self.state()
    }

    /// Returns whether the pan changed.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        self.pointer = Some(pointer);
        match self.viewport.drag_to(pointer) {
            Some(delta) => delta != Point::default(),
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.viewport.end_drag();
    }

    /// Leaving the surface cancels any drag.
    pub fn pointer_leave(&mut self) {
        self.viewport.end_drag();
        self.pointer = None;
    }

    pub fn hover_enter(&mut self, key: ItemKey) {
        self.hover = Some(key);
    }

    /// Clears the hover if it still belongs to `key`.
    pub fn hover_leave(&mut self, key: &ItemKey) {
        if self.hover.as_ref() == Some(key) {
            self.hover = None;
        }
    }

    pub fn hovered(&self) -> Option<&ItemKey> {
        self.hover.as_ref()
    }

    /// Tooltip corner for the current hover, if any.
    pub fn tooltip_position(&self, tooltip: Size, container: Size, margin: f64) -> Option<Point> {
        self.hover.as_ref()?;
        let pointer = self.pointer?;
        Some(place_tooltip(pointer, tooltip, container, margin))
    }

    /// Resolves a click without dispatching it. A click that ends a gesture
    /// which entered `Dragging` resolves to nothing, however short the move.
    pub fn click(
        &mut self,
        item: &DrawableItem,
        spec_links: &BTreeMap<String, SpecLinks>,
    ) -> Option<Navigation> {
        if std::mem::take(&mut self.suppress_click) {
            tracing::debug!(upgrade = %item.upgrade_name, "click ended a drag, ignoring");
            return None;
        }
        resolve_navigation(item, spec_links)
    }

    /// Resolves a click and hands the result to `navigator`. Returns whether
    /// anything was dispatched.
    pub fn click_and_navigate<N: Navigator + ?Sized>(
        &mut self,
        item: &DrawableItem,
        spec_links: &BTreeMap<String, SpecLinks>,
        navigator: &mut N,
    ) -> bool {
        match self.click(item, spec_links) {
            Some(request) => {
                tracing::info!(?request, "navigating");
                navigator.navigate(request);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;
    use chrono::NaiveDate;

    fn item(item: ItemRef) -> DrawableItem {
        DrawableItem {
            date: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
            upgrade_name: "Shapella".into(),
            item,
            is_meta: false,
            layer: Some(Layer::Execution),
            removed: false,
        }
    }

    fn links() -> BTreeMap<String, SpecLinks> {
        BTreeMap::from([(
            "Shapella".to_string(),
            SpecLinks {
                execution: Some("https://example.org/shanghai".into()),
                consensus: None,
            },
        )])
    }

    #[test]
    fn pointer_down_only_drags_when_zoomed_in() {
        let mut controller = InteractionController::default();
        assert_eq!(controller.pointer_down(Point::new(5.0, 5.0)), PointerState::Idle);
        assert!(!controller.pointer_move(Point::new(50.0, 5.0)));
        controller.pointer_up();

        controller.zoom_in();
        assert_eq!(controller.pointer_down(Point::new(5.0, 5.0)), PointerState::Dragging);
        assert!(controller.pointer_move(Point::new(50.0, 5.0)));
        controller.pointer_leave();
        assert_eq!(controller.state(), PointerState::Idle);
    }

    #[test]
    fn click_dispatches_by_item_kind() {
        let mut controller = InteractionController::default();
        let links = links();

        assert_eq!(
            controller.click(&item(ItemRef::Numbered("EIP-4895".into())), &links),
            Some(Navigation::ItemDetail("EIP-4895".into()))
        );
        assert_eq!(
            controller.click(&item(ItemRef::ExternalExecutionLink), &links),
            Some(Navigation::ExternalLink("https://example.org/shanghai".into()))
        );
        assert_eq!(
            controller.click(&item(ItemRef::ExternalConsensusLink), &links),
            None
        );
    }

    #[test]
    fn drag_that_ends_on_an_item_does_not_click() {
        let mut controller = InteractionController::default();
        controller.zoom_in();
        controller.pointer_down(Point::new(100.0, 100.0));
        controller.pointer_move(Point::new(130.0, 100.0));
        controller.pointer_up();

        let mut dispatched = Vec::new();
        let mut record = |nav: Navigation| dispatched.push(nav);
        let target = item(ItemRef::Numbered("EIP-4895".into()));
        assert!(!controller.click_and_navigate(&target, &links(), &mut record));

        controller.reset();
        controller.pointer_down(Point::new(130.0, 100.0));
        controller.pointer_up();
        assert!(controller.click_and_navigate(&target, &links(), &mut record));
        assert_eq!(dispatched, vec![Navigation::ItemDetail("EIP-4895".into())]);
    }

    #[test]
    fn any_gesture_that_entered_dragging_swallows_the_click() {
        let mut controller = InteractionController::default();
        let target = item(ItemRef::Numbered("EIP-4895".into()));
        controller.zoom_in();

        assert_eq!(
            controller.pointer_down(Point::new(100.0, 100.0)),
            PointerState::Dragging
        );
        controller.pointer_move(Point::new(102.0, 100.0));
        controller.pointer_up();
        assert_eq!(controller.click(&target, &links()), None);

        // Press and release without moving still entered `Dragging`.
        controller.pointer_down(Point::new(100.0, 100.0));
        controller.pointer_up();
        assert_eq!(controller.click(&target, &links()), None);

        // The flag is consumed, and a new idle gesture clicks normally.
        controller.zoom_out();
        assert_eq!(
            controller.pointer_down(Point::new(100.0, 100.0)),
            PointerState::Idle
        );
        controller.pointer_up();
        assert_eq!(
            controller.click(&target, &links()),
            Some(Navigation::ItemDetail("EIP-4895".into()))
        );
    }

    #[test]
    fn hover_is_independent_of_dragging() {
        let mut controller = InteractionController::default();
        let first = item(ItemRef::Numbered("EIP-4895".into())).key();
        let second = item(ItemRef::ExternalExecutionLink).key();

        controller.zoom_in();
        controller.pointer_down(Point::new(10.0, 10.0));
        controller.hover_enter(first.clone());
        controller.pointer_move(Point::new(20.0, 10.0));
        assert_eq!(controller.hovered(), Some(&first));

        controller.hover_enter(second.clone());
        controller.hover_leave(&first);
        assert_eq!(controller.hovered(), Some(&second));
        controller.hover_leave(&second);
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn tooltip_follows_pointer_while_hovering() {
        let mut controller = InteractionController::default();
        let container = Size::new(800.0, 500.0);
        let tooltip = Size::new(200.0, 100.0);
        assert_eq!(controller.tooltip_position(tooltip, container, 8.0), None);

        controller.hover_enter(item(ItemRef::Numbered("EIP-4895".into())).key());
        controller.pointer_move(Point::new(40.0, 40.0));
        assert_eq!(
            controller.tooltip_position(tooltip, container, 8.0),
            Some(Point::new(55.0, 55.0))
        );
    }
}
