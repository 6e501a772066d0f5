//! Host-agnostic timeline session: the state a JS host drives through the
//! bridge, kept free of `JsValue` so it can be tested natively.

use serde::Serialize;
use upgrades_core::svg::render_svg;
use upgrades_core::{
    Dataset, InteractionController, ModelCache, Navigation, Point, Scene, Size, TimelineConfig,
    TooltipContent, ViewBox,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TooltipView {
    pub x: f64,
    pub y: f64,
    pub content: TooltipContent,
}

pub struct Session {
    config: TimelineConfig,
    dataset: Dataset,
    cache: ModelCache,
    scene: Scene,
    controller: InteractionController,
}

impl Session {
    pub fn new(config: TimelineConfig) -> Self {
        let mut cache = ModelCache::new();
        let dataset = Dataset::default();
        let model = cache.get_or_build(&dataset.upgrades, &dataset.meta);
        let scene = Scene::build(&model, &config);
        Self {
            controller: InteractionController::new(&config),
            config,
            dataset,
            cache,
            scene,
        }
    }

    /// Replaces the data. The view resets because positions change.
    pub fn load(&mut self, dataset: Dataset) {
        let model = self.cache.get_or_build(&dataset.upgrades, &dataset.meta);
        self.scene = Scene::build(&model, &self.config);
        tracing::info!(
            upgrades = dataset.upgrades.len(),
            items = model.items.len(),
            columns = model.layout.column_count(),
            "timeline session loaded"
        );
        self.dataset = dataset;
        self.controller = InteractionController::new(&self.config);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn zoom_in(&mut self) -> bool {
        self.controller.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.controller.zoom_out()
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn view_box(&self) -> ViewBox {
        self.controller.viewport().view_box(self.scene.size())
    }

    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        self.controller.pointer_down(pointer) == upgrades_core::PointerState::Dragging
    }

    /// Pans while dragging and refreshes the hover from a hit test.
    /// Returns whether anything visible changed.
    pub fn pointer_move(&mut self, pointer: Point, element: Size) -> bool {
        let panned = self.controller.pointer_move(pointer);

        let content = self
            .controller
            .viewport()
            .to_content(pointer, element, self.scene.size());
        let hit = self.scene.hit_test(content).map(|glyph| glyph.key.clone());
        let previous = self.controller.hovered().cloned();
        match (&previous, hit) {
            (Some(old), Some(new)) if *old == new => {}
            (_, Some(new)) => self.controller.hover_enter(new),
            (Some(old), None) => self.controller.hover_leave(old),
            (None, None) => {}
        }

        panned || previous.as_ref() != self.controller.hovered()
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.controller.pointer_leave();
        if let Some(old) = self.controller.hovered().cloned() {
            self.controller.hover_leave(&old);
        }
    }

    /// Navigation for a click at `pointer`, if it lands on an item.
    pub fn click(&mut self, pointer: Point, element: Size) -> Option<Navigation> {
        let content = self
            .controller
            .viewport()
            .to_content(pointer, element, self.scene.size());
        let index = self.scene.hit_test(content)?.index;
        let model = self.cache.current()?;
        let item = model.items.get(index)?;
        self.controller.click(item, &self.dataset.spec_links)
    }

    pub fn tooltip(&self, container: Size) -> Option<TooltipView> {
        let key = self.controller.hovered()?;
        let model = self.cache.current()?;
        let item = model.find(key)?;
        let position = self.controller.tooltip_position(
            self.config.tooltip_size(),
            container,
            self.config.tooltip_margin,
        )?;
        Some(TooltipView {
            x: position.x,
            y: position.y,
            content: TooltipContent::for_item(item, &self.dataset),
        })
    }

    pub fn render_svg(&self) -> String {
        render_svg(&self.scene, self.view_box())
    }
}
