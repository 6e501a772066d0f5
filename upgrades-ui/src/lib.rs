//! Yew SVG component for the network upgrades timeline (wasm32 only).

mod styles;

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use std::rc::Rc;

    use crate::styles;
    use serde_wasm_bindgen::from_value;
    use upgrades_core::{
        Dataset, DrawableItem, InteractionController, ItemGlyph, ItemKey, Navigation, Navigator,
        Point, Scene, Size, TimelineConfig, TimelineModel, TooltipContent,
    };
    use wasm_bindgen::prelude::*;
    use web_sys::{console, Document, Element, Window};
    use yew::prelude::*;

    const DEFAULT_DETAIL_BASE: &str = "/eips";

    /// Sends item clicks to the detail route and spec links to a new tab.
    struct BrowserNavigator {
        detail_base: String,
    }

    impl Navigator for BrowserNavigator {
        fn navigate(&mut self, request: Navigation) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let result = match request {
                Navigation::ItemDetail(id) => window.location().set_href(&format!(
                    "{}/{id}",
                    self.detail_base.trim_end_matches('/')
                )),
                Navigation::ExternalLink(url) => window
                    .open_with_url_and_target(&url, "_blank")
                    .map(|_| ()),
            };
            if let Err(err) = result {
                console::error_1(&err);
            }
        }
    }

    #[derive(Clone, PartialEq)]
    struct UiState {
        controller: InteractionController,
        container: Size,
        navigation: Option<(u32, Navigation)>,
        clicks: u32,
    }

    impl UiState {
        fn new(config: &TimelineConfig) -> Self {
            Self {
                controller: InteractionController::new(config),
                container: Size::default(),
                navigation: None,
                clicks: 0,
            }
        }
    }

    enum UiAction {
        ZoomIn,
        ZoomOut,
        Reset,
        PointerDown(Point),
        PointerMove(Point, Size),
        PointerUp,
        PointerLeave,
        HoverEnter(ItemKey),
        HoverLeave(ItemKey),
        Click(DrawableItem, Rc<Dataset>),
    }

    impl Reducible for UiState {
        type Action = UiAction;

        fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
            let mut next = (*self).clone();
            match action {
                UiAction::ZoomIn => {
                    next.controller.zoom_in();
                }
                UiAction::ZoomOut => {
                    next.controller.zoom_out();
                }
                UiAction::Reset => next.controller.reset(),
                UiAction::PointerDown(pointer) => {
                    next.controller.pointer_down(pointer);
                }
                UiAction::PointerMove(pointer, container) => {
                    next.controller.pointer_move(pointer);
                    next.container = container;
                }
                UiAction::PointerUp => next.controller.pointer_up(),
                UiAction::PointerLeave => next.controller.pointer_leave(),
                UiAction::HoverEnter(key) => next.controller.hover_enter(key),
                UiAction::HoverLeave(key) => next.controller.hover_leave(&key),
                UiAction::Click(item, dataset) => {
                    if let Some(request) = next.controller.click(&item, &dataset.spec_links) {
                        next.clicks = next.clicks.wrapping_add(1);
                        next.navigation = Some((next.clicks, request));
                    }
                }
            }
            if next == *self {
                self
            } else {
                Rc::new(next)
            }
        }
    }

    #[derive(Properties, PartialEq)]
    pub struct UpgradesTimelineProps {
        pub dataset: Rc<Dataset>,
        #[prop_or_default]
        pub config: TimelineConfig,
        #[prop_or(AttrValue::Static(DEFAULT_DETAIL_BASE))]
        pub detail_base: AttrValue,
    }

    #[function_component(UpgradesTimeline)]
    pub fn upgrades_timeline(props: &UpgradesTimelineProps) -> Html {
        use_effect_with((), |_| {
            if let Some(document) = web_sys::window().and_then(|window| window.document()) {
                if let Err(err) = styles::ensure_styles(&document) {
                    console::error_1(&err);
                }
            }
            || ()
        });

        let model = use_memo(props.dataset.clone(), |dataset| {
            TimelineModel::build(&dataset.upgrades, &dataset.meta)
        });
        let scene = use_memo((model.clone(), props.config.clone()), |(model, config)| {
            Scene::build(model, config)
        });
        let initial_config = props.config.clone();
        let state = use_reducer(move || UiState::new(&initial_config));
        let container_ref = use_node_ref();

        let detail_base = props.detail_base.to_string();
        use_effect_with(state.navigation.clone(), move |navigation| {
            if let Some((_, request)) = navigation {
                BrowserNavigator { detail_base }.navigate(request.clone());
            }
            || ()
        });

        let relative = {
            let container_ref = container_ref.clone();
            move |event: &MouseEvent| -> (Point, Size) {
                let Some(element) = container_ref.cast::<Element>() else {
                    return (Point::default(), Size::default());
                };
                let rect = element.get_bounding_client_rect();
                (
                    Point::new(
                        event.client_x() as f64 - rect.left(),
                        event.client_y() as f64 - rect.top(),
                    ),
                    Size::new(rect.width(), rect.height()),
                )
            }
        };

        let onpointerdown = {
            let dispatcher = state.dispatcher();
            let relative = relative.clone();
            Callback::from(move |event: PointerEvent| {
                let (pointer, _) = relative(&*event);
                dispatcher.dispatch(UiAction::PointerDown(pointer));
            })
        };
        let onpointermove = {
            let dispatcher = state.dispatcher();
            Callback::from(move |event: PointerEvent| {
                let (pointer, container) = relative(&*event);
                dispatcher.dispatch(UiAction::PointerMove(pointer, container));
            })
        };
        let onpointerup = {
            let dispatcher = state.dispatcher();
            Callback::from(move |_: PointerEvent| dispatcher.dispatch(UiAction::PointerUp))
        };
        let onpointerleave = {
            let dispatcher = state.dispatcher();
            Callback::from(move |_: PointerEvent| dispatcher.dispatch(UiAction::PointerLeave))
        };

        let zoom_button = |action: fn() -> UiAction| {
            let dispatcher = state.dispatcher();
            Callback::from(move |_: MouseEvent| dispatcher.dispatch(action()))
        };

        let viewport = state.controller.viewport();
        let view_box = viewport.view_box(scene.size());
        let dragging = viewport.is_dragging();
        let pannable = viewport.can_pan();

        let glyphs = scene
            .glyphs
            .iter()
            .filter_map(|glyph| {
                let item = model.items.get(glyph.index)?;
                Some(render_glyph(glyph, item, &props.dataset, &state))
            })
            .collect::<Html>();

        let tooltip = state.controller.hovered().and_then(|key| {
            let item = model.find(key)?;
            let position = state.controller.tooltip_position(
                props.config.tooltip_size(),
                state.container,
                props.config.tooltip_margin,
            )?;
            Some(render_tooltip(
                &TooltipContent::for_item(item, &props.dataset),
                position,
                &props.config,
            ))
        });

        html! {
            <div class="upgrades-timeline">
                <header class="upgrades-toolbar">
                    { render_legend() }
                    <div class="upgrades-zoom" role="group" aria-label="Zoom">
                        <button
                            type="button"
                            onclick={zoom_button(|| UiAction::ZoomOut)}
                            disabled={!viewport.can_zoom_out()}
                            aria-label="Zoom out"
                        >{"−"}</button>
                        <span class="upgrades-zoom-level">{ format!("{:.0}%", viewport.zoom() * 100.0) }</span>
                        <button
                            type="button"
                            onclick={zoom_button(|| UiAction::ZoomIn)}
                            disabled={!viewport.can_zoom_in()}
                            aria-label="Zoom in"
                        >{"+"}</button>
                        <button type="button" onclick={zoom_button(|| UiAction::Reset)}>{"Reset"}</button>
                    </div>
                </header>
                <div class="upgrades-stage">
                    <div
                        ref={container_ref}
                        class={classes!(
                            "upgrades-canvas",
                            pannable.then_some("is-pannable"),
                            dragging.then_some("is-dragging"),
                        )}
                        {onpointerdown}
                        {onpointermove}
                        {onpointerup}
                        {onpointerleave}
                    >
                        // Intrinsic size: one svg pixel per canvas unit, so a
                        // pointer delta divided by zoom is the pan delta.
                        <svg
                            width={scene.width.to_string()}
                            height={scene.height.to_string()}
                            viewBox={view_box.to_string()}
                            role="img"
                            aria-label="Network upgrades timeline"
                        >
                            { render_columns(&scene) }
                            { glyphs }
                        </svg>
                    </div>
                    { tooltip.unwrap_or_default() }
                </div>
            </div>
        }
    }

    fn render_glyph(
        glyph: &ItemGlyph,
        item: &DrawableItem,
        dataset: &Rc<Dataset>,
        state: &UseReducerHandle<UiState>,
    ) -> Html {
        let onmouseenter = {
            let dispatcher = state.dispatcher();
            let key = glyph.key.clone();
            Callback::from(move |_: MouseEvent| dispatcher.dispatch(UiAction::HoverEnter(key.clone())))
        };
        let onmouseleave = {
            let dispatcher = state.dispatcher();
            let key = glyph.key.clone();
            Callback::from(move |_: MouseEvent| dispatcher.dispatch(UiAction::HoverLeave(key.clone())))
        };
        let onclick = {
            let dispatcher = state.dispatcher();
            let item = item.clone();
            let dataset = dataset.clone();
            Callback::from(move |_: MouseEvent| {
                dispatcher.dispatch(UiAction::Click(item.clone(), dataset.clone()))
            })
        };

        let rect = glyph.rect;
        let center = rect.center();
        html! {
            <g class={glyph.class_name()} {onmouseenter} {onmouseleave} {onclick}>
                <rect
                    x={rect.x.to_string()}
                    y={rect.y.to_string()}
                    width={rect.width.to_string()}
                    height={rect.height.to_string()}
                    fill={glyph.fill}
                />
                <text x={center.x.to_string()} y={center.y.to_string()}>{ glyph.label.clone() }</text>
            </g>
        }
    }

    fn render_columns(scene: &Scene) -> Html {
        let left = scene.columns.first().map(|c| c.band.0).unwrap_or(0.0);
        let right = scene.columns.last().map(|c| c.band.1).unwrap_or(scene.width);
        html! {
            <g class="upgrades-columns">
                <line
                    class="upgrade-axis"
                    x1={left.to_string()}
                    y1={scene.axis_y.to_string()}
                    x2={right.to_string()}
                    y2={scene.axis_y.to_string()}
                />
                {
                    for scene.columns.iter().map(|column| {
                        let x = column.center_x.to_string();
                        html! {
                            <g class="upgrade-column">
                                <text class="upgrade-total" x={x.clone()} y={scene.total_y.to_string()}>{ column.total.to_string() }</text>
                                <text class="upgrade-date" x={x.clone()} y={scene.date_label_y.to_string()}>{ column.date_label.clone() }</text>
                                {
                                    for column.badges.iter().map(|badge| {
                                        let r = badge.rect;
                                        let lines = std::iter::once(badge.upgrade_name.clone())
                                            .chain(badge.details.iter().cloned());
                                        html! {
                                            <g class="upgrade-badge">
                                                <rect
                                                    x={r.x.to_string()}
                                                    y={r.y.to_string()}
                                                    width={r.width.to_string()}
                                                    height={r.height.to_string()}
                                                />
                                                {
                                                    for lines.enumerate().map(|(i, line)| html! {
                                                        <text x={x.clone()} y={(r.y + 16.0 + i as f64 * 14.0).to_string()}>{ line }</text>
                                                    })
                                                }
                                            </g>
                                        }
                                    })
                                }
                            </g>
                        }
                    })
                }
            </g>
        }
    }

    fn render_legend() -> Html {
        html! {
            <ul class="upgrades-legend">
                {
                    for upgrades_core::scene::legend().into_iter().map(|(label, fill)| html! {
                        <li>
                            <span class="upgrades-swatch" style={format!("background: {fill}")}></span>
                            { label }
                        </li>
                    })
                }
            </ul>
        }
    }

    fn render_tooltip(content: &TooltipContent, position: Point, config: &TimelineConfig) -> Html {
        let style = format!(
            "left: {}px; top: {}px; width: {}px; max-height: {}px;",
            position.x, position.y, config.tooltip_width, config.tooltip_height
        );
        html! {
            <div class={classes!("upgrades-tooltip", content.removed.then_some("is-removed"))} {style} role="tooltip">
                <strong class="upgrades-tooltip-title">{ content.title.clone() }</strong>
                <span class="upgrades-tooltip-subtitle">{ content.subtitle.clone() }</span>
                { content.status.as_ref().map(|status| html! { <span class="upgrades-tooltip-status">{ status.clone() }</span> }).unwrap_or_default() }
                { content.description.as_ref().map(|text| html! { <p>{ text.clone() }</p> }).unwrap_or_default() }
            </div>
        }
    }

    #[wasm_bindgen]
    pub fn mount_upgrades_timeline(selector: &str, dataset: JsValue) -> Result<(), JsValue> {
        let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Could not access document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Invalid selector: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("No element matches the selector"))?;

        let value: serde_json::Value = from_value(dataset)?;
        let dataset = upgrades_data::load_dataset_value(&value)
            .map_err(|err| JsValue::from_str(&format!("Timeline error: {err}")))?;
        tracing::debug!(upgrades = dataset.upgrades.len(), "mounting upgrades timeline");

        yew::Renderer::<UpgradesTimeline>::with_root_and_props(
            target,
            UpgradesTimelineProps {
                dataset: Rc::new(dataset),
                config: TimelineConfig::default(),
                detail_base: AttrValue::Static(DEFAULT_DETAIL_BASE),
            },
        )
        .render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::{mount_upgrades_timeline, UpgradesTimeline, UpgradesTimelineProps};

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_upgrades_timeline(
    _: &str,
    _: wasm_bindgen::JsValue,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "upgrades-ui only supports the wasm32 target",
    ))
}
