//! Framework-neutral WASM <-> JavaScript bridge for the upgrades timeline.

use serde_wasm_bindgen::{from_value, to_value};
use upgrades_core::{Point, Scene, Size, TimelineConfig, TimelineError, TimelineModel};
use wasm_bindgen::prelude::*;

mod session;

pub use session::{Session, TooltipView};

/// Any subset of `TimelineConfig` fields; missing ones keep their defaults.
fn parse_config(value: serde_json::Value) -> Result<TimelineConfig, String> {
    if value.is_null() {
        return Ok(TimelineConfig::default());
    }
    serde_json::from_value(value).map_err(|err| format!("Could not read config: {err}"))
}

fn read_config(config: Option<JsValue>) -> Result<TimelineConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let value = from_value::<serde_json::Value>(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            parse_config(value).map_err(|err| JsValue::from_str(&err))
        }
        _ => Ok(TimelineConfig::default()),
    }
}

fn read_dataset(input: JsValue) -> Result<upgrades_core::Dataset, JsValue> {
    let value = from_value::<serde_json::Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Could not read dataset JSON: {err}")))?;
    upgrades_data::load_dataset_value(&value)
        .map_err(|err| JsValue::from_str(&format_timeline_error(err)))
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Could not serialize: {err}")))
}

/// One-shot layout: dataset in, positioned scene out.
#[wasm_bindgen]
pub fn layout_dataset(input: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let cfg = read_config(config)?;
    let dataset = read_dataset(input)?;
    let model = TimelineModel::build(&dataset.upgrades, &dataset.meta);
    serialize(&Scene::build(&model, &cfg))
}

/// CSV dump of the raw records, for the host's download button.
#[wasm_bindgen]
pub fn export_csv(input: JsValue) -> Result<String, JsValue> {
    let dataset = read_dataset(input)?;
    Ok(upgrades_data::export_csv(&dataset.upgrades))
}

/// Stateful handle for hosts that render the SVG themselves and forward
/// pointer events. Coordinates are relative to the rendered element.
#[wasm_bindgen]
pub struct TimelineHandle {
    session: Session,
}

#[wasm_bindgen]
impl TimelineHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<JsValue>) -> Result<TimelineHandle, JsValue> {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        Ok(Self {
            session: Session::new(read_config(config)?),
        })
    }

    pub fn load(&mut self, dataset: JsValue) -> Result<(), JsValue> {
        let dataset = read_dataset(dataset)?;
        self.session.load(dataset);
        Ok(())
    }

    pub fn scene(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.scene())
    }

    pub fn zoom(&self) -> f64 {
        self.session.controller().viewport().zoom()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.session.controller().viewport().can_zoom_in()
    }

    pub fn can_zoom_out(&self) -> bool {
        self.session.controller().viewport().can_zoom_out()
    }

    pub fn zoom_in(&mut self) -> bool {
        self.session.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.session.zoom_out()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn view_box(&self) -> String {
        self.session.view_box().to_string()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(Point::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, width: f64, height: f64) -> bool {
        self.session
            .pointer_move(Point::new(x, y), Size::new(width, height))
    }

    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    /// `{kind, payload}` navigation request, or `null`.
    pub fn click(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<JsValue, JsValue> {
        match self
            .session
            .click(Point::new(x, y), Size::new(width, height))
        {
            Some(navigation) => serialize(&navigation),
            None => Ok(JsValue::NULL),
        }
    }

    /// `{x, y, content}` for the hovered item, or `null`.
    pub fn tooltip(&self, width: f64, height: f64) -> Result<JsValue, JsValue> {
        match self.session.tooltip(Size::new(width, height)) {
            Some(view) => serialize(&view),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn render_svg(&self) -> String {
        self.session.render_svg()
    }
}

fn format_timeline_error(err: TimelineError) -> String {
    format!("Timeline error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_config_field_can_be_overridden() {
        let cfg = parse_config(serde_json::json!({
            "margin_top": 10.0,
            "margin_left": 12.0,
            "band_padding": 0.25,
            "zoom_min": 0.8,
            "zoom_step": 1.5,
            "tooltip_margin": 4.0
        }))
        .unwrap();
        assert_eq!(cfg.margin_top, 10.0);
        assert_eq!(cfg.margin_left, 12.0);
        assert_eq!(cfg.band_padding, 0.25);
        assert_eq!(cfg.zoom_min, 0.8);
        assert_eq!(cfg.zoom_step, 1.5);
        assert_eq!(cfg.tooltip_margin, 4.0);
        assert_eq!(cfg.row_height, TimelineConfig::default().row_height);
    }

    #[test]
    fn null_or_malformed_config() {
        assert_eq!(
            parse_config(serde_json::Value::Null).unwrap(),
            TimelineConfig::default()
        );
        let err = parse_config(serde_json::json!({ "zoom_step": "fast" })).unwrap_err();
        assert!(err.starts_with("Could not read config"));
    }
}
