#[cfg(target_arch = "wasm32")]
use upgrades_core::svg::SVG_STYLES;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Node};

#[cfg(target_arch = "wasm32")]
const STYLE_TAG_SELECTOR: &str = "style[data-upgrades-ui]";

/// Component chrome plus overridable design tokens. Glyph styling comes from
/// the shared SVG stylesheet so the static export looks the same.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const DEFAULT_STYLES: &str = r#"
:root {
  --upgrades-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --upgrades-bg: #ffffff;
  --upgrades-text: #1f2933;
  --upgrades-muted: #52606d;
  --upgrades-border: rgba(148, 163, 184, 0.38);
  --upgrades-radius: 12px;
  --upgrades-tooltip-bg: #0f172a;
  --upgrades-tooltip-text: #f8fafc;
  --upgrades-removed: #b42318;
}

.upgrades-timeline {
  font-family: var(--upgrades-font-family);
  background: var(--upgrades-bg);
  color: var(--upgrades-text);
  border: 1px solid var(--upgrades-border);
  border-radius: var(--upgrades-radius);
  display: flex;
  flex-direction: column;
  gap: 12px;
  padding: 16px;
}

.upgrades-toolbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  flex-wrap: wrap;
  gap: 12px;
}

.upgrades-legend {
  display: flex;
  gap: 16px;
  list-style: none;
  margin: 0;
  padding: 0;
  font-size: 13px;
  color: var(--upgrades-muted);
}

.upgrades-legend li {
  display: flex;
  align-items: center;
  gap: 6px;
}

.upgrades-swatch {
  width: 12px;
  height: 12px;
  border-radius: 3px;
  border: 1px solid var(--upgrades-border);
}

.upgrades-zoom {
  display: flex;
  align-items: center;
  gap: 6px;
}

.upgrades-zoom button {
  min-width: 32px;
  height: 32px;
  border: 1px solid var(--upgrades-border);
  border-radius: 8px;
  background: var(--upgrades-bg);
  cursor: pointer;
}

.upgrades-zoom button:disabled {
  opacity: 0.4;
  cursor: not-allowed;
}

.upgrades-zoom-level {
  min-width: 48px;
  text-align: center;
  font-variant-numeric: tabular-nums;
}

.upgrades-stage {
  position: relative;
}

.upgrades-canvas {
  overflow-x: auto;
  overflow-y: hidden;
  user-select: none;
}

.upgrades-canvas.is-pannable {
  cursor: grab;
  touch-action: none;
}

.upgrades-canvas.is-dragging {
  cursor: grabbing;
}

.upgrades-canvas svg {
  display: block;
  max-width: none;
}

.upgrade-item {
  cursor: pointer;
}

.upgrade-item:hover rect {
  filter: brightness(0.92);
}

.upgrades-tooltip {
  position: absolute;
  box-sizing: border-box;
  overflow: hidden;
  pointer-events: none;
  padding: 10px 12px;
  border-radius: 8px;
  background: var(--upgrades-tooltip-bg);
  color: var(--upgrades-tooltip-text);
  font-size: 12px;
  line-height: 1.4;
  display: flex;
  flex-direction: column;
  gap: 4px;
  box-shadow: 0 12px 24px rgba(15, 23, 42, 0.2);
}

.upgrades-tooltip p {
  margin: 0;
}

.upgrades-tooltip-title {
  font-size: 13px;
}

.upgrades-tooltip-subtitle,
.upgrades-tooltip-status {
  opacity: 0.75;
}

.upgrades-tooltip.is-removed .upgrades-tooltip-title {
  color: var(--upgrades-removed);
  text-decoration: line-through;
}
"#;

#[cfg(target_arch = "wasm32")]
pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head> element"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-upgrades-ui", "v1")?;
    style_el.set_text_content(Some(&format!("{DEFAULT_STYLES}\n{SVG_STYLES}")));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(selector: &str) -> &'static str {
        let start = DEFAULT_STYLES
            .find(&format!("\n{selector} {{"))
            .unwrap_or_else(|| panic!("no rule for {selector}"));
        let body = &DEFAULT_STYLES[start..];
        &body[..body.find('}').unwrap()]
    }

    #[test]
    fn canvas_scrolls_instead_of_squeezing() {
        let canvas = rule(".upgrades-canvas");
        assert!(canvas.contains("overflow-x: auto"));

        let svg = rule(".upgrades-canvas svg");
        assert!(svg.contains("max-width: none"));
        assert!(!svg.contains("height: auto"));
    }
}
