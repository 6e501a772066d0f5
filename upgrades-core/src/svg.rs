//! Static SVG serialization of a [`Scene`].

use std::fmt::Write as _;

use crate::scene::{legend, Scene};
use crate::viewport::ViewBox;

/// Stylesheet embedded in standalone SVG output. The yew component ships
/// the same rules through its own style tag.
pub const SVG_STYLES: &str = r#"
.upgrade-item rect { stroke: #334155; stroke-width: 1; rx: 4; }
.upgrade-item text { font: 12px sans-serif; fill: #0f172a; dominant-baseline: middle; text-anchor: middle; }
.upgrade-item--meta rect { stroke-dasharray: 4 3; }
.upgrade-item--removed rect { stroke: #dc2626; stroke-width: 2; }
.upgrade-item--removed text { text-decoration: line-through; fill: #7f1d1d; }
.upgrade-axis { stroke: #94a3b8; }
.upgrade-total { font: bold 12px sans-serif; fill: #334155; text-anchor: middle; }
.upgrade-date { font: 12px sans-serif; fill: #475569; text-anchor: middle; }
.upgrade-badge rect { fill: #f8fafc; stroke: #cbd5e1; rx: 6; }
.upgrade-badge text { font: 11px sans-serif; fill: #334155; text-anchor: middle; }
.upgrade-legend text { font: 11px sans-serif; fill: #334155; }
"#;

const LEGEND_SWATCH: f64 = 10.0;
const LEGEND_STEP: f64 = 96.0;

/// Writes `scene` as a standalone SVG document showing `view`.
pub fn render_svg(scene: &Scene, view: ViewBox) -> String {
    let mut out = String::with_capacity(4096 + scene.glyphs.len() * 256);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}">"#,
        fmt(scene.width),
        fmt(scene.height),
        view
    );
    let _ = write!(out, "<style>{SVG_STYLES}</style>");

    write_legend(&mut out);

    let left = scene.columns.first().map(|c| c.band.0).unwrap_or(0.0);
    let right = scene.columns.last().map(|c| c.band.1).unwrap_or(scene.width);
    let _ = write!(
        out,
        r#"<line class="upgrade-axis" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
        fmt(left),
        fmt(scene.axis_y),
        fmt(right),
        fmt(scene.axis_y)
    );

    for column in &scene.columns {
        let _ = write!(
            out,
            r#"<text class="upgrade-total" x="{}" y="{}">{}</text>"#,
            fmt(column.center_x),
            fmt(scene.total_y),
            column.total
        );
        let _ = write!(
            out,
            r#"<text class="upgrade-date" x="{}" y="{}">{}</text>"#,
            fmt(column.center_x),
            fmt(scene.date_label_y),
            escape_xml(&column.date_label)
        );
        for badge in &column.badges {
            let r = badge.rect;
            let _ = write!(
                out,
                r#"<g class="upgrade-badge"><rect x="{}" y="{}" width="{}" height="{}"/>"#,
                fmt(r.x),
                fmt(r.y),
                fmt(r.width),
                fmt(r.height)
            );
            let lines = std::iter::once(badge.upgrade_name.as_str())
                .chain(badge.details.iter().map(String::as_str));
            for (i, line) in lines.enumerate() {
                let _ = write!(
                    out,
                    r#"<text x="{}" y="{}">{}</text>"#,
                    fmt(column.center_x),
                    fmt(r.y + 16.0 + i as f64 * 14.0),
                    escape_xml(line)
                );
            }
            out.push_str("</g>");
        }
    }

    for glyph in &scene.glyphs {
        let r = glyph.rect;
        let center = r.center();
        let _ = write!(
            out,
            r#"<g class="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="{}"/><text x="{}" y="{}">{}</text></g>"#,
            glyph.class_name(),
            fmt(r.x),
            fmt(r.y),
            fmt(r.width),
            fmt(r.height),
            glyph.fill,
            fmt(center.x),
            fmt(center.y),
            escape_xml(&glyph.label)
        );
    }

    out.push_str("</svg>");
    out
}

fn write_legend(out: &mut String) {
    out.push_str(r#"<g class="upgrade-legend">"#);
    for (i, (label, fill)) in legend().iter().enumerate() {
        let x = 12.0 + i as f64 * LEGEND_STEP;
        let _ = write!(
            out,
            r#"<rect x="{}" y="12" width="{LEGEND_SWATCH}" height="{LEGEND_SWATCH}" fill="{fill}"/><text x="{}" y="21">{label}</text>"#,
            fmt(x),
            fmt(x + LEGEND_SWATCH + 4.0)
        );
    }
    out.push_str("</g>");
}

/// Two decimals at most, no trailing zeros.
fn fmt(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{rounded:.2}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetaAssociations, UpgradeRecord};
    use crate::timeline::TimelineModel;
    use crate::viewport::Viewport;
    use crate::TimelineConfig;
    use chrono::NaiveDate;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt(12.0), "12");
        assert_eq!(fmt(12.5), "12.5");
        assert_eq!(fmt(1.0 / 3.0), "0.33");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn document_carries_view_box_and_items() {
        let records = vec![UpgradeRecord {
            date: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
            upgrade_name: "Shapella <EL>".into(),
            items: vec!["EIP-4895".into(), "EIP-3651-removed".into()],
            layer: None,
            block_number: Some(17_034_870),
            fork_epoch: None,
        }];
        let model = TimelineModel::build(&records, &MetaAssociations::new());
        let scene = Scene::build(&model, &TimelineConfig::default());

        let mut viewport = Viewport::default();
        viewport.zoom_in();
        let svg = render_svg(&scene, viewport.view_box(scene.size()));

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(&format!(r#"viewBox="{}""#, viewport.view_box(scene.size()))));
        assert!(svg.contains(">EIP-4895</text>"));
        assert!(svg.contains("upgrade-item--removed"));
        assert!(svg.contains("Shapella &lt;EL&gt;"));
        assert!(svg.contains("Block 17034870"));
    }
}
