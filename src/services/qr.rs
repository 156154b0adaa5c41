use anyhow::Result;
use qrcode::{render::svg, EcLevel, QrCode};

use crate::models::lecture::CategoryPath;

const QR_SIZE: u32 = 250;
const CAPTION_LINE_HEIGHT: u32 = 20;
const CAPTION_MARGIN: u32 = 8;
const MAX_CAPTION_CHARS: usize = 25;

/// Caption printed under a lecture's QR code.
pub fn caption_lines(group_name: &str, category: &CategoryPath) -> Vec<String> {
    let mut lines = Vec::new();

    let name = group_name.trim();
    if !name.is_empty() {
        lines.push(truncate(name));
    }
    if category.is_complete() {
        lines.push(truncate(&format!("({}>{})", category.main, category.sub)));
    }
    lines
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_CAPTION_CHARS {
        let head: String = text.chars().take(MAX_CAPTION_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Renders `data` as an SVG QR code with the caption lines below it.
pub fn render_svg(data: &str, caption: &[String]) -> Result<String> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| anyhow::anyhow!("QR encoding failed: {:?}", e))?;

    let rendered = code
        .render::<svg::Color>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .max_dimensions(QR_SIZE, QR_SIZE)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    if caption.is_empty() {
        return Ok(rendered);
    }

    // Drop the XML prolog so the code can be nested in the captioned image
    let inner = rendered.find("<svg").map(|start| &rendered[start..]).unwrap_or(&rendered);
    let width = QR_SIZE;
    let height = QR_SIZE + CAPTION_MARGIN + CAPTION_LINE_HEIGHT * caption.len() as u32 + CAPTION_MARGIN;

    let mut svg_doc = format!(
        r##"<?xml version="1.0" standalone="yes"?><svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="#ffffff"/>"##,
        w = width,
        h = height,
    );
    svg_doc.push_str(inner);

    for (index, line) in caption.iter().enumerate() {
        let y = QR_SIZE + CAPTION_MARGIN + CAPTION_LINE_HEIGHT * (index as u32 + 1) - 4;
        svg_doc.push_str(&format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="14" fill="#000000">{text}</text>"##,
            x = width / 2,
            y = y,
            text = escape_xml(line),
        ));
    }
    svg_doc.push_str("</svg>");

    Ok(svg_doc)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
