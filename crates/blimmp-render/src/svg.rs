//! Standalone SVG output for a [`Scene`].

use std::fmt::Write as _;

use crate::curve::fmt_path;
use crate::encode::NodeFill;
use crate::legend::{Legend, LegendKind, LegendPanel, PANEL_TITLE};
use crate::scene::{Scene, SceneEdge, SceneNode, SummaryTable};

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

pub fn escape_xml_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Attribute number: integral values without a fraction, no `-0`, no float noise.
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == 0.0 {
        return "0".to_string();
    }
    fmt_path(v)
}

fn gradient_id(kind: LegendKind) -> &'static str {
    match kind {
        LegendKind::Score => "legend-score",
        LegendKind::Significance => "legend-significance",
        LegendKind::NodeOccurrence => "legend-node-occurrence",
        LegendKind::EdgeOccurrence => "legend-edge-occurrence",
    }
}

pub fn render_svg(scene: &Scene) -> String {
    let mut out = String::with_capacity(4096 + scene.nodes.len() * 512);
    let w = num(scene.width);
    let h = num(scene.height);
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" data-module="{}" data-score-view="{}">"#,
        escape_xml(&scene.module_id),
        scene.score_view.label(),
    );
    let _ = write!(&mut out, "<title>{}</title>", escape_xml(&scene.caption));

    write_defs(&mut out, scene);

    out.push_str(r#"<g class="edges">"#);
    for edge in &scene.edges {
        write_edge(&mut out, edge);
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in &scene.nodes {
        write_node(&mut out, scene, node);
    }
    out.push_str("</g>");

    write_legend(&mut out, &scene.legend);
    if let Some(table) = &scene.summary {
        write_summary(&mut out, table);
    }

    out.push_str("</svg>\n");
    out
}

fn write_defs(out: &mut String, scene: &Scene) {
    out.push_str("<defs>");
    for edge in &scene.edges {
        let _ = write!(
            out,
            r#"<marker id="arrow-{}" viewBox="0 -5 10 10" refX="10" refY="0" orient="auto" markerUnits="strokeWidth" markerWidth="{s}" markerHeight="{s}"><path d="M0,-5L10,0L0,5" fill="{}"/></marker>"#,
            edge.index,
            edge.color,
            s = num(scene.arrow_size),
        );
    }
    for legend in &scene.legend.legends {
        let _ = write!(
            out,
            r#"<linearGradient id="{}" x1="0" y1="0" x2="0" y2="1">"#,
            gradient_id(legend.kind)
        );
        for stop in &legend.stops {
            let _ = write!(
                out,
                r#"<stop offset="{}" stop-color="{}"/>"#,
                num(stop.offset),
                stop.color
            );
        }
        out.push_str("</linearGradient>");
    }
    out.push_str("</defs>");
}

fn write_tooltip(out: &mut String, lines: &[String]) {
    out.push_str("<title>");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        escape_xml_into(out, line);
    }
    out.push_str("</title>");
}

fn write_edge(out: &mut String, edge: &SceneEdge) {
    let class = if edge.placeholder {
        "edge placeholder"
    } else {
        "edge"
    };
    let _ = write!(
        out,
        r#"<path class="{class}" d="{}" fill="none" stroke="{}" stroke-width="{}" marker-end="url(#arrow-{})" data-source="{}" data-target="{}" data-occurrence="{}""#,
        edge.path,
        edge.color,
        num(edge.width),
        edge.index,
        escape_xml(&edge.source),
        escape_xml(&edge.target),
        num(edge.occurrence),
    );
    if edge.placeholder {
        out.push_str(r#" stroke-dasharray="2,2""#);
    }
    out.push('>');
    write_tooltip(out, &edge.tooltip_lines());
    out.push_str("</path>");
}

fn write_node(out: &mut String, scene: &Scene, node: &SceneNode) {
    let r = num(node.radius);
    let stroke = scene.stroke_color;
    let _ = write!(
        out,
        r#"<g class="node" transform="translate({},{})" data-id="{}""#,
        num(node.x),
        num(node.y),
        escape_xml(&node.id),
    );
    if let Some(occ) = node.occurrence {
        let _ = write!(out, r#" data-occurrence="{}""#, num(occ));
    }
    if let Some(s) = node.scores {
        let _ = write!(
            out,
            r#" data-score-before="{}" data-score-after="{}""#,
            num(s.before),
            num(s.after)
        );
    }
    if let Some(e) = node.significance {
        let _ = write!(out, r#" data-significance="{e:e}""#);
    }
    out.push('>');
    write_tooltip(out, &node.tooltip_lines());

    match node.fill {
        NodeFill::Sentinel { color } | NodeFill::Fallback { color } => {
            let _ = write!(
                out,
                r#"<circle r="{r}" fill="{color}" stroke="{stroke}" stroke-width="1"/>"#
            );
        }
        NodeFill::Split {
            score,
            significance,
        } => {
            let _ = write!(
                out,
                r#"<path class="score" d="M-{r},0A{r},{r} 0 0,1 {r},0Z" fill="{score}"/>"#
            );
            let _ = write!(
                out,
                r#"<path class="significance" d="M{r},0A{r},{r} 0 0,1 -{r},0Z" fill="{significance}"/>"#
            );
            let _ = write!(
                out,
                r#"<line x1="-{r}" y1="0" x2="{r}" y2="0" stroke="{stroke}" stroke-width="1"/>"#
            );
            let _ = write!(
                out,
                r#"<circle r="{r}" fill="none" stroke="{stroke}" stroke-width="1"/>"#
            );
        }
    }

    let _ = write!(
        out,
        r##"<text y="{}" text-anchor="middle" font-size="{}" font-weight="bold" fill="#000" pointer-events="none">{}</text>"##,
        num(node.label_dy),
        num(scene.label_font_size),
        escape_xml(&node.label),
    );
    out.push_str("</g>");
}

fn write_legend(out: &mut String, panel: &LegendPanel) {
    if panel.legends.is_empty() {
        return;
    }
    out.push_str(r#"<g class="legend">"#);
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-size="14">{PANEL_TITLE}</text>"#,
        num(panel.x),
        num(panel.y),
    );
    for legend in &panel.legends {
        write_legend_bar(out, legend);
    }
    out.push_str("</g>");
}

fn write_legend_bar(out: &mut String, legend: &Legend) {
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-size="10">{}</text>"#,
        num(legend.x),
        num(legend.title_y()),
        escape_xml(&legend.title),
    );
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#{})"/>"#,
        num(legend.x),
        num(legend.y),
        num(legend.width),
        num(legend.height),
        gradient_id(legend.kind),
    );
    let axis_x = legend.x + legend.width;
    for tick in &legend.ticks {
        let _ = write!(
            out,
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="currentColor"/><text x="{}" y="{y}" dy="0.32em" font-size="10">{}</text>"#,
            num(axis_x),
            num(axis_x + 4.0),
            num(axis_x + 7.0),
            escape_xml(&tick.label),
            y = num(tick.y),
        );
    }
}

fn write_summary(out: &mut String, table: &SummaryTable) {
    out.push_str(r#"<g class="summary">"#);
    for (i, row) in table.rows.iter().enumerate() {
        let y = table.y + table.row_height * (i as f64 + 1.0);
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="11"><tspan font-weight="bold">{}:</tspan> {}</text>"#,
            num(table.x),
            num(y),
            escape_xml(&row.label),
            escape_xml(&row.value),
        );
    }
    out.push_str("</g>");
}
