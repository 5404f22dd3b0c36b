use blimmp_layout::LayoutConfig;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::scale::Padding;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub bar_width: f64,
    pub bar_height: f64,
    /// Horizontal distance from the plot's right edge to the legend column.
    pub inset: f64,
    /// Vertical space between stacked legends.
    pub spacing: f64,
    pub ticks: usize,
    /// Color stops written per gradient.
    pub stops: usize,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            bar_width: 20.0,
            bar_height: 100.0,
            inset: 20.0,
            spacing: 30.0,
            ticks: 3,
            stops: 11,
        }
    }
}

/// Everything that shapes a render, loadable from JSON with every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_width: f64,
    pub height: f64,
    pub padding: Padding,
    pub layout: LayoutConfig,
    /// Width and height of the layout box reserved for every node.
    pub node_size: f64,
    pub radius_range: [f64; 2],
    pub edge_width_range: [f64; 2],
    /// `log10(E-value)` domain of the significance color.
    pub significance_domain: [f64; 2],
    pub significance_colors: [Rgb; 2],
    pub neutral_color: Rgb,
    pub sentinel_color: Rgb,
    pub stroke_color: Rgb,
    /// Label distance beyond the shape; negative places the label above.
    pub label_offset: f64,
    pub label_font_size: f64,
    /// Arrow head length in stroke-width units.
    pub arrow_size: f64,
    /// Extra pointer tolerance around edges.
    pub edge_hit_slop: f64,
    pub tooltip_offset: [f64; 2],
    pub legend: LegendConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_width: 1750.0,
            height: 1200.0,
            padding: Padding::default(),
            layout: LayoutConfig::default(),
            node_size: 40.0,
            radius_range: [5.0, 20.0],
            edge_width_range: [1.0, 3.0],
            significance_domain: [-50.0, 0.0],
            significance_colors: [Rgb::new(0xff, 0x00, 0x00), Rgb::WHITE],
            neutral_color: Rgb::new(0x88, 0x88, 0x88),
            sentinel_color: Rgb::new(0x2c, 0x7f, 0xb8),
            stroke_color: Rgb::BLACK,
            label_offset: -4.0,
            label_font_size: 12.0,
            arrow_size: 4.0,
            edge_hit_slop: 4.0,
            tooltip_offset: [5.0, -28.0],
            legend: LegendConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_width", self.max_width),
            ("height", self.height),
            ("node_size", self.node_size),
            ("legend.bar_width", self.legend.bar_width),
            ("legend.bar_height", self.legend.bar_height),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a positive number, got {v}"),
                });
            }
        }

        let non_negative = [
            ("layout.nodesep", self.layout.nodesep),
            ("layout.ranksep", self.layout.ranksep),
            ("layout.edgesep", self.layout.edgesep),
            ("layout.self_loop_size", self.layout.self_loop_size),
            ("padding.top", self.padding.top),
            ("padding.right", self.padding.right),
            ("padding.bottom", self.padding.bottom),
            ("padding.left", self.padding.left),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {v}"),
                });
            }
        }

        let ranges = [
            ("radius_range", self.radius_range),
            ("edge_width_range", self.edge_width_range),
            ("significance_domain", self.significance_domain),
        ];
        for (name, [lo, hi]) in ranges {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be an ordered pair of numbers, got [{lo}, {hi}]"),
                });
            }
        }

        if self.legend.ticks < 2 || self.legend.stops < 2 {
            return Err(Error::InvalidConfig {
                message: "legend.ticks and legend.stops must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}
