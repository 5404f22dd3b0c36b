//! Layout-space to view-space mapping.
//!
//! Two scale flavours mirror d3: [`LinearScale`] (a degenerate domain maps to the middle of the
//! range) and [`SequentialScale`] (a degenerate domain maps to `t = 0`). The encoder uses both,
//! the view transform only the linear one.

use blimmp_layout::{Bounds, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    pub clamp: bool,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    /// Domain spanning the finite values of `values`, or `None` when there are none.
    pub fn from_extent(values: impl IntoIterator<Item = f64>, range: [f64; 2]) -> Option<Self> {
        extent(values).map(|domain| Self::new(domain, range))
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain[0] == self.domain[1]
    }

    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        let mut t = (v - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }
}

/// Maps a domain onto `t` in `[0, 1]` for an interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequentialScale {
    pub domain: [f64; 2],
    pub clamp: bool,
}

impl SequentialScale {
    pub fn new(domain: [f64; 2]) -> Self {
        Self {
            domain,
            clamp: false,
        }
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn from_extent(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        extent(values).map(Self::new)
    }

    pub fn t(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        if d0 == d1 {
            return 0.0;
        }
        let t = (v - d0) / (d1 - d0);
        if self.clamp { t.clamp(0.0, 1.0) } else { t }
    }
}

/// `[min, max]` over the finite values, like `d3.extent`.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<[f64; 2]> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 250.0,
            bottom: 20.0,
            left: 300.0,
        }
    }
}

/// Smallest share of each viewport dimension the plot keeps once padding is applied.
pub const MIN_PLOT_SHARE: f64 = 0.25;

impl Padding {
    /// The padding actually applied inside `viewport`: scaled down per axis, proportionally,
    /// so the plot keeps at least [`MIN_PLOT_SHARE`] of each dimension.
    pub fn fit(self, viewport: Viewport) -> Self {
        let kx = shrink_factor(self.left + self.right, viewport.width);
        let ky = shrink_factor(self.top + self.bottom, viewport.height);
        Self {
            top: self.top * ky,
            right: self.right * kx,
            bottom: self.bottom * ky,
            left: self.left * kx,
        }
    }
}

fn shrink_factor(total: f64, extent: f64) -> f64 {
    let budget = extent * (1.0 - MIN_PLOT_SHARE);
    if total > budget && total > 0.0 {
        (budget / total).max(0.0)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The drawable width follows the request up to `max_width`; the height is fixed.
    pub fn fit_request(requested_width: f64, max_width: f64, height: f64) -> Self {
        let width = if requested_width.is_finite() && requested_width > 0.0 {
            requested_width.min(max_width)
        } else {
            max_width
        };
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl ViewTransform {
    /// Maps the layout extent onto the viewport minus the fitted padding (see [`Padding::fit`]).
    pub fn fit(extent: Bounds, viewport: Viewport, padding: Padding) -> Self {
        let padding = padding.fit(viewport);
        let x_end = (viewport.width - padding.right).max(padding.left);
        let y_end = (viewport.height - padding.bottom).max(padding.top);
        Self {
            x: LinearScale::new([extent.min_x, extent.max_x], [padding.left, x_end]),
            y: LinearScale::new([extent.min_y, extent.max_y], [padding.top, y_end]),
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.x.apply(p.x), self.y.apply(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scale_maps_domain_to_range() {
        let s = LinearScale::new([1.0, 10.0], [5.0, 20.0]);
        assert_eq!(s.apply(1.0), 5.0);
        assert_eq!(s.apply(10.0), 20.0);
    }

    #[test]
    fn degenerate_domains() {
        assert_eq!(LinearScale::new([3.0, 3.0], [1.0, 3.0]).apply(3.0), 2.0);
        assert_eq!(SequentialScale::new([3.0, 3.0]).t(3.0), 0.0);
    }

    #[test]
    fn extent_skips_non_finite_values() {
        assert_eq!(extent([f64::NAN, 4.0, 1.0, f64::INFINITY]), Some([1.0, 4.0]));
        assert_eq!(extent(std::iter::empty()), None);
    }

    #[test]
    fn viewport_width_is_capped() {
        assert_eq!(Viewport::fit_request(3000.0, 1750.0, 1200.0).width, 1750.0);
        assert_eq!(Viewport::fit_request(900.0, 1750.0, 1200.0).width, 900.0);
    }

    #[test]
    fn padding_is_kept_when_it_fits() {
        let p = Padding::default();
        assert_eq!(p.fit(Viewport::new(1750.0, 1200.0)), p);
        assert_eq!(p.fit(Viewport::new(900.0, 1200.0)), p);
    }

    #[test]
    fn narrow_viewport_shrinks_padding_proportionally() {
        let viewport = Viewport::new(400.0, 1200.0);
        let p = Padding::default().fit(viewport);
        assert!((p.left + p.right - 300.0).abs() < 1e-9);
        assert!((p.left / p.right - 300.0 / 250.0).abs() < 1e-9);
        assert_eq!((p.top, p.bottom), (20.0, 20.0));

        let t = ViewTransform::fit(
            Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 100.0,
                max_y: 100.0,
            },
            viewport,
            Padding::default(),
        );
        let lo = t.apply(Point::new(0.0, 0.0));
        let hi = t.apply(Point::new(100.0, 100.0));
        assert!((lo.x - p.left).abs() < 1e-9);
        assert!((hi.x - (400.0 - p.right)).abs() < 1e-9);
        assert!(lo.x < hi.x);
    }
}
