//! SVG path data for routed edges.

use std::fmt::Write as _;

use blimmp_layout::Point;

/// Appends `v` the way `d3-path` stringifies coordinates: rounded half-up to 3 decimals, trailing
/// zeros trimmed, never `-0`.
pub fn fmt_path_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }
    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return;
    }
    if k < 0 {
        out.push('-');
    }
    let abs = k.unsigned_abs();
    let _ = write!(out, "{}", abs / 1000);
    let frac = abs % 1000;
    if frac != 0 {
        let digits = format!("{frac:03}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

pub fn fmt_path(v: f64) -> String {
    let mut out = String::new();
    fmt_path_into(&mut out, v);
    out
}

fn emit_pair(out: &mut String, cmd: char, x: f64, y: f64) {
    out.push(cmd);
    fmt_path_into(out, x);
    out.push(',');
    fmt_path_into(out, y);
}

fn emit_cubic(out: &mut String, c: [f64; 6]) {
    out.push('C');
    for (i, v) in c.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        fmt_path_into(out, v);
    }
}

fn basis_point(out: &mut String, p0: Point, p1: Point, p: Point) {
    emit_cubic(
        out,
        [
            (2.0 * p0.x + p1.x) / 3.0,
            (2.0 * p0.y + p1.y) / 3.0,
            (p0.x + 2.0 * p1.x) / 3.0,
            (p0.y + 2.0 * p1.y) / 3.0,
            (p0.x + 4.0 * p1.x + p.x) / 6.0,
            (p0.y + 4.0 * p1.y + p.y) / 6.0,
        ],
    );
}

/// Uniform cubic B-spline through `points` (d3 `curveBasis`): starts and ends exactly on the
/// first and last point, approximates the ones in between.
pub fn curve_basis_path_d(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len().saturating_mul(64));
    let mut state = 0u8;
    let mut p0 = Point::new(f64::NAN, f64::NAN);
    let mut p1 = p0;

    for &p in points {
        match state {
            0 => {
                state = 1;
                emit_pair(&mut out, 'M', p.x, p.y);
            }
            1 => state = 2,
            2 => {
                state = 3;
                emit_pair(
                    &mut out,
                    'L',
                    (5.0 * p0.x + p1.x) / 6.0,
                    (5.0 * p0.y + p1.y) / 6.0,
                );
                basis_point(&mut out, p0, p1, p);
            }
            _ => basis_point(&mut out, p0, p1, p),
        }
        p0 = p1;
        p1 = p;
    }

    match state {
        3 => {
            basis_point(&mut out, p0, p1, p1);
            emit_pair(&mut out, 'L', p1.x, p1.y);
        }
        2 => emit_pair(&mut out, 'L', p1.x, p1.y),
        _ => {}
    }
    out
}

/// Pulls the last point back along the final segment by `distance`, so the line stops at the
/// target's outline instead of its center. Segments shorter than `distance` are left alone.
pub fn trim_end(points: &[Point], distance: f64) -> Vec<Point> {
    let mut out = points.to_vec();
    let n = out.len();
    if n < 2 || distance.is_nan() || distance <= 0.0 {
        return out;
    }
    let (a, b) = (out[n - 2], out[n - 1]);
    let len = (b.x - a.x).hypot(b.y - a.y);
    if len <= distance {
        return out;
    }
    let k = (len - distance) / len;
    out[n - 1] = Point::new(a.x + (b.x - a.x) * k, a.y + (b.y - a.y) * k);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_d3_path() {
        assert_eq!(fmt_path(1.0), "1");
        assert_eq!(fmt_path(1.23456), "1.235");
        assert_eq!(fmt_path(-0.0001), "0");
        assert_eq!(fmt_path(-2.5), "-2.5");
        assert_eq!(fmt_path(10.05), "10.05");
    }

    #[test]
    fn two_points_become_a_line() {
        let d = curve_basis_path_d(&[Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
        assert_eq!(d, "M0,0L10,20");
    }

    #[test]
    fn three_points_use_cubic_segments() {
        let d = curve_basis_path_d(&[
            Point::new(0.0, 0.0),
            Point::new(6.0, 6.0),
            Point::new(12.0, 0.0),
        ]);
        assert!(d.starts_with("M0,0L1,1C"));
        assert!(d.ends_with("L12,0"));
    }

    #[test]
    fn trim_end_stops_short_of_target() {
        let trimmed = trim_end(&[Point::new(0.0, 0.0), Point::new(0.0, 100.0)], 10.0);
        assert_eq!(trimmed[1], Point::new(0.0, 90.0));
        let untouched = trim_end(&[Point::new(0.0, 0.0), Point::new(0.0, 5.0)], 10.0);
        assert_eq!(untouched[1], Point::new(0.0, 5.0));
    }
}
