//! Utility functions for visualization: palette, CSS color parsing, colorscales, tick steps.

use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [(u8, u8, u8); 10] = [
    (68, 114, 196),  // blue      (#4472C4)
    (237, 125, 49),  // orange    (#ED7D31)
    (165, 165, 165), // gray      (#A5A5A5)
    (255, 192, 0),   // gold      (#FFC000)
    (91, 155, 213),  // light blue(#5B9BD5)
    (112, 173, 71),  // green     (#70AD47)
    (38, 68, 120),   // dark blue (#264478)
    (158, 72, 14),   // dark org. (#9E480E)
    (99, 99, 99),    // dark gray (#636363)
    (153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    let (r, g, b) = OFFICE10[idx % OFFICE10.len()];
    RGBColor(r, g, b).to_rgba()
}

/// Same palette entry as a CSS hex string, for figure specs.
pub fn office_hex(idx: usize) -> String {
    let (r, g, b) = OFFICE10[idx % OFFICE10.len()];
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse the CSS color forms figures use: `#rgb`, `#rrggbb`, `rgb(..)`, `rgba(..)` and a
/// handful of names. Returns `None` for anything else.
pub fn parse_color(s: &str) -> Option<RGBAColor> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let digits: Vec<u8> = match hex.len() {
            3 => hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8))
                .collect::<Option<_>>()?,
            6 => (0..3)
                .map(|i| u8::from_str_radix(hex.get(i * 2..i * 2 + 2)?, 16).ok())
                .collect::<Option<_>>()?,
            _ => return None,
        };
        return Some(RGBAColor(digits[0], digits[1], digits[2], 1.0));
    }
    if let Some(inner) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() < 3 || parts.len() > 4 {
            return None;
        }
        let channel = |p: &str| p.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
        let alpha = match parts.get(3) {
            Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
            None => 1.0,
        };
        return Some(RGBAColor(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ));
    }
    let named = match s.to_ascii_lowercase().as_str() {
        "red" => RED,
        "black" => BLACK,
        "white" => WHITE,
        "blue" => BLUE,
        "green" => GREEN,
        _ => return None,
    };
    Some(named.to_rgba())
}

/// Interpolate a colorscale at `t` in `0..=1`. Stops must be sorted by position.
pub fn colorscale_at(stops: &[(f64, RGBAColor)], t: f64) -> Option<RGBAColor> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let first = stops.first()?;
    if t <= first.0 {
        return Some(first.1);
    }
    for w in stops.windows(2) {
        let ((p0, c0), (p1, c1)) = (w[0], w[1]);
        if t <= p1 {
            let span = p1 - p0;
            let f = if span > 0.0 { (t - p0) / span } else { 1.0 };
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return Some(RGBAColor(
                lerp(c0.0, c1.0),
                lerp(c0.1, c1.1),
                lerp(c0.2, c1.2),
                c0.3 + (c1.3 - c0.3) * f,
            ));
        }
    }
    stops.last().map(|s| s.1)
}

/// A 1/2/5 x 10^k step giving roughly `target` ticks over `span`.
pub fn nice_step(span: f64, target: usize) -> f64 {
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return 1.0;
    }
    let raw = span / target as f64;
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

/// Y tick label with precision shrinking as magnitude grows.
pub fn fmt_tick(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 || a == 0.0 || (v - v.round()).abs() < 1e-9 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_figure_colors() {
        assert_eq!(parse_color("#bbbbbb"), Some(RGBAColor(187, 187, 187, 1.0)));
        assert_eq!(parse_color("#fff"), Some(RGBAColor(255, 255, 255, 1.0)));
        assert_eq!(
            parse_color("rgba(214, 39, 40, 0.85)"),
            Some(RGBAColor(214, 39, 40, 0.85))
        );
        assert_eq!(parse_color("rgba(6,54,21, 0.85)"), Some(RGBAColor(6, 54, 21, 0.85)));
        assert_eq!(parse_color("red"), Some(RED.to_rgba()));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn palette_hex_matches_rgb() {
        assert_eq!(office_hex(0), "#4472c4");
        assert_eq!(office_hex(10), office_hex(0));
        assert_eq!(parse_color(&office_hex(5)), Some(office_color(5)));
    }

    #[test]
    fn colorscale_interpolates_between_stops() {
        let stops = [
            (0.0, RGBAColor(0, 0, 0, 1.0)),
            (0.5, RGBAColor(100, 200, 50, 1.0)),
            (1.0, RGBAColor(200, 200, 200, 0.5)),
        ];
        assert_eq!(colorscale_at(&stops, -3.0), Some(RGBAColor(0, 0, 0, 1.0)));
        assert_eq!(colorscale_at(&stops, 0.25), Some(RGBAColor(50, 100, 25, 1.0)));
        assert_eq!(colorscale_at(&stops, 1.0), Some(RGBAColor(200, 200, 200, 0.5)));
        assert_eq!(colorscale_at(&[], 0.5), None);
    }

    #[test]
    fn nice_steps() {
        assert_eq!(nice_step(100.0, 10), 10.0);
        assert_eq!(nice_step(80.0, 8), 10.0);
        assert_eq!(nice_step(7.0, 10), 1.0);
        assert_eq!(nice_step(0.0, 10), 1.0);
        assert_eq!(fmt_tick(-20.0), "-20");
        assert_eq!(fmt_tick(2.5), "2.50");
    }
}
