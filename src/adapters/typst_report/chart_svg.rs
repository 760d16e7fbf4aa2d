//! SVG chart rendering for reports.
//!
//! Charts are plain SVG strings embedded into Typst via `image.decode`.
//! Undefined indicator points break a line into separate segments rather
//! than being interpolated.

use crate::domain::analysis::Analysis;
use crate::domain::indicator::chop_zone::zone_colour;
use crate::domain::indicator::{IndicatorSeries, IndicatorValue};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 40.0;
const STRIP_HEIGHT: f64 = 48.0;
const UNDEFINED_FILL: &str = "#EEEEEE";

const CLOSE_COLOUR: &str = "#1F77B4";
const FAST_COLOUR: &str = "#FF7F0E";
const SLOW_COLOUR: &str = "#2CA02C";
const BAND_COLOUR: &str = "#9467BD";
const SPAN_A_COLOUR: &str = "#26A69A";
const SPAN_B_COLOUR: &str = "#EF5350";
const FORECAST_COLOUR: &str = "#D62728";

/// One line to draw: values indexed by x position.
struct Line<'a> {
    values: Vec<Option<f64>>,
    colour: &'a str,
    dashed: bool,
}

/// Maximal runs of defined values as `(index, value)` pairs.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) if y.is_finite() => current.push((i, *y)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn band_values(series: &IndicatorSeries, upper: bool) -> Vec<Option<f64>> {
    series
        .values
        .iter()
        .map(|p| match (p.valid, &p.value) {
            (true, IndicatorValue::Bollinger { upper: u, lower: l, .. }) => {
                Some(if upper { *u } else { *l })
            }
            _ => None,
        })
        .collect()
}

fn span_values(series: &IndicatorSeries, span_a: bool) -> Vec<Option<f64>> {
    series
        .values
        .iter()
        .map(|p| match &p.value {
            IndicatorValue::Ichimoku { span_a: a, span_b: b, .. } => {
                if span_a {
                    *a
                } else {
                    *b
                }
            }
            _ => None,
        })
        .collect()
}

fn render_lines(lines: &[Line], x_count: usize) -> String {
    let (min, max) = lines
        .iter()
        .flat_map(|l| l.values.iter().flatten())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || x_count == 0 {
        return String::new();
    }

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if x_count > 1 {
        plot_width / (x_count - 1) as f64
    } else {
        0.0
    };

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push_str(&format!(
        r##"<line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="#888888"/><line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="#888888"/>"##,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    ));
    svg.push_str(&format!(
        r##"<text x="4" y="{top:.0}" font-size="10" fill="#444444">{max:.2}</text><text x="4" y="{bottom:.0}" font-size="10" fill="#444444">{min:.2}</text>"##,
        top = PADDING + 4.0,
        bottom = HEIGHT - PADDING,
        max = max,
        min = min
    ));

    for line in lines {
        let dash = if line.dashed {
            r#" stroke-dasharray="6,4""#
        } else {
            ""
        };
        for segment in segments(&line.values) {
            let points: Vec<String> = segment
                .iter()
                .map(|&(i, v)| {
                    let x = PADDING + i as f64 * scale_x;
                    let y = HEIGHT - PADDING - (v - min) * scale_y;
                    format!("{:.1},{:.1}", x, y)
                })
                .collect();
            svg.push_str(&format!(
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
                line.colour,
                dash,
                points.join(" ")
            ));
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Close, moving averages, optional overlays and the forecast continuation.
pub fn generate_price_svg(analysis: &Analysis) -> String {
    let n = analysis.series.len();
    if n == 0 {
        return String::new();
    }
    let forecast: &[_] = analysis.forecast.as_deref().unwrap_or(&[]);
    let total = n + forecast.len();
    let pad = |mut v: Vec<Option<f64>>| {
        v.resize(total, None);
        v
    };

    let mut lines = vec![
        Line {
            values: pad(analysis.series.closes().into_iter().map(Some).collect()),
            colour: CLOSE_COLOUR,
            dashed: false,
        },
        Line {
            values: pad(analysis.sma_fast.simple_values()),
            colour: FAST_COLOUR,
            dashed: false,
        },
        Line {
            values: pad(analysis.sma_slow.simple_values()),
            colour: SLOW_COLOUR,
            dashed: false,
        },
    ];

    if let Some(bands) = &analysis.bollinger {
        for upper in [true, false] {
            lines.push(Line {
                values: pad(band_values(bands, upper)),
                colour: BAND_COLOUR,
                dashed: true,
            });
        }
    }
    if let Some(cloud) = &analysis.ichimoku {
        for (span_a, colour) in [(true, SPAN_A_COLOUR), (false, SPAN_B_COLOUR)] {
            lines.push(Line {
                values: pad(span_values(cloud, span_a)),
                colour,
                dashed: false,
            });
        }
    }
    if !forecast.is_empty() {
        // Anchor the forecast on the last close so the line is continuous.
        let mut values = vec![None; total];
        values[n - 1] = analysis.series.bars().last().map(|b| b.close);
        for (i, point) in forecast.iter().enumerate() {
            values[n + i] = Some(point.value);
        }
        lines.push(Line {
            values,
            colour: FORECAST_COLOUR,
            dashed: true,
        });
    }

    render_lines(&lines, total)
}

/// One coloured cell per bar; undefined zones are light grey.
pub fn generate_chop_zone_svg(zones: &[Option<u8>]) -> String {
    if zones.is_empty() {
        return String::new();
    }
    let plot_width = WIDTH - 2.0 * PADDING;
    let cell = plot_width / zones.len() as f64;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = WIDTH,
        h = STRIP_HEIGHT
    );
    for (i, zone) in zones.iter().enumerate() {
        let fill = zone.map(zone_colour).unwrap_or(UNDEFINED_FILL);
        svg.push_str(&format!(
            r#"<rect x="{:.2}" y="4" width="{:.2}" height="{:.0}" fill="{}"/>"#,
            PADDING + i as f64 * cell,
            cell,
            STRIP_HEIGHT - 8.0,
            fill
        ));
    }
    svg.push_str("</svg>");
    svg
}

/// Wrap an SVG string as a Typst image, or return `fallback` when empty.
pub fn embed(svg: &str, fallback: &str) -> String {
    if svg.is_empty() {
        return fallback.to_string();
    }
    format!(
        "#image.decode(\n\"{}\",\n  width: 100%,\n)",
        svg.replace('\\', "\\\\").replace('"', "\\\"")
    )
}
