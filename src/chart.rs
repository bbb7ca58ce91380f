// src/chart.rs
//! Line chart of a price history, laid out in pixel space and written as SVG.
use crate::models::PricePoint;
use serde::Serialize;
use std::fmt::Write;

pub const GRID_COLOR: &str = "#e5e7eb";
const HORIZONTAL_DIVISIONS: u32 = 5;
const VERTICAL_DIVISIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub line_color: String,
    pub fill_color: String,
    pub show_grid: bool,
    pub show_tooltip: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            width: 500.0,
            height: 300.0,
            line_color: "#4f46e5".to_string(),
            fill_color: "rgba(79, 70, 229, 0.1)".to_string(),
            show_grid: true,
            show_tooltip: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLine {
    pub from: ChartPoint,
    pub to: ChartPoint,
}

/// Maps indices and prices onto the canvas. The price axis is padded 2%
/// below the minimum and 2% above the maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min_price: f64,
    pub max_price: f64,
    width: f64,
    height: f64,
    len: usize,
}

impl Scale {
    pub fn new(data: &[PricePoint], width: f64, height: f64) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let low = data.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let high = data.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);

        Some(Scale {
            min_price: low * 0.98,
            max_price: high * 1.02,
            width,
            height,
            len: data.len(),
        })
    }

    pub fn range(&self) -> f64 {
        self.max_price - self.min_price
    }

    pub fn x(&self, index: usize) -> f64 {
        if self.len < 2 {
            return 0.0;
        }
        index as f64 / (self.len - 1) as f64 * self.width
    }

    pub fn y(&self, price: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            return self.height / 2.0;
        }
        self.height - (price - self.min_price) / range * self.height
    }

    /// Index of the point nearest to a horizontal pointer offset.
    pub fn index_at(&self, pointer_x: f64) -> Option<usize> {
        if self.width <= 0.0 {
            return None;
        }
        let span = self.len.saturating_sub(1) as f64;
        let index = (pointer_x / self.width * span + 0.5).floor();
        if index >= 0.0 && index < self.len as f64 {
            Some(index as usize)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub index: usize,
    pub left: f64,
    pub top: f64,
    pub date: String,
    pub price: String,
}

pub fn tooltip_at(data: &[PricePoint], scale: &Scale, pointer_x: f64) -> Option<Tooltip> {
    let index = scale.index_at(pointer_x)?;
    let point = data.get(index)?;
    Some(Tooltip {
        index,
        left: scale.x(index) + 10.0,
        top: scale.y(point.price) - 40.0,
        date: point.date.clone(),
        price: format!("${:.2}", point.price),
    })
}

pub fn grid_lines(width: f64, height: f64) -> Vec<GridLine> {
    let horizontal = (0..=HORIZONTAL_DIVISIONS).map(|i| {
        let y = f64::from(i) / f64::from(HORIZONTAL_DIVISIONS) * height;
        GridLine {
            from: ChartPoint { x: 0.0, y },
            to: ChartPoint { x: width, y },
        }
    });
    let vertical = (0..=VERTICAL_DIVISIONS).map(|i| {
        let x = f64::from(i) / f64::from(VERTICAL_DIVISIONS) * width;
        GridLine {
            from: ChartPoint { x, y: 0.0 },
            to: ChartPoint { x, y: height },
        }
    });
    horizontal.chain(vertical).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub scale: Scale,
    pub line: Vec<ChartPoint>,
    /// The line closed down to the bottom edge.
    pub fill: Vec<ChartPoint>,
    pub grid: Vec<GridLine>,
}

pub fn layout(data: &[PricePoint], options: &ChartOptions) -> Option<ChartLayout> {
    let scale = Scale::new(data, options.width, options.height)?;

    let line: Vec<ChartPoint> = data
        .iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            x: scale.x(i),
            y: scale.y(p.price),
        })
        .collect();

    let mut fill = line.clone();
    fill.push(ChartPoint {
        x: options.width,
        y: options.height,
    });
    fill.push(ChartPoint {
        x: 0.0,
        y: options.height,
    });

    let grid = if options.show_grid {
        grid_lines(options.width, options.height)
    } else {
        Vec::new()
    };

    Some(ChartLayout {
        scale,
        line,
        fill,
        grid,
    })
}

fn path_points(points: &[ChartPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the chart as a standalone SVG document, or `None` for an empty
/// history.
pub fn render_svg(data: &[PricePoint], options: &ChartOptions) -> Option<String> {
    let chart = layout(data, options)?;
    let mut svg = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = options.width,
        h = options.height
    );

    if !chart.grid.is_empty() {
        let _ = writeln!(
            svg,
            r#"<g class="grid" stroke="{}" stroke-width="0.5">"#,
            GRID_COLOR
        );
        for line in &chart.grid {
            let _ = writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
                line.from.x, line.from.y, line.to.x, line.to.y
            );
        }
        let _ = writeln!(svg, "</g>");
    }

    let _ = writeln!(
        svg,
        r#"<polygon class="fill" points="{}" fill="{}" stroke="none"/>"#,
        path_points(&chart.fill),
        options.fill_color
    );
    let _ = writeln!(
        svg,
        r#"<polyline class="line" points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        path_points(&chart.line),
        options.line_color
    );

    if options.show_tooltip {
        let _ = writeln!(svg, r#"<g class="tooltips">"#);
        for (point, price) in chart.line.iter().zip(data) {
            let _ = writeln!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="3" fill-opacity="0"><title>{} ${:.2}</title></circle>"#,
                point.x, point.y, price.date, price.price
            );
        }
        let _ = writeln!(svg, "</g>");
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: format!("2024-01-{:02}", i + 1),
                price,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn empty_history_draws_nothing() {
        assert!(layout(&[], &ChartOptions::default()).is_none());
        assert!(render_svg(&[], &ChartOptions::default()).is_none());
    }

    #[test]
    fn points_span_the_canvas() {
        let data = history(&[100.0, 150.0, 200.0]);
        let chart = layout(&data, &ChartOptions::default()).unwrap();

        assert!((chart.scale.min_price - 98.0).abs() < 1e-9);
        assert!((chart.scale.max_price - 204.0).abs() < 1e-9);
        assert_eq!(chart.line[0].x, 0.0);
        assert_eq!(chart.line[1].x, 250.0);
        assert_eq!(chart.line[2].x, 500.0);
        // highest price sits below the top edge because of the padding
        assert!(chart.line[2].y > 0.0 && chart.line[2].y < chart.line[0].y);
        let expected = 300.0 - (100.0 - chart.scale.min_price) / chart.scale.range() * 300.0;
        assert!((chart.line[0].y - expected).abs() < 1e-9);
    }

    #[test]
    fn fill_closes_along_the_bottom() {
        let data = history(&[10.0, 12.0]);
        let chart = layout(&data, &ChartOptions::default()).unwrap();
        let n = chart.fill.len();
        assert_eq!(n, 4);
        assert_eq!(chart.fill[n - 2], ChartPoint { x: 500.0, y: 300.0 });
        assert_eq!(chart.fill[n - 1], ChartPoint { x: 0.0, y: 300.0 });
    }

    #[test]
    fn grid_has_six_rows_and_eleven_columns() {
        let grid = grid_lines(500.0, 300.0);
        assert_eq!(grid.len(), 17);
        assert!((grid[1].from.y - 60.0).abs() < 1e-9);
        assert!((grid[7].from.x - 50.0).abs() < 1e-9);

        let options = ChartOptions {
            show_grid: false,
            ..ChartOptions::default()
        };
        let chart = layout(&history(&[1.0, 2.0]), &options).unwrap();
        assert!(chart.grid.is_empty());
    }

    #[test]
    fn single_point_and_flat_zero_series_are_guarded() {
        let chart = layout(&history(&[5.0]), &ChartOptions::default()).unwrap();
        assert_eq!(chart.line[0].x, 0.0);
        assert!(chart.line[0].y.is_finite());

        let flat = layout(&history(&[0.0, 0.0]), &ChartOptions::default()).unwrap();
        assert_eq!(flat.line[1].y, 150.0);
    }

    #[test]
    fn hover_snaps_to_the_nearest_point() {
        let data = history(&[100.0, 110.0, 120.0, 130.0, 140.0]);
        let scale = Scale::new(&data, 500.0, 300.0).unwrap();

        let tip = tooltip_at(&data, &scale, 130.0).unwrap();
        assert_eq!(tip.index, 1);
        assert_eq!(tip.left, 135.0);
        assert_eq!(tip.date, "2024-01-02");
        assert_eq!(tip.price, "$110.00");
        assert!((tip.top - (scale.y(110.0) - 40.0)).abs() < 1e-9);

        assert!(tooltip_at(&data, &scale, 900.0).is_none());
        assert!(tooltip_at(&data, &scale, -200.0).is_none());
    }

    #[test]
    fn svg_contains_line_fill_and_grid() {
        let svg = render_svg(&history(&[1.0, 2.0, 3.0]), &ChartOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="line""#));
        assert!(svg.contains(r#"class="fill""#));
        assert_eq!(svg.matches("<line ").count(), 17);
        assert!(svg.contains("<title>2024-01-03 $3.00</title>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
