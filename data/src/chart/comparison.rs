//! Layout of the period-over-period line chart.
//!
//! [`render`] turns a [`ChartDataset`] into an ordered [`Scene`] of pixel-space
//! primitives and returns it inside a [`RenderSession`]. The session also keeps
//! the plotted points, so pointer lookups and tooltips are answered against the
//! exact render they came from.

use chrono::NaiveDate;
use enum_map::{EnumMap, enum_map};
use iced_core::{Color, Point, Rectangle, Size};
use strum::IntoEnumIterator;

use super::{ChartDataset, Series, SeriesPoint};
use crate::util::{abbr_large_numbers, truncate_label};

/// Max pointer distance, in px, for a point to count as hovered.
pub const HIT_THRESHOLD: f32 = 10.0;

const LABEL_GAP: f32 = 6.0;
const LABEL_SIZE: f32 = 11.0;
const DOT_RADIUS: f32 = 3.5;
const DASH: [f32; 2] = [5.0, 5.0];
const MAX_MEASURE_NAME: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 100.0,
            bottom: 30.0,
            left: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Plot running sums instead of per-day values.
    pub cumulative: bool,
    pub measure_name: Option<String>,
    pub padding: Padding,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPalette {
    pub background: Color,
    pub bounds_line: Color,
    pub anchor_line: Color,
    pub anchor_label: Color,
    pub series: EnumMap<Series, Color>,
    pub cumulative_current: Color,
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb8(0xf7, 0xf7, 0xf7),
            bounds_line: Color::from_rgb8(0xe0, 0xe0, 0xe0),
            anchor_line: Color::from_rgb8(0x99, 0x99, 0x99),
            anchor_label: Color::from_rgb8(0x66, 0x66, 0x66),
            series: enum_map! {
                Series::Comparison => Color::from_rgb8(0x99, 0x99, 0x99),
                Series::Current => Color::from_rgb8(0x1f, 0x77, 0xb4),
            },
            cumulative_current: Color::from_rgb8(0x4a, 0x90, 0xe2),
        }
    }
}

impl ChartPalette {
    pub fn series_color(&self, series: Series, cumulative: bool) -> Color {
        match series {
            Series::Current if cumulative => self.cumulative_current,
            _ => self.series[series],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    pub dash: Option<[f32; 2]>,
}

impl LineStyle {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: Some(DASH),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    FillRect {
        top_left: Point,
        size: Size,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        style: LineStyle,
    },
    Polyline {
        points: Vec<Point>,
        style: LineStyle,
    },
    Dot {
        center: Point,
        radius: f32,
        color: Color,
    },
    /// Text anchored at its top-center.
    Label {
        text: String,
        position: Point,
        color: Color,
        size: f32,
    },
}

/// Primitives in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    pub series: Series,
    pub position: Point,
    pub day_index: usize,
    pub label: String,
    pub raw_date: NaiveDate,
    /// Plotted value, a running sum in cumulative mode.
    pub value: f64,
    /// Per-day value before any transform.
    pub original_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub series: Series,
    pub title: String,
    pub value_line: String,
    pub period_line: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("surface has no area ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },
    #[error("padding leaves no room to plot ({width}x{height})")]
    NoPlotArea { width: f32, height: f32 },
    #[error("chart metadata spans zero days")]
    NoDays,
}

/// Pairs of `(plotted, original)` values, running sums when `cumulative`.
pub fn transform_values(points: &[SeriesPoint], cumulative: bool) -> Vec<(f64, f64)> {
    let mut sum = 0.0;
    points
        .iter()
        .map(|p| {
            if cumulative {
                sum += p.value;
                (sum, p.value)
            } else {
                (p.value, p.value)
            }
        })
        .collect()
}

/// Nearest point strictly closer than `threshold`; earlier points win ties.
pub fn nearest_point(
    points: &[PlottedPoint],
    cursor: Point,
    threshold: f32,
) -> Option<&PlottedPoint> {
    let mut best: Option<(&PlottedPoint, f32)> = None;

    for point in points {
        let distance = point.position.distance(cursor);
        if distance >= threshold {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((point, distance)),
        }
    }

    best.map(|(point, _)| point)
}

/// Linear map from value and day index into the plot rectangle.
#[derive(Debug, Clone, Copy)]
struct Projection {
    plot: Rectangle,
    total_days: usize,
    min: f64,
    span: f64,
}

impl Projection {
    fn new(plot: Rectangle, total_days: usize, values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 1.0));

        let span = if max - min == 0.0 { 1.0 } else { max - min };

        Self {
            plot,
            total_days,
            min,
            span,
        }
    }

    fn x(&self, day_index: usize) -> f32 {
        let steps = self.total_days.saturating_sub(1).max(1) as f32;
        self.plot.x + (self.plot.width / steps) * (day_index as f32 - 1.0)
    }

    fn y(&self, value: f64) -> f32 {
        let t = ((value - self.min) / self.span) as f32;
        self.plot.y + self.plot.height - t * self.plot.height
    }

    fn vertical(&self, day_index: usize) -> (Point, Point) {
        let x = self.x(day_index);
        (
            Point::new(x, self.plot.y),
            Point::new(x, self.plot.y + self.plot.height),
        )
    }
}

/// Result of one render: what to paint and what can be hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSession {
    scene: Scene,
    points: Vec<PlottedPoint>,
    plot: Rectangle,
    cumulative: bool,
    measure_name: String,
}

impl RenderSession {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn points(&self) -> &[PlottedPoint] {
        &self.points
    }

    pub fn plot_area(&self) -> Rectangle {
        self.plot
    }

    pub fn is_cumulative(&self) -> bool {
        self.cumulative
    }

    pub fn hit_test(&self, cursor: Point) -> Option<&PlottedPoint> {
        nearest_point(&self.points, cursor, HIT_THRESHOLD)
    }

    pub fn tooltip(&self, point: &PlottedPoint) -> Tooltip {
        let period_line = self
            .cumulative
            .then(|| format!("Period: {}", abbr_large_numbers(point.original_value)));

        Tooltip {
            series: point.series,
            title: format!("{}: {}", point.series, point.label),
            value_line: format!(
                "{}: {}",
                self.measure_name,
                abbr_large_numbers(point.value)
            ),
            period_line,
        }
    }
}

pub fn render(
    dataset: &ChartDataset,
    size: Size,
    options: &RenderOptions,
    palette: &ChartPalette,
) -> Result<RenderSession, RenderError> {
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(RenderError::EmptySurface {
            width: size.width,
            height: size.height,
        });
    }

    let padding = options.padding;
    let plot = Rectangle {
        x: padding.left,
        y: padding.top,
        width: size.width - padding.left - padding.right,
        height: size.height - padding.top - padding.bottom,
    };
    if plot.width <= 0.0 || plot.height <= 0.0 {
        return Err(RenderError::NoPlotArea {
            width: plot.width,
            height: plot.height,
        });
    }

    let metadata = &dataset.metadata;
    if metadata.total_days == 0 {
        return Err(RenderError::NoDays);
    }

    let cumulative = options.cumulative;
    let measure_name = truncate_label(
        options.measure_name.as_deref().unwrap_or("Value"),
        MAX_MEASURE_NAME,
    );

    let values: EnumMap<Series, Vec<(f64, f64)>> =
        EnumMap::from_fn(|series| transform_values(dataset.series(series), cumulative));

    let mut session = RenderSession {
        scene: Scene::default(),
        points: Vec::new(),
        plot,
        cumulative,
        measure_name,
    };

    if dataset.is_empty() {
        return Ok(session);
    }

    let projection = Projection::new(
        plot,
        metadata.total_days,
        values.values().flatten().map(|(plotted, _)| *plotted),
    );

    for series in Series::iter() {
        session.points.extend(
            dataset
                .series(series)
                .iter()
                .zip(&values[series])
                .map(|(point, (plotted, original))| PlottedPoint {
                    series,
                    position: Point::new(projection.x(point.day_index), projection.y(*plotted)),
                    day_index: point.day_index,
                    label: point.label.clone(),
                    raw_date: point.raw_date,
                    value: *plotted,
                    original_value: *original,
                }),
        );
    }

    let polyline = |series: Series| -> Vec<Point> {
        session_points(&session.points, series)
            .map(|p| p.position)
            .collect()
    };
    let comparison = polyline(Series::Comparison);
    let current = polyline(Series::Current);

    let scene = &mut session.scene;

    scene.push(Primitive::FillRect {
        top_left: plot.position(),
        size: plot.size(),
        color: palette.background,
    });

    for day in [1, metadata.total_days] {
        let (from, to) = projection.vertical(day);
        scene.push(Primitive::Line {
            from,
            to,
            style: LineStyle::solid(palette.bounds_line, 1.0),
        });
    }

    let (from, to) = projection.vertical(metadata.yesterday_index);
    scene.push(Primitive::Line {
        from,
        to,
        style: LineStyle::solid(palette.anchor_line, 2.0),
    });
    scene.push(Primitive::Label {
        text: metadata.yesterday_label.clone(),
        position: Point::new(to.x, to.y + LABEL_GAP),
        color: palette.anchor_label,
        size: LABEL_SIZE,
    });

    if !comparison.is_empty() {
        scene.push(Primitive::Polyline {
            points: comparison,
            style: LineStyle::dashed(palette.series_color(Series::Comparison, cumulative), 2.0),
        });
    }

    if !current.is_empty() {
        let color = palette.series_color(Series::Current, cumulative);
        let width = if cumulative { 2.5 } else { 2.0 };

        let dots: Vec<Point> = if cumulative { current.clone() } else { Vec::new() };

        scene.push(Primitive::Polyline {
            points: current,
            style: LineStyle::solid(color, width),
        });
        for center in dots {
            scene.push(Primitive::Dot {
                center,
                radius: DOT_RADIUS,
                color,
            });
        }
    }

    Ok(session)
}

fn session_points(points: &[PlottedPoint], series: Series) -> impl Iterator<Item = &PlottedPoint> {
    points.iter().filter(move |p| p.series == series)
}
