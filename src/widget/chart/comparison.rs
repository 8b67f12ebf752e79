use chrono::NaiveDate;
use data::ChartDataset;
use data::chart::Series;
use data::chart::comparison::{
    self, ChartPalette, PlottedPoint, RenderError, RenderOptions, RenderSession, Tooltip,
};
use iced::widget::canvas;
use iced::{Alignment, Point, Rectangle, Renderer, Size, Theme, mouse};

use crate::style;

const TOOLTIP_PADDING: f32 = 8.0;
const TOOLTIP_OFFSET: f32 = 12.0;
const TOOLTIP_LINE_GAP: f32 = 4.0;
const HOVER_RING: f32 = 5.5;

/// Period-over-period line chart drawn on an iced canvas.
pub struct ComparisonChart<'a> {
    dataset: &'a ChartDataset,
    options: RenderOptions,
    palette: Option<ChartPalette>,
}

/// Identifies the hovered point across renders, including renders of a new dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hovered {
    series: Series,
    day_index: usize,
    raw_date: NaiveDate,
}

impl Hovered {
    fn of(point: &PlottedPoint) -> Self {
        Self {
            series: point.series,
            day_index: point.day_index,
            raw_date: point.raw_date,
        }
    }

    fn matches(&self, point: &PlottedPoint) -> bool {
        *self == Self::of(point)
    }
}

#[derive(Debug, Default)]
pub struct State {
    hovered: Option<Hovered>,
}

impl<'a> ComparisonChart<'a> {
    pub fn new(dataset: &'a ChartDataset) -> Self {
        Self {
            dataset,
            options: RenderOptions::default(),
            palette: None,
        }
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.options.cumulative = cumulative;
        self
    }

    pub fn measure_name(mut self, name: impl Into<String>) -> Self {
        self.options.measure_name = Some(name.into());
        self
    }

    pub fn padding(mut self, padding: comparison::Padding) -> Self {
        self.options.padding = padding;
        self
    }

    /// Overrides the theme-derived colours.
    pub fn palette(mut self, palette: ChartPalette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn view<Message: 'a>(self) -> iced::Element<'a, Message> {
        iced::widget::Canvas::new(self)
            .width(iced::Length::Fill)
            .height(iced::Length::Fill)
            .into()
    }

    fn resolve_palette(&self, theme: &Theme) -> ChartPalette {
        self.palette
            .unwrap_or_else(|| style::chart_palette(theme.extended_palette()))
    }

    fn session(&self, size: Size, palette: &ChartPalette) -> Result<RenderSession, RenderError> {
        comparison::render(self.dataset, size, &self.options, palette)
    }

    fn hovered_at(&self, bounds: Rectangle, cursor: mouse::Cursor) -> Option<Hovered> {
        let position = cursor.position_in(bounds)?;

        // colours do not affect geometry
        let session = self
            .session(bounds.size(), &ChartPalette::default())
            .ok()?;

        session.hit_test(position).map(Hovered::of)
    }
}

impl<Message> canvas::Program<Message> for ComparisonChart<'_> {
    type State = State;

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let iced::Event::Mouse(mouse_event) = event else {
            return None;
        };

        let hovered = match mouse_event {
            mouse::Event::CursorMoved { .. } => self.hovered_at(bounds, cursor),
            mouse::Event::CursorLeft => None,
            _ => return None,
        };

        if hovered == state.hovered {
            return None;
        }
        state.hovered = hovered;

        Some(canvas::Action::request_redraw())
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let palette = self.resolve_palette(theme);

        let session = match self.session(bounds.size(), &palette) {
            Ok(session) => session,
            Err(e) => {
                log::debug!("Skipping comparison chart draw: {e}");
                return vec![];
            }
        };

        let mut frame = canvas::Frame::new(renderer, bounds.size());

        super::fill_scene(&mut frame, session.scene());

        if let Some(hovered) = state.hovered
            && let Some(point) = session
                .points()
                .iter()
                .find(|p| hovered.matches(p))
        {
            let color = palette.series_color(point.series, session.is_cumulative());
            frame.stroke(
                &canvas::Path::circle(point.position, HOVER_RING),
                canvas::Stroke::default().with_color(color).with_width(2.0),
            );

            let tooltip = session.tooltip(point);
            fill_tooltip(&mut frame, bounds.size(), point, &tooltip, &palette, &session);
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.hovered.is_some() && cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

fn tooltip_lines(tooltip: &Tooltip) -> Vec<&str> {
    let mut lines = vec![tooltip.title.as_str(), tooltip.value_line.as_str()];
    if let Some(period) = &tooltip.period_line {
        lines.push(period);
    }
    lines
}

/// Box placed to the right of the point, flipped left or up when it would overflow.
fn tooltip_rect(anchor: Point, size: Size, surface: Size) -> Rectangle {
    let mut x = anchor.x + TOOLTIP_OFFSET;
    if x + size.width > surface.width {
        x = anchor.x - TOOLTIP_OFFSET - size.width;
    }

    let mut y = anchor.y - size.height - TOOLTIP_OFFSET;
    if y < 0.0 {
        y = anchor.y + TOOLTIP_OFFSET;
    }

    Rectangle {
        x: x.max(0.0),
        y: y.min(surface.height - size.height).max(0.0),
        width: size.width,
        height: size.height,
    }
}

fn fill_tooltip(
    frame: &mut canvas::Frame,
    surface: Size,
    point: &PlottedPoint,
    tooltip: &Tooltip,
    palette: &ChartPalette,
    session: &RenderSession,
) {
    let lines = tooltip_lines(tooltip);
    let text_size = style::TOOLTIP_TEXT_SIZE;
    let line_h = text_size + TOOLTIP_LINE_GAP;

    // rough glyph width estimate
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = longest as f32 * text_size * 0.6 + TOOLTIP_PADDING * 2.0;
    let height = lines.len() as f32 * line_h + TOOLTIP_PADDING * 2.0 - TOOLTIP_LINE_GAP;

    let rect = tooltip_rect(point.position, Size::new(width, height), surface);
    let (bg, text_color) = style::tooltip_colors(palette, tooltip.series, session.is_cumulative());

    frame.fill_rectangle(rect.position(), rect.size(), bg);

    for (i, line) in lines.into_iter().enumerate() {
        frame.fill_text(canvas::Text {
            content: line.to_string(),
            position: Point::new(
                rect.x + TOOLTIP_PADDING,
                rect.y + TOOLTIP_PADDING + i as f32 * line_h,
            ),
            color: text_color,
            size: text_size.into(),
            font: if i == 0 { style::BOLD } else { iced::Font::DEFAULT },
            align_x: Alignment::Start.into(),
            align_y: Alignment::Start.into(),
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::PeriodType;
    use data::chart::comparison::render;
    use data::chart::{ChartMetadata, SeriesPoint};

    fn dataset(start: NaiveDate, values: &[f64]) -> ChartDataset {
        let current = values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(i + 1, *v, start + chrono::TimeDelta::days(i as i64)))
            .collect();
        ChartDataset {
            comparison: Vec::new(),
            current,
            metadata: ChartMetadata {
                total_days: 7,
                yesterday_index: values.len(),
                yesterday_label: "3/3".into(),
                period: PeriodType::Rolling7,
            },
        }
    }

    #[test]
    fn hover_does_not_carry_over_to_another_dataset() {
        let size = Size::new(600.0, 300.0);
        let options = RenderOptions::default();
        let palette = ChartPalette::default();

        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();

        let before = render(&dataset(march, &[1.0, 2.0]), size, &options, &palette).unwrap();
        let hovered = Hovered::of(&before.points()[1]);
        assert!(hovered.matches(&before.points()[1]));
        assert!(!hovered.matches(&before.points()[0]));

        let after = render(&dataset(april, &[1.0, 2.0]), size, &options, &palette).unwrap();
        assert_eq!(after.points()[1].day_index, hovered.day_index);
        assert!(after.points().iter().all(|p| !hovered.matches(p)));
    }

    #[test]
    fn tooltip_flips_near_edges() {
        let surface = Size::new(300.0, 200.0);
        let size = Size::new(100.0, 50.0);

        let r = tooltip_rect(Point::new(50.0, 100.0), size, surface);
        assert_eq!((r.x, r.y), (62.0, 38.0));

        let r = tooltip_rect(Point::new(250.0, 20.0), size, surface);
        assert_eq!((r.x, r.y), (138.0, 32.0));
    }

    #[test]
    fn period_line_only_when_present() {
        let mut tooltip = Tooltip {
            series: Series::Current,
            title: "Current: 3/14".into(),
            value_line: "Sales: 1.2K".into(),
            period_line: None,
        };
        assert_eq!(tooltip_lines(&tooltip).len(), 2);

        tooltip.period_line = Some("Period: 300".into());
        assert_eq!(
            tooltip_lines(&tooltip),
            vec!["Current: 3/14", "Sales: 1.2K", "Period: 300"]
        );
    }
}
