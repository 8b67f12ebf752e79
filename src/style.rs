use data::chart::Series;
use data::chart::comparison::{ChartPalette, LineStyle};
use iced::theme::palette::Extended;
use iced::widget::canvas::{LineDash, Stroke};
use iced::{Color, Font, font};

pub const TOOLTIP_TEXT_SIZE: f32 = 12.0;

pub const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::DEFAULT
};

/// Chart colours for the active theme; light themes keep the stock palette.
pub fn chart_palette(palette: &Extended) -> ChartPalette {
    let base = ChartPalette::default();

    if !palette.is_dark {
        return base;
    }

    ChartPalette {
        background: palette.background.weak.color,
        bounds_line: palette.background.strong.color,
        anchor_line: palette.background.strongest.color,
        anchor_label: palette.background.base.text.scale_alpha(0.8),
        ..base
    }
}

pub fn stroke(style: &LineStyle) -> Stroke<'_> {
    let stroke = Stroke::default()
        .with_color(style.color)
        .with_width(style.width);

    match &style.dash {
        Some(segments) => Stroke {
            line_dash: LineDash {
                segments,
                offset: 0,
            },
            ..stroke
        },
        None => stroke,
    }
}

/// Tooltip background and text colour for a hovered series.
pub fn tooltip_colors(palette: &ChartPalette, series: Series, cumulative: bool) -> (Color, Color) {
    let accent = palette.series_color(series, cumulative);
    (accent.scale_alpha(0.92), Color::WHITE)
}
