pub mod comparison;

pub use comparison::ComparisonChart;

use data::chart::comparison::{Primitive, Scene};
use iced::widget::canvas;
use iced::{Alignment, Point};

use crate::style;

/// Replays a rendered scene onto `frame` in paint order.
pub fn fill_scene(frame: &mut canvas::Frame, scene: &Scene) {
    for primitive in &scene.primitives {
        match primitive {
            Primitive::FillRect {
                top_left,
                size,
                color,
            } => frame.fill_rectangle(*top_left, *size, *color),
            Primitive::Line { from, to, style } => {
                let path = canvas::Path::line(*from, *to);
                frame.stroke(&path, style::stroke(style));
            }
            Primitive::Polyline { points, style } => {
                if let Some(path) = polyline(points) {
                    frame.stroke(&path, style::stroke(style));
                }
            }
            Primitive::Dot {
                center,
                radius,
                color,
            } => frame.fill(&canvas::Path::circle(*center, *radius), *color),
            Primitive::Label {
                text,
                position,
                color,
                size,
            } => frame.fill_text(canvas::Text {
                content: text.clone(),
                position: *position,
                color: *color,
                size: (*size).into(),
                font: style::BOLD,
                align_x: Alignment::Center.into(),
                align_y: Alignment::Start.into(),
                ..Default::default()
            }),
        }
    }
}

fn polyline(points: &[Point]) -> Option<canvas::Path> {
    let (first, rest) = points.split_first()?;

    let mut builder = canvas::path::Builder::new();
    builder.move_to(*first);
    for point in rest {
        builder.line_to(*point);
    }
    Some(builder.build())
}
