use cairo::Context;
use cycles::WheelSnapshot;
use cycles::geometry::{PathSegment, RingPath};
use cycles::style::WheelStyle;
use palette::Srgba;
use std::f64::consts::PI;

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn trace(cr: &Context, path: &RingPath) {
    cr.new_path();
    for segment in path.segments() {
        match *segment {
            PathSegment::MoveTo(p) => cr.move_to(p.x, p.y),
            PathSegment::LineTo(p) => cr.line_to(p.x, p.y),
            PathSegment::Arc {
                center,
                radius,
                start_angle,
                sweep_angle,
            } => {
                let (start, end) = (
                    start_angle.to_radians(),
                    (start_angle + sweep_angle).to_radians(),
                );
                // cairo's positive direction is clockwise in screen space as well
                if sweep_angle >= 0.0 {
                    cr.arc(center.x, center.y, radius, start, end);
                } else {
                    cr.arc_negative(center.x, center.y, radius, start, end);
                }
            }
            PathSegment::Close => cr.close_path(),
        }
    }
}

fn draw_ring(
    cr: &Context,
    snapshot: &WheelSnapshot,
    style: &WheelStyle,
) -> Result<(), cairo::Error> {
    let frame = &snapshot.frame;
    cr.save()?;
    cr.translate(frame.center.x, frame.center.y);
    cr.rotate(snapshot.rotation().to_radians());
    cr.translate(-frame.center.x, -frame.center.y);

    // later phases overlap the rounded start onto the previous one
    for (i, path) in frame.arcs.iter().enumerate() {
        trace(cr, path);
        set_color(cr, *style.phase_color(i));
        cr.fill()?;
    }
    cr.restore()
}

fn draw_handle(
    cr: &Context,
    snapshot: &WheelSnapshot,
    style: &WheelStyle,
) -> Result<(), cairo::Error> {
    let handle = &snapshot.frame.handle;
    let center = snapshot.handle_center();

    set_color(cr, *style.handle_outer_color);
    cr.new_path();
    cr.arc(center.x, center.y, handle.outer_radius, 0.0, 2.0 * PI);
    cr.fill()?;

    set_color(cr, *style.handle_inner_color);
    cr.arc(center.x, center.y, handle.inner_radius, 0.0, 2.0 * PI);
    cr.fill()
}

fn draw_day(
    cr: &Context,
    snapshot: &WheelSnapshot,
    style: &WheelStyle,
) -> Result<(), cairo::Error> {
    let frame = &snapshot.frame;
    let text = snapshot.day.to_string();

    set_color(cr, *style.handle_outer_color);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(frame.inner_radius * 0.5);
    if let Ok(ext) = cr.text_extents(&text) {
        cr.move_to(
            frame.center.x - ext.width() / 2.0 - ext.x_bearing(),
            frame.center.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(&text)?;
    }
    Ok(())
}

pub fn draw(
    cr: &Context,
    snapshot: &WheelSnapshot,
    style: &WheelStyle,
) -> Result<(), cairo::Error> {
    if snapshot.frame.is_empty() {
        return Ok(());
    }
    draw_ring(cr, snapshot, style)?;
    draw_day(cr, snapshot, style)?;
    draw_handle(cr, snapshot, style)
}
