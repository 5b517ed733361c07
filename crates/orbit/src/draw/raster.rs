use super::DrawOptions;
use cairo::{Context, Format, ImageSurface, LineCap, RadialGradient};
use orbit_layout::Point;
use orbit_layout::scene::{
    CENTER_STROKE_WIDTH, CenterDescriptor, DialTick, ITEM_STROKE_WIDTH, ItemDescriptor,
    OrbitLayer, RingDescriptor, Scene, Surface, TooltipDescriptor, paint,
};
use orbit_layout::style::ItemShape;
use orbit_layout::theme::Color;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::Path;

const GLOW_RINGS: usize = 4;
const GLOW_SPREAD: f64 = 3.0;
const TOOLTIP_PADDING: f64 = 10.0;
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_FONT_SIZE: f64 = 12.0;
const TOOLTIP_RADIUS: f64 = 8.0;

fn set_color(cr: &Context, color: Color, opacity: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * opacity);
}

/// Paints a scene into an image surface the size of the scene.
pub fn render(scene: &Scene, options: &DrawOptions) -> Result<ImageSurface, cairo::Error> {
    let image = ImageSurface::create(
        Format::ARgb32,
        scene.width.ceil().max(1.0) as i32,
        scene.height.ceil().max(1.0) as i32,
    )?;
    let cr = Context::new(&image)?;
    let mut surface = CairoSurface::new(cr, options.elapsed_secs);
    paint(scene, &mut surface)?;
    Ok(image)
}

/// Draws scene descriptors with cairo. With `elapsed_secs` set, orbit
/// rotation and fade-in are evaluated at that instant.
pub struct CairoSurface {
    cr: Context,
    elapsed_secs: Option<f64>,
    icons: HashMap<String, Option<ImageSurface>>,
}

impl CairoSurface {
    pub fn new(cr: Context, elapsed_secs: Option<f64>) -> Self {
        Self {
            cr,
            elapsed_secs,
            icons: HashMap::new(),
        }
    }

    /// Local PNG files only; anything else is skipped.
    fn icon(&mut self, url: &str) -> Option<ImageSurface> {
        self.icons
            .entry(url.to_string())
            .or_insert_with(|| {
                let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
                let is_png = path
                    .extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"));
                if !is_png {
                    log::debug!("Skipping non-PNG icon {}", url);
                    return None;
                }
                fs_err::File::open(path)
                    .map_err(|e| log::warn!("Failed to open icon {}: {}", url, e))
                    .ok()
                    .and_then(|mut file| {
                        ImageSurface::create_from_png(&mut file)
                            .map_err(|e| log::warn!("Failed to decode icon {}: {}", url, e))
                            .ok()
                    })
            })
            .clone()
    }

    fn draw_image(&mut self, url: &str, corner: Point, side: f64) -> Result<(), cairo::Error> {
        let Some(image) = self.icon(url) else {
            return Ok(());
        };
        let (w, h) = (image.width() as f64, image.height() as f64);
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let scale = side / w.max(h);

        let cr = &self.cr;
        cr.save()?;
        cr.translate(
            corner.x + (side - w * scale) / 2.0,
            corner.y + (side - h * scale) / 2.0,
        );
        cr.scale(scale, scale);
        cr.set_source_surface(&image, 0.0, 0.0)?;
        cr.paint()?;
        cr.restore()
    }

    fn centered_text(
        &self,
        at: Point,
        size: f64,
        weight: cairo::FontWeight,
        color: Color,
        text: &str,
    ) -> Result<(), cairo::Error> {
        let cr = &self.cr;
        set_color(cr, color, 1.0);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
        cr.set_font_size(size);
        if let Ok(ext) = cr.text_extents(text) {
            cr.move_to(
                at.x - ext.width() / 2.0 - ext.x_bearing(),
                at.y + ext.height() / 2.0,
            );
            cr.show_text(text)?;
        }
        Ok(())
    }

    fn fade(&self, item: &ItemDescriptor) -> f64 {
        match self.elapsed_secs {
            Some(t) if item.fade_in.duration_secs > 0.0 => {
                ((t - item.fade_in.delay_secs) / item.fade_in.duration_secs).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    fn shape_path(&self, shape: ItemShape, p: Point, r: f64) {
        let cr = &self.cr;
        cr.new_path();
        match shape {
            ItemShape::Circle => cr.arc(p.x, p.y, r, 0.0, 2.0 * PI),
            ItemShape::Square => cr.rectangle(p.x - r, p.y - r, r * 2.0, r * 2.0),
            ItemShape::Diamond => {
                cr.move_to(p.x, p.y - r);
                cr.line_to(p.x + r, p.y);
                cr.line_to(p.x, p.y + r);
                cr.line_to(p.x - r, p.y);
                cr.close_path();
            }
        }
    }

    fn rounded_rect(&self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let cr = &self.cr;
        cr.new_sub_path();
        cr.arc(x + w - radius, y + radius, radius, -PI / 2.0, 0.0);
        cr.arc(x + w - radius, y + h - radius, radius, 0.0, PI / 2.0);
        cr.arc(x + radius, y + h - radius, radius, PI / 2.0, PI);
        cr.arc(x + radius, y + radius, radius, PI, 3.0 * PI / 2.0);
        cr.close_path();
    }
}

impl Surface for CairoSurface {
    type Error = cairo::Error;

    fn begin(&mut self, scene: &Scene) -> Result<(), cairo::Error> {
        set_color(&self.cr, scene.background, 1.0);
        self.cr.paint()
    }

    fn ring(&mut self, ring: &RingDescriptor) -> Result<(), cairo::Error> {
        let cr = &self.cr;
        cr.save()?;
        set_color(cr, ring.stroke, ring.opacity);
        cr.set_line_width(ring.stroke_width);
        if let Some(dash) = &ring.dash {
            cr.set_dash(dash, 0.0);
        }
        cr.new_path();
        cr.arc(ring.center.x, ring.center.y, ring.radius, 0.0, 2.0 * PI);
        cr.stroke()?;
        cr.restore()
    }

    fn dial_tick(&mut self, tick: &DialTick) -> Result<(), cairo::Error> {
        let cr = &self.cr;
        set_color(cr, tick.color, 1.0);
        cr.set_line_width(tick.width);
        cr.set_line_cap(LineCap::Round);
        cr.move_to(tick.inner.x, tick.inner.y);
        cr.line_to(tick.outer.x, tick.outer.y);
        cr.stroke()
    }

    fn center(&mut self, center: &CenterDescriptor) -> Result<(), cairo::Error> {
        let p = center.position;
        {
            let cr = &self.cr;
            let gradient = RadialGradient::new(p.x, p.y, 0.0, p.x, p.y, center.radius);
            let (r, g, b, a) = center.fill.into_components();
            gradient.add_color_stop_rgba(0.0, r, g, b, a);
            gradient.add_color_stop_rgba(1.0, r, g, b, a * 0.8);

            cr.new_path();
            cr.arc(p.x, p.y, center.radius, 0.0, 2.0 * PI);
            cr.set_source(&gradient)?;
            cr.fill_preserve()?;
            set_color(cr, center.text, 0.2);
            cr.set_line_width(CENTER_STROKE_WIDTH);
            cr.stroke()?;
        }

        if let Some(url) = &center.avatar_url {
            self.cr.save()?;
            self.cr.arc(p.x, p.y, center.radius, 0.0, 2.0 * PI);
            self.cr.clip();
            let side = center.radius * 2.0;
            self.draw_image(url, p.offset(-center.radius, -center.radius), side)?;
            self.cr.restore()?;
        }

        let label_y = if center.subtitle.is_some() {
            p.y - center.subtitle_offset / 2.0
        } else {
            p.y
        };
        self.centered_text(
            Point::new(p.x, label_y),
            center.label_size,
            cairo::FontWeight::Bold,
            center.text,
            &center.label,
        )?;
        if let Some(subtitle) = &center.subtitle {
            self.centered_text(
                Point::new(p.x, label_y + center.subtitle_offset),
                center.subtitle_size,
                cairo::FontWeight::Normal,
                center.text.with_alpha(center.text.alpha() * 0.7),
                subtitle,
            )?;
        }
        Ok(())
    }

    fn begin_layer(&mut self, layer: &OrbitLayer, center: Point) -> Result<(), cairo::Error> {
        self.cr.save()?;
        let rotation = self
            .elapsed_secs
            .zip(layer.motion.filter(|m| !m.paused))
            .map(|(t, motion)| motion.rotation_at(t));
        if let Some(angle) = rotation {
            self.cr.translate(center.x, center.y);
            self.cr.rotate(angle);
            self.cr.translate(-center.x, -center.y);
        }
        Ok(())
    }

    fn item(&mut self, item: &ItemDescriptor) -> Result<(), cairo::Error> {
        let fade = self.fade(item);
        if fade <= 0.0 {
            return Ok(());
        }
        let opacity = item.opacity * fade;
        let p = item.position;
        let r = item.drawn_radius();

        if item.glow {
            // no blur in cairo, approximate with fading halos
            for i in (1..=GLOW_RINGS).rev() {
                let spread = i as f64 * GLOW_SPREAD;
                self.shape_path(item.shape, p, r + spread);
                set_color(&self.cr, item.fill, opacity * 0.25 / i as f64);
                self.cr.fill()?;
            }
        }

        self.shape_path(item.shape, p, r);
        set_color(&self.cr, item.fill, opacity);
        self.cr.fill_preserve()?;
        set_color(&self.cr, item.stroke, fade);
        self.cr.set_line_width(ITEM_STROKE_WIDTH);
        self.cr.stroke()?;

        if let Some(url) = &item.icon_url {
            let (corner, side) = item.icon_box();
            self.draw_image(url, corner, side)?;
        }

        if item.label_visible {
            self.centered_text(
                Point::new(p.x, p.y + item.label_offset),
                item.label_size,
                cairo::FontWeight::Bold,
                item.fill,
                &item.label,
            )?;
        }
        Ok(())
    }

    fn end_layer(&mut self) -> Result<(), cairo::Error> {
        self.cr.restore()
    }

    fn tooltip(&mut self, tooltip: &TooltipDescriptor) -> Result<(), cairo::Error> {
        let cr = &self.cr;
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        cr.set_font_size(TOOLTIP_FONT_SIZE);

        let lines: Vec<&str> = std::iter::once(tooltip.title.as_str())
            .chain(tooltip.lines.iter().map(String::as_str))
            .collect();
        let widest = lines
            .iter()
            .filter_map(|l| cr.text_extents(l).ok())
            .map(|ext| ext.x_advance())
            .fold(0.0, f64::max);
        let width = widest + TOOLTIP_PADDING * 2.0;
        let height = lines.len() as f64 * TOOLTIP_LINE_HEIGHT + TOOLTIP_PADDING * 2.0;
        let Point { x, y } = tooltip.position;

        self.rounded_rect(x, y, width, height, TOOLTIP_RADIUS);
        set_color(cr, tooltip.background, 1.0);
        cr.fill()?;

        set_color(cr, tooltip.text, 1.0);
        for (row, line) in lines.iter().enumerate() {
            let weight = if row == 0 {
                cairo::FontWeight::Bold
            } else {
                cairo::FontWeight::Normal
            };
            cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
            cr.move_to(
                x + TOOLTIP_PADDING,
                y + TOOLTIP_PADDING + (row as f64 + 0.75) * TOOLTIP_LINE_HEIGHT,
            );
            cr.show_text(line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_layout::{InteractionState, LayoutOptions, StyleOptions, compose, plan};

    #[test]
    fn test_render_matches_scene_size() {
        let data = crate::dataset::demo().unwrap();
        let plan = plan(&data, &LayoutOptions::sized(320.0, 240.0));
        let scene = compose(&plan, &InteractionState::new(), &StyleOptions::default(), &data.center);

        let image = render(&scene, &DrawOptions::default()).unwrap();
        assert_eq!((image.width(), image.height()), (320, 240));
    }

    #[test]
    fn test_fade_before_and_after_delay() {
        let data = crate::dataset::demo().unwrap();
        let plan = plan(&data, &LayoutOptions::default());
        let scene = compose(&plan, &InteractionState::new(), &StyleOptions::default(), &data.center);
        let item = scene.items().nth(1).unwrap();

        let image = ImageSurface::create(Format::ARgb32, 1, 1).unwrap();
        let early = CairoSurface::new(Context::new(&image).unwrap(), Some(0.0));
        let late = CairoSurface::new(Context::new(&image).unwrap(), Some(10.0));
        let settled = CairoSurface::new(Context::new(&image).unwrap(), None);

        assert_eq!(early.fade(item), 0.0);
        assert_eq!(late.fade(item), 1.0);
        assert_eq!(settled.fade(item), 1.0);
    }
}
