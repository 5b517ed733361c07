use super::{
    CENTER_STROKE_WIDTH, CenterDescriptor, DialTick, ITEM_STROKE_WIDTH, ItemDescriptor,
    OrbitLayer, RingDescriptor, Scene, Surface, TooltipDescriptor,
};
use crate::geometry::Point;
use crate::interaction::HitTarget;
use crate::style::ItemShape;
use std::fmt::{self, Write};

const GLOW_BLUR: f64 = 4.0;
const TOOLTIP_PADDING: f64 = 10.0;
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_CHAR_WIDTH: f64 = 7.0;
const TOOLTIP_FONT_SIZE: f64 = 12.0;

/// Writes a scene as a standalone SVG document.
///
/// Rotating orbits use `animateTransform`, marker fade-in uses a CSS keyframe
/// rule. Hit targets are carried as `data-*` attributes.
#[derive(Debug, Default)]
pub struct SvgSurface {
    out: String,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn render(scene: &Scene) -> Result<String, fmt::Error> {
        let mut surface = Self::new();
        super::paint(scene, &mut surface)?;
        Ok(surface.into_string())
    }

    fn text(
        &mut self,
        at: Point,
        size: f64,
        weight: &str,
        fill: &str,
        content: &str,
    ) -> fmt::Result {
        writeln!(
            self.out,
            r#"  <text x="{:.2}" y="{:.2}" font-size="{:.2}" font-weight="{}" fill="{}" text-anchor="middle" dominant-baseline="middle" font-family="sans-serif">{}</text>"#,
            at.x,
            at.y,
            size,
            weight,
            fill,
            escape_xml(content)
        )
    }
}

fn target_attr(target: &HitTarget) -> String {
    match target {
        HitTarget::Group(id) => format!(r#"data-group="{}""#, escape_xml(id.as_str())),
        HitTarget::Item(key) => format!(
            r#"data-group="{}" data-item="{}""#,
            escape_xml(key.group.as_str()),
            escape_xml(key.item.as_str())
        ),
        HitTarget::Dial(index) => format!(r#"data-dial="{index}""#),
    }
}

fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Surface for SvgSurface {
    type Error = fmt::Error;

    fn begin(&mut self, scene: &Scene) -> fmt::Result {
        writeln!(
            self.out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.2}" height="{:.2}" viewBox="0 0 {:.2} {:.2}">"#,
            scene.width, scene.height, scene.width, scene.height
        )?;
        writeln!(self.out, "  <defs>")?;
        writeln!(
            self.out,
            r#"    <filter id="orbit-glow" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{GLOW_BLUR}" result="blur"/><feMerge><feMergeNode in="blur"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#
        )?;
        let fill = scene.center.fill;
        writeln!(
            self.out,
            r#"    <radialGradient id="orbit-center"><stop offset="0%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></radialGradient>"#,
            fill,
            fill.with_alpha(fill.alpha() * 0.8)
        )?;
        writeln!(
            self.out,
            r#"    <clipPath id="orbit-avatar"><circle cx="{:.2}" cy="{:.2}" r="{:.2}"/></clipPath>"#,
            scene.center.position.x, scene.center.position.y, scene.center.radius
        )?;
        writeln!(
            self.out,
            "    <style>@keyframes orbit-fade-in {{ from {{ opacity: 0; }} }}</style>"
        )?;
        writeln!(self.out, "  </defs>")?;
        writeln!(
            self.out,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            scene.background
        )
    }

    fn ring(&mut self, ring: &RingDescriptor) -> fmt::Result {
        let dash = ring
            .dash
            .as_ref()
            .map(|d| {
                let pattern: Vec<String> = d.iter().map(|v| format!("{v}")).collect();
                format!(r#" stroke-dasharray="{}""#, pattern.join(","))
            })
            .unwrap_or_default();
        writeln!(
            self.out,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-opacity="{:.2}"{} data-orbit="{}" {}/>"#,
            ring.center.x,
            ring.center.y,
            ring.radius,
            ring.stroke,
            ring.stroke_width,
            ring.opacity,
            dash,
            ring.orbit_index,
            target_attr(&ring.target)
        )
    }

    fn dial_tick(&mut self, tick: &DialTick) -> fmt::Result {
        writeln!(
            self.out,
            r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}" stroke-linecap="round" {}/>"#,
            tick.inner.x,
            tick.inner.y,
            tick.outer.x,
            tick.outer.y,
            tick.color,
            tick.width,
            target_attr(&tick.target)
        )
    }

    fn center(&mut self, center: &CenterDescriptor) -> fmt::Result {
        let p = center.position;
        writeln!(
            self.out,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="url(#orbit-center)" stroke="{}" stroke-width="{CENTER_STROKE_WIDTH}"/>"#,
            p.x,
            p.y,
            center.radius,
            center.text.with_alpha(0.2)
        )?;
        if let Some(url) = &center.avatar_url {
            writeln!(
                self.out,
                r#"  <image href="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" clip-path="url(#orbit-avatar)" preserveAspectRatio="xMidYMid slice"/>"#,
                escape_xml(url),
                p.x - center.radius,
                p.y - center.radius,
                center.radius * 2.0,
                center.radius * 2.0
            )?;
        }

        let text = center.text.to_string();
        let label_y = if center.subtitle.is_some() {
            p.y - center.subtitle_offset / 2.0
        } else {
            p.y
        };
        self.text(
            Point::new(p.x, label_y),
            center.label_size,
            "bold",
            &text,
            &center.label,
        )?;
        if let Some(subtitle) = &center.subtitle {
            let muted = center.text.with_alpha(0.7).to_string();
            self.text(
                Point::new(p.x, label_y + center.subtitle_offset),
                center.subtitle_size,
                "normal",
                &muted,
                subtitle,
            )?;
        }
        Ok(())
    }

    fn begin_layer(&mut self, layer: &OrbitLayer, center: Point) -> fmt::Result {
        writeln!(self.out, r#"  <g data-orbit="{}">"#, layer.orbit_index)?;
        if let Some(motion) = layer.motion.filter(|m| !m.paused) {
            let (from, to) = if motion.spin.sign() > 0.0 {
                (0, 360)
            } else {
                (360, 0)
            };
            writeln!(
                self.out,
                r#"  <animateTransform attributeName="transform" type="rotate" from="{from} {:.2} {:.2}" to="{to} {:.2} {:.2}" dur="{}s" repeatCount="indefinite"/>"#,
                center.x, center.y, center.x, center.y, motion.period_secs
            )?;
        }
        Ok(())
    }

    fn item(&mut self, item: &ItemDescriptor) -> fmt::Result {
        let p = item.position;
        let r = item.drawn_radius();
        let mut paint = format!(
            r#"fill="{}" stroke="{}" stroke-width="{ITEM_STROKE_WIDTH}" opacity="{:.2}""#,
            item.fill, item.stroke, item.opacity
        );
        if item.glow {
            paint.push_str(r#" filter="url(#orbit-glow)""#);
        }
        if item.fade_in.duration_secs > 0.0 {
            write!(
                paint,
                r#" style="animation: orbit-fade-in {}s ease-out {:.2}s both""#,
                item.fade_in.duration_secs, item.fade_in.delay_secs
            )?;
        }
        let target = target_attr(&item.target);

        match item.shape {
            ItemShape::Circle => writeln!(
                self.out,
                r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" {paint} {target}/>"#,
                p.x, p.y, r
            )?,
            ItemShape::Square => writeln!(
                self.out,
                r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" {paint} {target}/>"#,
                p.x - r,
                p.y - r,
                r * 2.0,
                r * 2.0,
                r * 0.2
            )?,
            ItemShape::Diamond => writeln!(
                self.out,
                r#"  <polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" {paint} {target}/>"#,
                p.x,
                p.y - r,
                p.x + r,
                p.y,
                p.x,
                p.y + r,
                p.x - r,
                p.y
            )?,
        }

        if let Some(url) = &item.icon_url {
            let (corner, side) = item.icon_box();
            writeln!(
                self.out,
                r#"  <image href="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" pointer-events="none"/>"#,
                escape_xml(url),
                corner.x,
                corner.y,
                side,
                side
            )?;
        }

        if item.label_visible {
            let fill = item.fill.to_string();
            self.text(
                Point::new(p.x, p.y + item.label_offset),
                item.label_size,
                "bold",
                &fill,
                &item.label,
            )?;
        }
        Ok(())
    }

    fn end_layer(&mut self) -> fmt::Result {
        writeln!(self.out, "  </g>")
    }

    fn tooltip(&mut self, tooltip: &TooltipDescriptor) -> fmt::Result {
        let widest = std::iter::once(tooltip.title.as_str())
            .chain(tooltip.lines.iter().map(String::as_str))
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        let width = widest as f64 * TOOLTIP_CHAR_WIDTH + TOOLTIP_PADDING * 2.0;
        let height = (tooltip.lines.len() + 1) as f64 * TOOLTIP_LINE_HEIGHT + TOOLTIP_PADDING * 2.0;
        let Point { x, y } = tooltip.position;

        writeln!(self.out, r#"  <g class="orbit-tooltip" pointer-events="none">"#)?;
        writeln!(
            self.out,
            r#"    <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="8" fill="{}"/>"#,
            x, y, width, height, tooltip.background
        )?;
        let lines = std::iter::once((&tooltip.title, "bold"))
            .chain(tooltip.lines.iter().map(|l| (l, "normal")));
        for (row, (line, weight)) in lines.enumerate() {
            writeln!(
                self.out,
                r#"    <text x="{:.2}" y="{:.2}" font-size="{TOOLTIP_FONT_SIZE}" font-weight="{}" fill="{}" font-family="sans-serif">{}</text>"#,
                x + TOOLTIP_PADDING,
                y + TOOLTIP_PADDING + (row as f64 + 0.75) * TOOLTIP_LINE_HEIGHT,
                weight,
                tooltip.text,
                escape_xml(line)
            )?;
        }
        writeln!(self.out, "  </g>")
    }

    fn finish(&mut self) -> fmt::Result {
        writeln!(self.out, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{InteractionState, OrbitEvent};
    use crate::layout::{LayoutOptions, plan};
    use crate::model::{Center, Dataset, Group, Item, ItemKey};
    use crate::scene::compose;
    use crate::style::StyleOptions;

    fn dataset() -> Dataset {
        let mut tools = Group::new(
            "tools",
            "Tools & Apps",
            vec![
                Item::new("a", "Alpha", 3.0).with_meta("owner", "ops"),
                Item::new("b", "<Beta>", 9.0),
            ],
        );
        tools.items[1].glow = true;
        Dataset::new(
            Center::new("c", "Core"),
            vec![tools, Group::new("misc", "Misc", vec![Item::new("m", "M", 1.0)])],
        )
    }

    fn render(interaction: &InteractionState, style: &StyleOptions) -> String {
        let data = dataset();
        let plan = plan(&data, &LayoutOptions::default());
        SvgSurface::render(&compose(&plan, interaction, style, &data.center)).unwrap()
    }

    #[test]
    fn test_document_structure() {
        let svg = render(&InteractionState::new(), &StyleOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("data-orbit=").count(), 2 + 2);
        assert_eq!(svg.matches("data-dial=").count(), 12);
        assert_eq!(svg.matches("data-item=").count(), 3);
        assert_eq!(svg.matches("<animateTransform").count(), 2);
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
        assert!(svg.contains(r#"filter="url(#orbit-glow)""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let data = dataset();
        let plan = plan(&data, &LayoutOptions::default());
        let mut interaction = InteractionState::new();
        interaction.handle(
            OrbitEvent::ItemEnter {
                item: ItemKey::new("tools", "b"),
                pointer: Point::new(10.0, 10.0),
            },
            &plan,
            &mut (),
        );
        let scene = compose(&plan, &interaction, &StyleOptions::default(), &data.center);
        let svg = SvgSurface::render(&scene).unwrap();

        assert!(svg.contains("&lt;Beta&gt;"));
        assert!(!svg.contains("<Beta>"));
        assert!(svg.contains("orbit-tooltip"));
        assert!(svg.contains("Value: 9"));
        // the hovered item's orbit stops rotating
        assert_eq!(svg.matches("<animateTransform").count(), 1);
    }

    #[test]
    fn test_shapes_and_static_output() {
        let mut style = StyleOptions::default();
        style.item_shape = ItemShape::Diamond;
        style.animation.orbit_rotation = false;
        style.orbit_paths.show = false;
        let svg = render(&InteractionState::new(), &style);

        assert_eq!(svg.matches("<polygon").count(), 3);
        assert!(!svg.contains("animateTransform"));
        assert!(!svg.contains("stroke-dasharray"));
    }
}
