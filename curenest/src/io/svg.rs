use crate::entities::{Level, LayoutSnapshot, NestInstance};
use crate::geometry::Rect;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use svg::Document;
use svg::node::element::{Group, Rectangle, Text, Title};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgDrawOptions {
    ///The theme to use for the svg
    pub theme: SvgLayoutTheme,
    ///Draw the keep-out band along the walls of the autoclave
    pub draw_clearance: bool,
    ///Draw the stands carrying the raised level
    pub draw_stands: bool,
    ///Write the external id of every tool on top of it
    pub draw_labels: bool,
}

impl Default for SvgDrawOptions {
    fn default() -> Self {
        Self {
            theme: SvgLayoutTheme::default(),
            draw_clearance: true,
            draw_stands: true,
            draw_labels: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SvgLayoutTheme {
    pub stroke_width_multiplier: f32,
    pub bin_fill: Color,
    pub clearance_fill: Color,
    pub stand_fill: Color,
    pub ground_item_fill: Color,
    pub raised_item_fill: Color,
    pub raised_item_opacity: f32,
}

impl Default for SvgLayoutTheme {
    fn default() -> Self {
        SvgLayoutTheme::earth_tones()
    }
}

impl SvgLayoutTheme {
    pub fn earth_tones() -> Self {
        SvgLayoutTheme {
            stroke_width_multiplier: 2.0,
            bin_fill: "#CC824A".into(),
            clearance_fill: "#8F5A33".into(),
            stand_fill: "#6E6E6E".into(),
            ground_item_fill: "#FFC879".into(),
            raised_item_fill: "#7CA3C4".into(),
            raised_item_opacity: 0.8,
        }
    }

    pub fn gray() -> Self {
        SvgLayoutTheme {
            stroke_width_multiplier: 2.5,
            bin_fill: "#D3D3D3".into(),
            clearance_fill: "#A9A9A9".into(),
            stand_fill: "#505050".into(),
            ground_item_fill: "#7A7A7A".into(),
            raised_item_fill: "#3D3D3D".into(),
            raised_item_opacity: 0.7,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Color(u8, u8, u8);

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl From<&str> for Color {
    /// Parses `#RRGGBB` (the `#` is optional). Malformed channels fall back to black.
    fn from(s: &str) -> Self {
        let s = s.trim_start_matches('#');
        let channel = |i: usize| {
            s.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(0)
        };
        Color(channel(0), channel(2), channel(4))
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Color::from(s.as_str())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{self}"))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Color::from(s))
    }
}

fn rect_element(rect: &Rect, params: &[(&str, &str)]) -> Rectangle {
    let mut element = Rectangle::new()
        .set("x", rect.x_min)
        .set("y", rect.y_min)
        .set("width", rect.width())
        .set("height", rect.height());
    for (key, value) in params {
        element = element.set(*key, *value);
    }
    element
}

/// Renders the layout of one autoclave, top view with both levels superimposed.
/// The raised level is drawn translucent over the ground level, stands dashed.
pub fn layout_to_svg(
    ls: &LayoutSnapshot,
    instance: &NestInstance,
    options: SvgDrawOptions,
    title: &str,
) -> Document {
    let bin = instance.autoclave(ls.bin_id);
    let footprint = bin.footprint();
    let clearance = instance.clearance(ls.bin_id);
    let theme = &options.theme;

    let min_dim = i64::min(footprint.width(), footprint.height()) as f32;
    let margin = (0.05 * min_dim) as i64;
    let stroke_width = min_dim * 0.001 * theme.stroke_width_multiplier;
    let font_size = min_dim * 0.025;

    let label = {
        let label_content = format!(
            "autoclave {} | {}x{} mm | {} tools | {:.1} kg | density: {:.3}% | {}",
            bin.ext_id,
            bin.length,
            bin.width,
            ls.placed_items.len(),
            ls.placed_items.values().map(|pi| pi.weight).sum::<f64>(),
            ls.density * 100.0,
            title,
        );
        Text::new(label_content)
            .set("x", footprint.x_min)
            .set("y", footprint.y_min as f32 - 0.5 * font_size)
            .set("font-size", font_size)
            .set("font-family", "monospace")
            .set("font-weight", "500")
    };

    //draw the autoclave, with the clearance band as a frame around the usable area
    let bin_group = {
        let mut group = Group::new()
            .set("id", format!("autoclave_{}", bin.ext_id))
            .add(Title::new(format!(
                "autoclave, id: {}, length: {}, width: {}, max weight: {}, vacuum lines: {}",
                bin.ext_id, bin.length, bin.width, bin.max_weight, bin.vacuum_lines
            )));
        let bin_fill = format!("{}", theme.bin_fill);
        let stroke = format!("{}", 2.0 * stroke_width);
        match (options.draw_clearance && clearance > 0, bin.usable_area(clearance)) {
            (true, usable) => {
                group = group.add(rect_element(
                    &footprint,
                    &[
                        ("fill", &*format!("{}", theme.clearance_fill)),
                        ("stroke", "black"),
                        ("stroke-width", &*stroke),
                    ],
                ));
                if let Some(usable) = usable {
                    group = group.add(rect_element(&usable, &[("fill", &*bin_fill)]));
                }
            }
            (false, _) => {
                group = group.add(rect_element(
                    &footprint,
                    &[
                        ("fill", &*bin_fill),
                        ("stroke", "black"),
                        ("stroke-width", &*stroke),
                    ],
                ));
            }
        }
        group
    };

    let stands_group = {
        let mut group = Group::new().set("id", "stands");
        if options.draw_stands && instance.raised_enabled(ls.bin_id) {
            for (i, stand) in bin.stand_footprints(clearance).iter().enumerate() {
                let Some(stand) = stand else {
                    continue;
                };
                group = group.add(
                    rect_element(
                        stand,
                        &[
                            ("fill", &*format!("{}", theme.stand_fill)),
                            ("fill-opacity", "0.25"),
                            ("stroke", &*format!("{}", theme.stand_fill)),
                            ("stroke-width", &*format!("{}", 2.0 * stroke_width)),
                            (
                                "stroke-dasharray",
                                &*format!("{} {}", 4.0 * stroke_width, 4.0 * stroke_width),
                            ),
                        ],
                    )
                    .add(Title::new(format!(
                        "stand {i}, x: [{}, {})",
                        stand.x_min, stand.x_max
                    ))),
                );
            }
        }
        group
    };

    //ground tools first, raised tools on top
    let items_group = {
        let mut group = Group::new().set("id", "items");
        let mut placed = ls.placed_items.values().collect::<Vec<_>>();
        placed.sort_by_key(|pi| (pi.level, pi.rect.y_min, pi.rect.x_min));
        for pi in placed {
            let item = instance.item(pi.item_id);
            let (fill, opacity) = match pi.level {
                Level::Ground => (theme.ground_item_fill, 1.0),
                Level::Raised => (theme.raised_item_fill, theme.raised_item_opacity),
            };
            let title = Title::new(format!(
                "tool, id: {}, level: {}, x: {}, y: {}, {}x{}{}, {} kg, cure cycle: {}",
                item.ext_id,
                pi.level.index(),
                pi.rect.x_min,
                pi.rect.y_min,
                pi.rect.width(),
                pi.rect.height(),
                if pi.rotated() { " (rotated)" } else { "" },
                item.weight,
                item.cure_cycle,
            ));
            let mut item_group = Group::new()
                .set("id", format!("item_{}", item.ext_id))
                .add(
                    rect_element(
                        &pi.rect,
                        &[
                            ("fill", &*format!("{fill}")),
                            ("fill-opacity", &*format!("{opacity}")),
                            ("stroke", "black"),
                            ("stroke-width", &*format!("{stroke_width}")),
                        ],
                    )
                    .add(title),
                );
            if options.draw_labels {
                let item_font = f32::min(
                    font_size,
                    0.4 * i64::min(pi.rect.width(), pi.rect.height()) as f32,
                );
                item_group = item_group.add(
                    Text::new(format!("{}", item.ext_id))
                        .set("x", pi.rect.x_min as f32 + 0.5 * pi.rect.width() as f32)
                        .set("y", pi.rect.y_min as f32 + 0.5 * pi.rect.height() as f32)
                        .set("font-size", item_font)
                        .set("font-family", "monospace")
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle"),
                );
            }
            group = group.add(item_group);
        }
        group
    };

    let vbox = (
        footprint.x_min - margin,
        footprint.y_min - 2 * margin,
        footprint.width() + 2 * margin,
        footprint.height() + 3 * margin,
    );

    Document::new()
        .set("viewBox", vbox)
        .set("xmlns:xlink", "http://www.w3.org/1999/xlink")
        .add(bin_group)
        .add(stands_group)
        .add(items_group)
        .add(label)
}
