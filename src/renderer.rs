use std::f32::consts::{FRAC_PI_2, PI};

use macroquad::prelude::*;
use tracing::warn;

use crate::config;
use crate::viewport::Surface;

const BG_COLOR: Color = Color::new(0.976, 0.976, 0.976, 1.0);
const TITLE_COLOR: Color = Color::new(0.1, 0.1, 0.1, 1.0);
const SUBTITLE_COLOR: Color = Color::new(0.333, 0.333, 0.333, 1.0);
const SHADOW_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.1);
const CORNER_RADIUS: f32 = 8.0;
const CORNER_SEGMENTS: usize = 6;

const TITLE: &str = "Generating your walking route";
const SUBTITLE: &str = "Drawings made by other walkers!";

/// Sample drawings shown while the route is generated; sprite `i` uses
/// entry `i % len`.
pub const CATALOGUE: [&str; 4] = ["bear", "jellyfish", "cat2", "cloud"];

const PLACEHOLDER_TINTS: [Color; 4] = [
    Color::new(0.72, 0.55, 0.40, 1.0),
    Color::new(0.62, 0.70, 0.95, 1.0),
    Color::new(0.95, 0.75, 0.45, 1.0),
    Color::new(0.80, 0.88, 0.95, 1.0),
];

/// The window area below the header.
pub struct ScreenSurface;

impl Surface for ScreenSurface {
    fn size(&self) -> Option<(f32, f32)> {
        let w = screen_width();
        let h = screen_height() - config::HEADER_HEIGHT;
        (w > 0.0 && h > 0.0).then_some((w, h))
    }
}

pub struct SpriteArt {
    textures: Vec<Option<Texture2D>>,
}

impl SpriteArt {
    /// Missing or broken images fall back to tinted tiles.
    pub async fn load(dir: &str) -> Self {
        let mut textures = Vec::with_capacity(CATALOGUE.len());
        for name in CATALOGUE {
            let path = format!("{dir}/{name}.png");
            match load_texture(&path).await {
                Ok(texture) => {
                    texture.set_filter(FilterMode::Linear);
                    textures.push(Some(texture));
                }
                Err(e) => {
                    warn!(%path, "sprite image unavailable, using placeholder: {e}");
                    textures.push(None);
                }
            }
        }
        Self { textures }
    }
}

pub fn draw(positions: &[Vec2], size: f32, art: &SpriteArt) {
    clear_background(BG_COLOR);
    draw_header();

    let origin = vec2(0.0, config::HEADER_HEIGHT);
    for (idx, pos) in positions.iter().enumerate() {
        let p = origin + *pos;
        draw_rounded_rect(Rect::new(p.x + 2.0, p.y + 3.0, size, size), CORNER_RADIUS, SHADOW_COLOR);
        match art.textures.get(idx % CATALOGUE.len()).and_then(|t| t.as_ref()) {
            Some(texture) => draw_texture_ex(
                texture,
                p.x,
                p.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(size, size)),
                    ..Default::default()
                },
            ),
            None => {
                let tint = PLACEHOLDER_TINTS[idx % PLACEHOLDER_TINTS.len()];
                draw_rounded_rect(Rect::new(p.x, p.y, size, size), CORNER_RADIUS, tint);
            }
        }
    }
}

/// Non-overlapping pieces of a rounded rectangle: a cross of three
/// rectangles plus one quarter-disc per corner `(center, start angle)`, so
/// translucent fills do not double up.
struct RoundedRect {
    bars: [Rect; 3],
    corners: [(Vec2, f32); 4],
    radius: f32,
}

impl RoundedRect {
    fn new(rect: Rect, radius: f32) -> Self {
        let r = radius.clamp(0.0, rect.w.min(rect.h) * 0.5);
        let (x, y, w, h) = (rect.x, rect.y, rect.w, rect.h);
        Self {
            bars: [
                Rect::new(x + r, y, w - 2.0 * r, h),
                Rect::new(x, y + r, r, h - 2.0 * r),
                Rect::new(x + w - r, y + r, r, h - 2.0 * r),
            ],
            corners: [
                (vec2(x + w - r, y + h - r), 0.0),
                (vec2(x + r, y + h - r), FRAC_PI_2),
                (vec2(x + r, y + r), PI),
                (vec2(x + w - r, y + r), PI + FRAC_PI_2),
            ],
            radius: r,
        }
    }
}

fn draw_rounded_rect(rect: Rect, radius: f32, color: Color) {
    let shape = RoundedRect::new(rect, radius);
    for bar in shape.bars {
        draw_rectangle(bar.x, bar.y, bar.w, bar.h, color);
    }
    if shape.radius <= 0.0 {
        return;
    }
    for (center, start) in shape.corners {
        let step = FRAC_PI_2 / CORNER_SEGMENTS as f32;
        for i in 0..CORNER_SEGMENTS {
            let a = center + Vec2::from_angle(start + step * i as f32) * shape.radius;
            let b = center + Vec2::from_angle(start + step * (i + 1) as f32) * shape.radius;
            draw_triangle(center, a, b, color);
        }
    }
}

fn draw_header() {
    draw_centered(TITLE, 48.0, 28.0, TITLE_COLOR);
    draw_centered(SUBTITLE, 86.0, 18.0, SUBTITLE_COLOR);
}

fn draw_centered(text: &str, baseline: f32, font_size: f32, color: Color) {
    let dims = measure_text(text, None, font_size as u16, 1.0);
    let x = ((screen_width() - dims.width) * 0.5).max(0.0);
    draw_text(text, x, baseline, font_size, color);
}
