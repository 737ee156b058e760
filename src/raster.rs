//! Rasterization of a styled partition into an RGBA image
//!
//! Every output pixel is evaluated at its center in canvas coordinates:
//! resolve the owning cell, apply the cell's fill, optionally blend with the
//! runner-up cell near the boundary, then apply the whole-image overlay.
//! Pixel evaluation is a pure function of position and the assigned
//! attributes, so two runs over the same inputs produce identical bytes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

use crate::attributes::{CellAttributes, CellStyle, EdgeStyle, FillMode, Rgba};
use crate::config::TextureConfig;
use crate::error::{Result, TextureError};
use crate::noise::fbm_2d;
use crate::partition::Partition;

#[cfg(feature = "spatial-index")]
use crate::spatial::SeedIndex;

/// Whole-image post-processing applied after cell fills
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Overlay {
    /// No post-processing
    #[default]
    None,
    /// Radial darkening toward the canvas corners
    Vignette {
        /// Darkening at the corners, in [0, 1]
        strength: f32,
    },
    /// Low-frequency brightness modulation across the whole image
    GlobalNoise {
        /// Modulation amplitude (>= 0)
        amplitude: f32,
        /// Spatial frequency in canvas units (> 0)
        frequency: f32,
    },
}

impl Overlay {
    /// Validate overlay parameters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Overlay::None => Ok(()),
            Overlay::Vignette { strength } => {
                if !(0.0..=1.0).contains(&strength) {
                    return Err(TextureError::InvalidConfig(format!(
                        "vignette strength must be in [0, 1] (got {})",
                        strength
                    )));
                }
                Ok(())
            }
            Overlay::GlobalNoise {
                amplitude,
                frequency,
            } => {
                if !(amplitude >= 0.0 && amplitude.is_finite()) {
                    return Err(TextureError::InvalidConfig(format!(
                        "overlay noise amplitude must be non-negative (got {})",
                        amplitude
                    )));
                }
                if !(frequency > 0.0 && frequency.is_finite()) {
                    return Err(TextureError::InvalidConfig(format!(
                        "overlay noise frequency must be positive (got {})",
                        frequency
                    )));
                }
                Ok(())
            }
        }
    }
}

/// An RGBA8 image in row-major order
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a transparent-black raster of the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read a pixel's RGBA bytes
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Raw RGBA8 bytes, row-major from the top-left
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Write the raster as a PNG file
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` wrapping the underlying encoder error.
    #[cfg(feature = "png")]
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
        .map_err(|e| TextureError::InvalidConfig(format!("PNG export failed: {}", e)))
    }
}

/// Render the styled partition into an RGBA raster
///
/// Point location goes through the KD-tree when the `spatial-index` feature
/// is enabled and through the exact linear scan otherwise; both honor the
/// lower-index tie-break, so the output bytes are identical either way.
pub fn rasterize(
    partition: &Partition,
    attributes: &CellAttributes,
    config: &TextureConfig,
) -> Raster {
    let mut raster = Raster::new(config.output_width, config.output_height);
    let scale_x = config.canvas_width / config.output_width as f32;
    let scale_y = config.canvas_height / config.output_height as f32;

    let seeds = partition.seeds();
    let fill = config.rules.fill;

    #[cfg(feature = "spatial-index")]
    let index = SeedIndex::new(&seeds);

    // A dominated coincident seed sits at zero bisector distance everywhere
    // in its owner's cell; its empty cell must never contribute to blending
    let empty_cell: Vec<bool> = partition
        .cells()
        .iter()
        .map(|c| c.polygon.is_empty())
        .collect();

    // Gradient fills need each cell's radius (seed to farthest vertex)
    let radii: Vec<f32> = partition
        .cells()
        .iter()
        .map(|c| {
            if c.polygon.is_empty() {
                1.0
            } else {
                c.polygon.max_distance_from(c.seed).max(1e-6)
            }
        })
        .collect();

    for py in 0..config.output_height {
        for px in 0..config.output_width {
            let p = Vec2::new(
                (px as f32 + 0.5) * scale_x,
                (py as f32 + 0.5) * scale_y,
            );

            #[cfg(feature = "spatial-index")]
            let (owner, d1, runner_up) = index.nearest_two(p);
            #[cfg(not(feature = "spatial-index"))]
            let (owner, d1, runner_up) = partition.locate_two(p);

            let style = match attributes.get(owner) {
                Some(s) => *s,
                None => continue,
            };
            let mut color = fill_color(p, &style, fill, seeds[owner], radii[owner]);

            if style.edge == EdgeStyle::Blend && config.edge_blend_width > 0.0 {
                if let Some((runner, d2)) = runner_up.filter(|&(r, _)| !empty_cell[r]) {
                    // Distance from the pixel to the bisector between the
                    // owner's and the runner-up's seeds
                    let t = (d2 - d1) * 0.5;
                    if t < config.edge_blend_width {
                        if let Some(other) = attributes.get(runner) {
                            let other_color =
                                fill_color(p, other, fill, seeds[runner], radii[runner]);
                            let own_weight =
                                0.5 + 0.5 * smoothstep(t / config.edge_blend_width);
                            color = mix(other_color, color, own_weight);
                        }
                    }
                }
            }

            raster.set_pixel(px, py, to_rgba8(color));
        }
    }

    apply_overlay(&mut raster, config);
    raster
}

/// Evaluate a cell's fill at a canvas position
fn fill_color(p: Vec2, style: &CellStyle, fill: FillMode, seed: Vec2, radius: f32) -> Rgba {
    match fill {
        FillMode::Solid => style.color,
        FillMode::Gradient => {
            let t = (p.distance(seed) / radius).clamp(0.0, 1.0);
            let factor = 1.0 - 0.4 * t;
            scale_rgb(style.color, factor)
        }
        FillMode::Noise => {
            let n = fbm_2d(
                p * style.noise.frequency,
                style.noise.seed,
                style.noise.octaves,
                0.5,
                2.0,
            );
            scale_rgb(style.color, 1.0 + style.noise.amplitude * n)
        }
    }
}

/// Whole-image post-pass; alpha is never touched
fn apply_overlay(raster: &mut Raster, config: &TextureConfig) {
    match config.overlay {
        Overlay::None => {}
        Overlay::Vignette { strength } => {
            let center = Vec2::new(config.canvas_width * 0.5, config.canvas_height * 0.5);
            let max_dist = center.length().max(1e-6);
            let scale_x = config.canvas_width / raster.width as f32;
            let scale_y = config.canvas_height / raster.height as f32;
            for py in 0..raster.height {
                for px in 0..raster.width {
                    let p = Vec2::new((px as f32 + 0.5) * scale_x, (py as f32 + 0.5) * scale_y);
                    let t = (p.distance(center) / max_dist).clamp(0.0, 1.0);
                    let factor = 1.0 - strength * t * t;
                    scale_pixel(raster, px, py, factor);
                }
            }
        }
        Overlay::GlobalNoise {
            amplitude,
            frequency,
        } => {
            // Derive the overlay field's seed from the run seed so the pass
            // never consumes stream draws
            let seed = (config.random_seed as u32) ^ 0x9E37_79B9;
            let scale_x = config.canvas_width / raster.width as f32;
            let scale_y = config.canvas_height / raster.height as f32;
            for py in 0..raster.height {
                for px in 0..raster.width {
                    let p = Vec2::new((px as f32 + 0.5) * scale_x, (py as f32 + 0.5) * scale_y);
                    let n = fbm_2d(p * frequency, seed, 2, 0.5, 2.0);
                    let factor = 1.0 + amplitude * n;
                    scale_pixel(raster, px, py, factor);
                }
            }
        }
    }
}

#[inline]
fn scale_pixel(raster: &mut Raster, x: u32, y: u32, factor: f32) {
    let [r, g, b, a] = raster.pixel(x, y);
    let scale = |c: u8| ((c as f32 * factor).clamp(0.0, 255.0) + 0.5) as u8;
    raster.set_pixel(x, y, [scale(r), scale(g), scale(b), a]);
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[inline]
fn scale_rgb(c: Rgba, factor: f32) -> Rgba {
    [
        (c[0] * factor).clamp(0.0, 1.0),
        (c[1] * factor).clamp(0.0, 1.0),
        (c[2] * factor).clamp(0.0, 1.0),
        c[3],
    ]
}

#[inline]
fn to_rgba8(c: Rgba) -> [u8; 4] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(c[0]), q(c[1]), q(c[2]), q(c[3])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{assign, PaletteColor, RuleSet};
    use crate::config::TextureConfigBuilder;
    use crate::generation::{generate_partition, tessellate};
    use crate::geom::Rect;
    use crate::stream::RandomStream;

    fn render(config: &TextureConfig) -> Raster {
        let mut stream = RandomStream::new(config.random_seed);
        let partition = generate_partition(config, &mut stream).unwrap();
        let attributes = assign(&partition, &config.rules, &mut stream);
        rasterize(&partition, &attributes, config)
    }

    #[test]
    fn test_output_dimensions() {
        let config = TextureConfigBuilder::new()
            .random_seed(1)
            .seed_count(5)
            .output_size(64, 48)
            .unwrap()
            .build()
            .unwrap();
        let raster = render(&config);
        assert_eq!(raster.width(), 64);
        assert_eq!(raster.height(), 48);
        assert_eq!(raster.as_bytes().len(), 64 * 48 * 4);
    }

    #[test]
    fn test_determinism_byte_identical() {
        let config = TextureConfigBuilder::new()
            .random_seed(42)
            .seed_count(12)
            .output_size(48, 48)
            .unwrap()
            .build()
            .unwrap();
        let a = render(&config);
        let b = render(&config);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_single_seed_solid_fill_is_uniform() {
        let rules = RuleSet {
            palette: vec![PaletteColor {
                color: [0.2, 0.4, 0.6, 1.0],
                weight: 1.0,
            }],
            fill: crate::attributes::FillMode::Solid,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(9)
            .seed_count(1)
            .output_size(16, 16)
            .unwrap()
            .rules(rules)
            .build()
            .unwrap();
        let raster = render(&config);
        let first = raster.pixel(0, 0);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(raster.pixel(x, y), first);
            }
        }
    }

    #[test]
    fn test_hard_edges_emit_only_cell_colors() {
        // With blending disabled every boundary pixel must carry exactly one
        // cell's solid color
        let rules = RuleSet {
            palette: vec![
                PaletteColor {
                    color: [1.0, 0.0, 0.0, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.0, 0.0, 1.0, 1.0],
                    weight: 1.0,
                },
            ],
            fill: crate::attributes::FillMode::Solid,
            edge: EdgeStyle::Hard,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(5)
            .seed_count(8)
            .output_size(32, 32)
            .unwrap()
            .edge_blend_width(0.0)
            .unwrap()
            .rules(rules)
            .build()
            .unwrap();
        let raster = render(&config);
        for y in 0..32 {
            for x in 0..32 {
                let p = raster.pixel(x, y);
                assert!(
                    p == [255, 0, 0, 255] || p == [0, 0, 255, 255],
                    "pixel ({}, {}) = {:?} is not a pure cell color",
                    x,
                    y,
                    p
                );
            }
        }
    }

    #[test]
    fn test_zero_blend_width_disables_blending() {
        // Blending stays requested per cell, but a zero band width must
        // yield hard boundaries with no intermediate colors
        let rules = RuleSet {
            palette: vec![
                PaletteColor {
                    color: [1.0, 0.0, 0.0, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.0, 0.0, 1.0, 1.0],
                    weight: 1.0,
                },
            ],
            fill: crate::attributes::FillMode::Solid,
            edge: EdgeStyle::Blend,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(5)
            .seed_count(8)
            .output_size(32, 32)
            .unwrap()
            .edge_blend_width(0.0)
            .unwrap()
            .rules(rules)
            .build()
            .unwrap();
        let raster = render(&config);
        for y in 0..32 {
            for x in 0..32 {
                let p = raster.pixel(x, y);
                assert!(
                    p == [255, 0, 0, 255] || p == [0, 0, 255, 255],
                    "pixel ({}, {}) = {:?} is not a pure cell color",
                    x,
                    y,
                    p
                );
            }
        }
    }

    #[test]
    fn test_dominated_duplicate_does_not_tint_owner() {
        // A coincident seed loses its whole region to the lower index; its
        // empty cell sits at zero bisector distance everywhere, which must
        // not drag a half-blend across the owner's interior
        let rules = RuleSet {
            palette: vec![
                PaletteColor {
                    color: [1.0, 0.0, 0.0, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.0, 0.0, 1.0, 1.0],
                    weight: 1.0,
                },
            ],
            fill: crate::attributes::FillMode::Solid,
            edge: EdgeStyle::Blend,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(1)
            .seed_count(3)
            .output_size(64, 64)
            .unwrap()
            .edge_blend_width(4.0)
            .unwrap()
            .rules(rules.clone())
            .build()
            .unwrap();
        let seeds = vec![
            Vec2::new(64.0, 128.0),
            Vec2::new(64.0, 128.0),
            Vec2::new(192.0, 128.0),
        ];
        let bounds = Rect::from_size(config.canvas_width, config.canvas_height);
        let partition = tessellate(&seeds, bounds, config.epsilon).unwrap();
        // Several attribute draws so the duplicate gets the opposite color
        // at least once
        for stream_seed in 0..4 {
            let mut stream = RandomStream::new(stream_seed);
            let attributes = assign(&partition, &rules, &mut stream);
            let raster = rasterize(&partition, &attributes, &config);
            // Pixels well clear of the real bisector at x = 128 (pixel 32)
            for y in 0..64 {
                for x in 0..24 {
                    let p = raster.pixel(x, y);
                    assert!(
                        p == [255, 0, 0, 255] || p == [0, 0, 255, 255],
                        "pixel ({}, {}) = {:?} tinted by an empty cell",
                        x,
                        y,
                        p
                    );
                }
            }
        }
    }

    #[test]
    fn test_blend_produces_intermediate_colors() {
        let rules = RuleSet {
            palette: vec![
                PaletteColor {
                    color: [1.0, 0.0, 0.0, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.0, 0.0, 1.0, 1.0],
                    weight: 1.0,
                },
            ],
            fill: crate::attributes::FillMode::Solid,
            edge: EdgeStyle::Blend,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(5)
            .seed_count(8)
            .output_size(64, 64)
            .unwrap()
            .edge_blend_width(16.0)
            .unwrap()
            .rules(rules)
            .build()
            .unwrap();
        let raster = render(&config);
        let mut mixed = false;
        for y in 0..64 {
            for x in 0..64 {
                let p = raster.pixel(x, y);
                if p != [255, 0, 0, 255] && p != [0, 0, 255, 255] {
                    mixed = true;
                }
            }
        }
        assert!(mixed, "a wide blend band should produce mixed colors");
    }

    #[test]
    fn test_vignette_darkens_corners() {
        let rules = RuleSet {
            palette: vec![PaletteColor {
                color: [0.8, 0.8, 0.8, 1.0],
                weight: 1.0,
            }],
            fill: crate::attributes::FillMode::Solid,
            ..RuleSet::default()
        };
        let config = TextureConfigBuilder::new()
            .random_seed(3)
            .seed_count(1)
            .output_size(32, 32)
            .unwrap()
            .rules(rules)
            .overlay(Overlay::Vignette { strength: 0.8 })
            .build()
            .unwrap();
        let raster = render(&config);
        let corner = raster.pixel(0, 0);
        let center = raster.pixel(16, 16);
        assert!(corner[0] < center[0]);
        // Alpha is untouched by overlays
        assert_eq!(corner[3], 255);
    }

    #[test]
    fn test_overlay_validation() {
        assert!(Overlay::None.validate().is_ok());
        assert!(Overlay::Vignette { strength: 0.5 }.validate().is_ok());
        assert!(Overlay::Vignette { strength: 1.5 }.validate().is_err());
        assert!(Overlay::GlobalNoise {
            amplitude: 0.2,
            frequency: 0.01
        }
        .validate()
        .is_ok());
        assert!(Overlay::GlobalNoise {
            amplitude: -0.1,
            frequency: 0.01
        }
        .validate()
        .is_err());
        assert!(Overlay::GlobalNoise {
            amplitude: 0.2,
            frequency: 0.0
        }
        .validate()
        .is_err());
    }
}
