//! Per-cell visual attribute assignment
//!
//! Walks the partition in ascending cell-id order (never spatial order) and
//! draws from the run's random stream according to the rule set. The
//! traversal order is a public contract, not an implementation detail:
//! changing it would change which draws land on which cell and therefore
//! the output.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TextureError};
use crate::partition::Partition;
use crate::stream::RandomStream;

/// RGBA color with components in [0, 1]
pub type Rgba = [f32; 4];

/// A palette entry with a selection weight
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteColor {
    /// The color drawn for cells that select this entry
    pub color: Rgba,
    /// Relative selection weight (must be positive and finite)
    pub weight: f32,
}

/// How a cell's interior is filled
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Flat base color
    Solid,
    /// Radial falloff from the cell seed toward the boundary
    Gradient,
    /// Base color modulated by the cell's Perlin noise descriptor
    #[default]
    Noise,
}

/// How a cell's boundary is rendered
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeStyle {
    /// No blending: boundary pixels take exactly one cell's color
    Hard,
    /// Blend with the neighboring cell across the configured band width
    #[default]
    Blend,
}

/// Rules driving per-cell attribute draws
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Weighted color palette; one entry is drawn per cell
    pub palette: Vec<PaletteColor>,
    /// Interior fill mode applied to every cell
    pub fill: FillMode,
    /// Per-cell noise amplitude is drawn from this inclusive-exclusive range
    pub noise_amplitude: (f32, f32),
    /// Per-cell noise frequency is drawn from this inclusive-exclusive range
    pub noise_frequency: (f32, f32),
    /// Octave count for the cell noise fBm
    pub noise_octaves: usize,
    /// Boundary style applied to every cell
    pub edge: EdgeStyle,
}

impl RuleSet {
    /// Validate rule parameters
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty palette, non-positive weights,
    /// inverted or negative ranges, or a zero octave count.
    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(TextureError::InvalidConfig(
                "color palette must not be empty".to_string(),
            ));
        }
        for (i, entry) in self.palette.iter().enumerate() {
            if !(entry.weight > 0.0 && entry.weight.is_finite()) {
                return Err(TextureError::InvalidConfig(format!(
                    "palette entry {} weight must be positive and finite (got {})",
                    i, entry.weight
                )));
            }
        }
        let (amp_lo, amp_hi) = self.noise_amplitude;
        if !(amp_lo >= 0.0 && amp_hi >= amp_lo) {
            return Err(TextureError::InvalidConfig(format!(
                "noise amplitude range must satisfy 0 <= lo <= hi (got {}..{})",
                amp_lo, amp_hi
            )));
        }
        let (freq_lo, freq_hi) = self.noise_frequency;
        if !(freq_lo > 0.0 && freq_hi >= freq_lo) {
            return Err(TextureError::InvalidConfig(format!(
                "noise frequency range must satisfy 0 < lo <= hi (got {}..{})",
                freq_lo, freq_hi
            )));
        }
        if self.noise_octaves == 0 {
            return Err(TextureError::InvalidConfig(
                "noise octave count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            // Stone-like palette
            palette: vec![
                PaletteColor {
                    color: [0.55, 0.52, 0.48, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.62, 0.58, 0.52, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.48, 0.46, 0.44, 1.0],
                    weight: 1.0,
                },
                PaletteColor {
                    color: [0.68, 0.64, 0.57, 1.0],
                    weight: 0.5,
                },
            ],
            fill: FillMode::Noise,
            noise_amplitude: (0.05, 0.25),
            noise_frequency: (0.02, 0.08),
            noise_octaves: 3,
            edge: EdgeStyle::Blend,
        }
    }
}

/// Deterministic per-cell noise parameters
///
/// The seed is derived from the run's random stream once per cell, so pixel
/// evaluation never draws from the stream and stays parallelizable.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseDescriptor {
    /// Seed for this cell's noise field
    pub seed: u32,
    /// Modulation amplitude
    pub amplitude: f32,
    /// Spatial frequency in canvas units
    pub frequency: f32,
    /// fBm octave count
    pub octaves: usize,
}

/// The visual attribute record of one cell
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    /// Base color drawn from the palette
    pub color: Rgba,
    /// Noise parameters for procedural fills
    pub noise: NoiseDescriptor,
    /// Boundary style
    pub edge: EdgeStyle,
}

/// Mapping from cell id to its visual attribute record
///
/// One record per cell, created by `assign` and read-only thereafter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CellAttributes {
    styles: Vec<CellStyle>,
}

impl CellAttributes {
    /// Look up a cell's record by id
    #[inline]
    pub fn get(&self, id: usize) -> Option<&CellStyle> {
        self.styles.get(id)
    }

    /// Number of records (equals the partition's cell count)
    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether there are no records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// All records in cell-id order
    #[inline]
    pub fn styles(&self) -> &[CellStyle] {
        &self.styles
    }
}

/// Assign attributes to every cell of the partition
///
/// Each cell consumes exactly four draws (color, noise seed, amplitude,
/// frequency) regardless of fill mode, keeping the stream position a
/// function of cell count alone.
pub fn assign(partition: &Partition, rules: &RuleSet, stream: &mut RandomStream) -> CellAttributes {
    let styles = partition
        .cells()
        .iter()
        .map(|_| {
            let color = draw_palette_color(&rules.palette, stream);
            let seed = stream.next_u32();
            let (amp_lo, amp_hi) = rules.noise_amplitude;
            let amplitude = stream.next_range(amp_lo, amp_hi);
            let (freq_lo, freq_hi) = rules.noise_frequency;
            let frequency = stream.next_range(freq_lo, freq_hi);
            CellStyle {
                color,
                noise: NoiseDescriptor {
                    seed,
                    amplitude,
                    frequency,
                    octaves: rules.noise_octaves,
                },
                edge: rules.edge,
            }
        })
        .collect();
    CellAttributes { styles }
}

/// Weighted palette selection by cumulative weight scan
fn draw_palette_color(palette: &[PaletteColor], stream: &mut RandomStream) -> Rgba {
    let total: f32 = palette.iter().map(|e| e.weight).sum();
    let mut target = stream.next_unit() * total;
    for entry in palette {
        if target < entry.weight {
            return entry.color;
        }
        target -= entry.weight;
    }
    // Float accumulation can land just past the final band
    palette
        .last()
        .map(|e| e.color)
        .unwrap_or([0.0, 0.0, 0.0, 1.0])
}
