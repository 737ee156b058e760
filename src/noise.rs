//! 2D Perlin noise for procedural cell fills
//!
//! Deterministic seeded gradient noise using the standard Ken Perlin
//! permutation table. Each cell carries its own noise seed derived from the
//! run's random stream during attribute assignment, so pixel evaluation is
//! a pure function of (position, seed) and never touches the stream.

use glam::Vec2;

// Standard 256-element permutation table from Ken Perlin's reference
// implementation. Must remain unchanged to keep output deterministic across
// versions.
const PERM: [u32; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Hash lattice coordinates with the seed
#[inline]
fn hash(x: i32, y: i32, seed: u32) -> u32 {
    let seed_hash = (seed.wrapping_mul(1103515245).wrapping_add(12345)) >> 16;
    let ix = ((x as u32) ^ seed_hash) & 255;
    let iy = ((y as u32) ^ (seed_hash >> 8)) & 255;
    let a = PERM[ix as usize];
    PERM[((a + iy) & 255) as usize]
}

/// Gradient dot product for one of 8 lattice directions
#[inline]
fn gradient(hash_value: u32, x: f32, y: f32) -> f32 {
    let h = hash_value & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    let su = if (h & 1) == 0 { u } else { -u };
    let sv = if (h & 2) == 0 { v } else { -v };
    su + sv
}

/// Quintic smoothstep (Ken Perlin's improved fade function)
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Sample 2D Perlin noise at a position
///
/// Returns a value in approximately [-1, 1].
pub fn perlin_2d(pos: Vec2, seed: u32) -> f32 {
    let x0 = pos.x.floor() as i32;
    let y0 = pos.y.floor() as i32;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let xf = pos.x - pos.x.floor();
    let yf = pos.y - pos.y.floor();

    let u = fade(xf);
    let v = fade(yf);

    let aa = hash(x0, y0, seed);
    let ab = hash(x0, y1, seed);
    let ba = hash(x1, y0, seed);
    let bb = hash(x1, y1, seed);

    let g_aa = gradient(aa, xf, yf);
    let g_ba = gradient(ba, xf - 1.0, yf);
    let g_ab = gradient(ab, xf, yf - 1.0);
    let g_bb = gradient(bb, xf - 1.0, yf - 1.0);

    let x_lower = lerp(g_aa, g_ba, u);
    let x_upper = lerp(g_ab, g_bb, u);
    lerp(x_lower, x_upper, v)
}

/// Fractal Brownian Motion: accumulate octaves of Perlin noise
///
/// Each octave adds detail at higher frequency with lower amplitude. The
/// result is normalized to approximately [-1, 1].
pub fn fbm_2d(pos: Vec2, seed: u32, octaves: usize, persistence: f32, lacunarity: f32) -> f32 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += perlin_2d(pos * frequency, seed) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}
