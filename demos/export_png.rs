//! Example: Render a texture and export it as a PNG
//!
//! Run with: cargo run --example export_png --features png

use texture_genius::*;

fn main() -> Result<()> {
    let config = TextureConfigBuilder::new()
        .random_seed(42)
        .seed_count(48)
        .output_size(512, 512)?
        .canvas_size(512.0, 512.0)?
        .edge_blend_width(3.0)?
        .overlay(Overlay::Vignette { strength: 0.3 })
        .build()?;

    println!("Synthesizing {}x{} texture...", config.output_width, config.output_height);
    let result = synthesize(&config)?;

    let path = "texture.png";
    result.raster.save_png(path)?;
    println!("Wrote {}", path);

    Ok(())
}
