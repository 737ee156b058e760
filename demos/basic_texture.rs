//! Complete workflow demonstration for texture_genius

use texture_genius::*;

fn main() -> Result<()> {
    println!("=== texture_genius Demo ===\n");

    // Step 1: Configure the run
    println!("Step 1: Configuring synthesis...");
    let config = TextureConfigBuilder::new()
        .random_seed(12345)
        .seed_count(32)
        .distribution(SeedDistribution::LloydRelaxed {
            iterations: 3,
            convergence: 0.01,
        })
        .output_size(256, 256)?
        .edge_blend_width(2.0)?
        .build()?;

    println!("  Random seed: {}", config.random_seed);
    println!("  Seeds: {} ({})", config.seed_count, config.distribution.name());
    println!("  Canvas: {}x{}", config.canvas_width, config.canvas_height);
    println!("  Output: {}x{}", config.output_width, config.output_height);

    // Step 2: Run the pipeline with progress reporting
    println!("\nStep 2: Synthesizing...");
    let result = synthesize_with(&config, &CancelToken::new(), |stage| {
        println!("  [{}]", stage.name());
    })?;
    println!("  Rendered {} cells", result.partition.cell_count());

    // Step 3: Inspect the partition
    println!("\nStep 3: Partition statistics:");
    let areas: Vec<f32> = result.partition.cells().iter().map(|c| c.area()).collect();
    let total: f32 = areas.iter().sum();
    let largest = areas.iter().cloned().fold(0.0, f32::max);
    println!("  Total cell area: {:.1} (canvas {:.1})", total, config.canvas_area());
    println!("  Largest cell: {:.1}", largest);
    let neighbor_sum: usize = result
        .partition
        .cells()
        .iter()
        .map(|c| c.neighbor_count())
        .sum();
    println!(
        "  Average neighbors: {:.2}",
        neighbor_sum as f32 / result.partition.cell_count() as f32
    );

    // Step 4: Resolve a few points to cells
    println!("\nStep 4: Point location:");
    for p in [Vec2::new(10.0, 10.0), Vec2::new(128.0, 128.0), Vec2::new(250.0, 30.0)] {
        let id = result.partition.locate(p);
        println!("  {:?} -> cell {}", p, id);
    }

    // Step 5: Sample the raster
    println!("\nStep 5: Raster sample:");
    let raster = &result.raster;
    for (x, y) in [(0, 0), (128, 128), (255, 255)] {
        println!("  pixel ({}, {}) = {:?}", x, y, raster.pixel(x, y));
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
