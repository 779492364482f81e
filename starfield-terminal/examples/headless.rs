/// Example: Step the star field without a terminal UI and print one frame
///
/// Usage: cargo run --example headless -- [seconds] [seed]

use std::env;
use std::io::{self, Write};
use std::time::Duration;
use starfield_core::{FrameClock, StarField, StarFieldConfig};
use starfield_terminal::{renderer::CELL_ASPECT, AsciiRenderer};

const WIDTH: usize = 100;
const HEIGHT: usize = 30;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let seconds: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(2.0);
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);

    let mut field = StarField::new(StarFieldConfig::home().with_seed(seed));
    let mut clock = FrameClock::new();

    // Fixed 60 FPS timestamps
    let frames = (seconds * 60.0) as u64;
    for frame in 0..=frames {
        let tick = clock.drive(Duration::from_micros(frame * 16_667), &mut field);
        if frame % 60 == 0 {
            let sky = field.sky_transform();
            let shooting = field.shooting_star_transform();
            println!(
                "t={:6.3}s sky=({:+.4}, {:+.4}) shooting pos=({:+8.2}, {:+8.2}) spin={:.4}",
                tick.elapsed,
                sky.rotation.x,
                sky.rotation.y,
                shooting.position.x,
                shooting.position.y,
                shooting.rotation.z
            );
        }
    }

    let mut camera = starfield_core::Camera::new(WIDTH as u32, HEIGHT as u32);
    camera.aspect *= CELL_ASPECT;

    let mut renderer = AsciiRenderer::new(WIDTH, HEIGHT);
    field.present(&mut renderer);
    renderer.render(&camera);

    let mut stdout = io::stdout().lock();
    for line in renderer.lines() {
        writeln!(stdout, "{line}")?;
    }
    writeln!(stdout, "{} of {} cells lit", renderer.lit_cells(), WIDTH * HEIGHT)?;
    Ok(())
}
