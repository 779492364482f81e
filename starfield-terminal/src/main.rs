/// Starfield Terminal - Animated star field backdrop
///
/// Controls:
///   - Mouse: Tilt the sky
///   - +/-: More or fewer stars
///   - [/]: More or fewer shooting stars
///   - R: Reseed
///   - Q/ESC: Quit

use clap::Parser;
use std::io;
use std::path::PathBuf;
use starfield_core::{StarField, StarFieldConfig, MAX_COUNT};
use starfield_terminal::TerminalApp;

#[derive(Parser, Debug)]
#[command(version, about = "Animated star field in the terminal")]
struct Args {
    /// Config file with `count`, `shootingStarCount` and `seed` options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from the denser landing page preset
    #[arg(long)]
    home: bool,

    /// Number of sky stars
    #[arg(short = 'n', long, value_parser = count_parser())]
    count: Option<u64>,

    /// Number of shooting stars
    #[arg(short, long, value_parser = count_parser())]
    shooting_star_count: Option<u64>,

    /// Seed for reproducible star positions
    #[arg(long)]
    seed: Option<u64>,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

impl Args {
    fn star_field_config(&self) -> io::Result<StarFieldConfig> {
        let mut config = match &self.config {
            Some(path) => StarFieldConfig::load(path).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to load {}: {}", path.display(), e),
                )
            })?,
            None if self.home => StarFieldConfig::home(),
            None => StarFieldConfig::default(),
        };

        if let Some(count) = self.count {
            config.count = count as usize;
        }
        if let Some(shooting_star_count) = self.shooting_star_count {
            config.shooting_star_count = shooting_star_count as usize;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn count_parser() -> clap::builder::RangedU64ValueParser {
    clap::value_parser!(u64).range(..=MAX_COUNT as u64)
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let config = args.star_field_config()?;

    println!(
        "Starfield - generating {} stars and {} shooting stars...",
        config.count, config.shooting_star_count
    );
    let field = StarField::new(config);

    println!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(field)?.with_target_fps(args.fps);
    app.run()?;

    println!("Thank you for watching the stars!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_flags_are_bounded() {
        let args = Args::try_parse_from(["starfield-terminal", "-n", "1000000", "-s", "7"]).unwrap();
        let config = args.star_field_config().unwrap();
        assert_eq!(config.count, MAX_COUNT);
        assert_eq!(config.shooting_star_count, 7);

        assert!(Args::try_parse_from(["starfield-terminal", "--count", "9223372036854775807"]).is_err());
        assert!(Args::try_parse_from(["starfield-terminal", "-s", "1000001"]).is_err());
    }
}
