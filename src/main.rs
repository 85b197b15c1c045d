//! Chainbreak: drag chains of matching blocks in the terminal before the clock runs out.

mod app;
mod block;
mod game;
mod grid;
mod input;
mod level;
mod logging;
mod scoring;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    /// Seeds block generation.
    pub seed: u64,
    /// Overrides every level's time limit (seconds).
    pub time_limit: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        logging::init(path, args.verbose)?;
    }
    // A broken theme file should not stop the game.
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded: {e}");
        theme::Theme::default()
    });
    let config = GameConfig {
        seed: args.seed.unwrap_or_else(rand::random),
        time_limit: args.time_limit,
    };
    log::info!("seed {}", config.seed);
    let mut app = App::new(&args, &config, theme)?;
    app.run()?;
    Ok(())
}

/// Chain-matching block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "chainbreak",
    version,
    about = "Chain-matching block puzzle in the terminal. Link same-coloured blocks to clear them before time runs out.",
    long_about = "Chainbreak is a terminal chain-matching puzzle.\n\n\
        Drag across orthogonally adjacent blocks of one colour and release to clear them. \
        Longer chains score more; chains of 5+ also clear every unlocked block of that colour.\n\n\
        BLOCKS:\n  * rainbow  matches any colour      B bomb     clears its row\n  \
        S shield   +15 seconds               x3 multiply triples this chain and the next\n  \
        12 timer   turns to stone at zero    locked     unlocks when a neighbour clears\n\n\
        CONTROLS:\n  Mouse       Drag to chain, release to clear\n  \
        Arrows/hjkl Move cursor    Enter/Space Start / clear chain    Esc  Drop chain\n  \
        R           Restart        M           Menu                   Q    Quit"
)]
pub struct Args {
    /// Level to start on (1-6).
    #[arg(short, long, default_value = "1", value_name = "N")]
    pub level: u32,

    /// RNG seed for reproducible boards. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Time limit in seconds for every level (overrides the per-level limit).
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u32>,

    /// Skip the menu and start the level immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write log records to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Log debug records (per-chain details) as well.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_options() {
        let args = Args::try_parse_from([
            "chainbreak",
            "--level",
            "3",
            "--seed",
            "42",
            "--palette",
            "colourblind",
            "--no-menu",
        ])
        .unwrap();
        assert_eq!(args.level, 3);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.palette, Palette::Colorblind);
        assert!(args.no_menu);
        assert_eq!(args.time_limit, None);
    }
}
