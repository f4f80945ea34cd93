//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Render images as dot-matrix / halftone thermal labels
#[derive(Parser, Debug)]
#[command(name = "dotlabel")]
#[command(version, about = "Dot-matrix label renderer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render an image with the stored settings
    Render(RenderArgs),
    /// Generate artwork or label text remotely (needs API_KEY)
    Generate {
        #[command(subcommand)]
        action: GenerateAction,
    },
    /// Inspect or change the stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Source image (any format the image crate decodes)
    pub input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    pub output: PathBuf,

    /// One-off override, e.g. --set ditherMethod=Atkinson (not persisted)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Extra directory of .ttf/.otf fonts
    #[arg(long)]
    pub font_dir: Option<PathBuf>,

    /// Seed for the random dither
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum GenerateAction {
    /// Generate artwork and save it as PNG
    Image {
        prompt: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Generate a short label line
    Label {
        context: String,
        /// Store the text as the overlay text and enable it
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Change one or more settings
    Set {
        #[arg(value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Forget stored settings
    Reset,
}
