//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use scenewright::AspectRatio;
use std::path::PathBuf;

/// Scenewright - turn a story idea into an illustrated screenplay
#[derive(Parser, Debug)]
#[command(name = "scenewright")]
#[command(about = "Turn a story idea into an illustrated screenplay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to layered scenewright.toml lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON-formatted logs
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a screenplay and export it
    Generate(GenerateArgs),
}

/// Arguments for `scenewright generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// The story idea
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub idea: Option<String>,

    /// Read the story idea from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Aspect ratio for generated images (16:9, 9:16 or 1:1)
    #[arg(long, value_parser = AspectRatio::parse)]
    pub aspect_ratio: Option<AspectRatio>,

    /// Character reference image (repeatable)
    #[arg(long = "character")]
    pub characters: Vec<PathBuf>,

    /// Generate a character reference from this description
    #[arg(long)]
    pub character_prompt: Option<String>,

    /// Generate a keyframe for every scene
    #[arg(long)]
    pub keyframes: bool,

    /// Generate and lock this scene's keyframe before the others
    #[arg(long)]
    pub anchor_scene: Option<u32>,

    /// Output directory
    #[arg(long, default_value = "scenewright-out")]
    pub out: PathBuf,
}
