//! CLI command definitions for the `regen` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod image;
pub mod used;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use regen_types::image::{DEFAULT_WEATHER_CONDITION, ImageRequestContext, UsageContext};

/// Source background images for weather banners and community posts.
#[derive(Parser)]
#[command(name = "regen", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Port to listen on (default from config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config).
        #[arg(long)]
        host: Option<String>,
    },

    /// Request an image the way a client screen does: read the used list,
    /// resolve with retries, record the result.
    Request {
        #[command(flatten)]
        context: ContextArgs,

        /// Resolution server base URL (default from config).
        #[arg(long, conflicts_with = "local")]
        endpoint: Option<String>,

        /// Resolve in-process instead of calling a server.
        #[arg(long)]
        local: bool,
    },

    /// Resolve one image in-process without touching the used list.
    Resolve {
        #[command(flatten)]
        context: ContextArgs,

        /// Identifier to exclude (repeatable).
        #[arg(long = "exclude", value_name = "IDENTIFIER")]
        exclude: Vec<String>,

        /// Keep resolving until the result is not in the used list.
        #[arg(long)]
        unique: bool,
    },

    /// Print the prompt built for a request context.
    Prompt {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Inspect or reset the used image list.
    Used {
        #[command(subcommand)]
        action: UsedCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UsedCommand {
    /// List recorded identifiers, oldest first.
    #[command(alias = "ls")]
    List,

    /// Forget every recorded identifier.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Request context shared by the image commands.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// City or region shown on screen.
    #[arg(long, default_value = "")]
    pub location: String,

    /// Free-text weather condition (e.g. "Heavy rain").
    #[arg(long, default_value = DEFAULT_WEATHER_CONDITION)]
    pub weather: String,

    /// Where the image will be shown (weather-banner, community-post).
    #[arg(long, default_value = "weather-banner")]
    pub context: UsageContext,

    /// Community post theme (cleanliness-drive, tree-plantation, campaign, ...).
    #[arg(long)]
    pub theme: Option<String>,

    /// Temperature in degrees Celsius.
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Air quality index.
    #[arg(long)]
    pub aqi: Option<f64>,
}

impl ContextArgs {
    pub fn to_context(&self) -> ImageRequestContext {
        ImageRequestContext {
            location: self.location.clone(),
            weather_condition: self.weather.clone(),
            temperature: self.temperature,
            aqi: self.aqi,
            usage: self.context,
            post_theme: self.theme.clone(),
        }
    }
}
