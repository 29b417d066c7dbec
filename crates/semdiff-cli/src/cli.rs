//! Command-line surface, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Html,
    HtmlFragment,
    InlineHtml,
    Unified,
    Console,
}

/// Mirrors [`semdiff::config::ImpactFilter`] — a local copy rather than a
/// re-export so the core crate doesn't have to depend on `clap`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImpactFilterArg {
    BreakingPublic,
    BreakingInternal,
    NonBreaking,
    All,
}

impl From<ImpactFilterArg> for semdiff::config::ImpactFilter {
    fn from(value: ImpactFilterArg) -> Self {
        match value {
            ImpactFilterArg::BreakingPublic => Self::BreakingPublic,
            ImpactFilterArg::BreakingInternal => Self::BreakingInternal,
            ImpactFilterArg::NonBreaking => Self::NonBreaking,
            ImpactFilterArg::All => Self::All,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "semdiff", version, about = "Structural semantic diff for C#-like and VB-like source")]
pub struct Args {
    /// Path to the old file or folder.
    pub old: Option<PathBuf>,

    /// Path to the new file or folder.
    pub new: Option<PathBuf>,

    /// Diff a `old..new` ref range inside the repository at `--repo` instead
    /// of comparing two paths directly.
    #[arg(long, value_name = "OLD..NEW")]
    pub ref_range: Option<String>,

    /// Repository root used with `--ref-range`. Defaults to the current
    /// directory.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Path to a `semdiff.toml` configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output renderer.
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Force ANSI color on/off for `--format console`. Defaults to
    /// respecting `NO_COLOR` and whether stdout is a terminal.
    #[arg(long)]
    pub color: bool,

    #[arg(long)]
    pub no_color: bool,

    /// Stylesheet link emitted by the HTML renderers.
    #[arg(long, value_name = "HREF")]
    pub stylesheet: Option<String>,

    /// A build profile this run's results apply to. May be repeated; the
    /// CLI runs once per `--profile` and merges the resulting trees before
    /// rendering (§4.8).
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Restrict output to changes at or above this impact tier (§6
    /// `impact_filter`). Overrides the config file's `[impact] filter`.
    #[arg(long, value_enum)]
    pub impact_filter: Option<ImpactFilterArg>,

    /// Include `FormattingOnly` changes in the result. Off by default —
    /// overrides the config file's `[impact] include_formatting`.
    #[arg(long)]
    pub include_formatting: bool,

    /// Exclude `NonBreaking` changes from the result. On by default —
    /// overrides the config file's `[impact] include_non_impactful`.
    #[arg(long)]
    pub exclude_non_impactful: bool,

    /// Emit structured JSON logs instead of the default human-readable
    /// tracing output.
    #[arg(long)]
    pub log_json: bool,

    /// Run environment self-checks (config validity, glob compilation,
    /// repository detection) and exit without diffing anything.
    #[arg(long)]
    pub diagnose: bool,
}

impl Args {
    pub fn use_color(&self) -> bool {
        if self.no_color || std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        self.color
    }
}
