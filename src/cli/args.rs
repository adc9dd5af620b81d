//! Command-line argument parsing for tcga-fetch
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::config::Config;

/// tcga-fetch - Download TCGA-BRCA data from the GDC API
#[derive(Parser, Debug)]
#[command(name = "tcga-fetch")]
#[command(version)]
#[command(about = "Fetch TCGA-BRCA RNA-seq manifests, clinical data and PAM50 subtypes from GDC", long_about = None)]
pub struct Args {
    /// Directory to save downloaded data files
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GDC API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// GDC project id
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (defaults to `all`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch manifest, clinical data and PAM50 subtypes
    All {
        /// Download the published PAM50 table if the API has none
        #[arg(long)]
        auto_download_pam50: bool,
    },

    /// Query the RNA-seq file manifest
    Manifest {
        /// GDC data type to query
        #[arg(long, default_value = "Gene Expression Quantification")]
        data_type: String,
    },

    /// Query clinical annotations for every case
    Clinical,

    /// Look up PAM50 subtype labels via every available method
    Pam50 {
        /// Download the published PAM50 table if the API has none
        #[arg(long)]
        auto_download: bool,
    },

    /// Download the published PAM50 subtype table
    FetchPam50 {
        /// URL to download from (defaults to the configured mirrors)
        #[arg(long)]
        url: Option<String>,

        /// Name to save the file as
        #[arg(long)]
        file_name: Option<String>,
    },

    /// Parse a local PAM50 subtype file
    LoadPam50 {
        /// Path to the subtype file
        path: PathBuf,
    },

    /// Download a single GDC file by UUID
    Download {
        /// GDC file UUID
        file_id: String,

        /// Name to save the file as
        file_name: String,
    },

    /// Download the files listed in the expression manifest
    DownloadManifest {
        /// Only download the first N files
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Check GDC API status
    Status,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run; a bare invocation runs `all` with PAM50 auto-download
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::All {
            auto_download_pam50: true,
        })
    }

    /// Apply flag overrides on top of a loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir = dir.to_string_lossy().into_owned();
        }
        if let Some(url) = &self.base_url {
            config.gdc.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(project) = &self.project {
            config.gdc.project_id = project.clone();
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default tracing filter directive when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
