use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::extract::ExtractorConfig;

#[derive(Parser)]
#[command(name = "pdfpages")]
#[command(about = "Extract the text of selected PDF pages, from the command line or as an MCP server")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Largest accepted upload, in megabytes
    #[arg(long, env = "PDFPAGES_MAX_UPLOAD_MB", default_value = "50", global = true)]
    pub max_upload_mb: usize,

    /// Directory for transient upload files (defaults to the system temp dir)
    #[arg(long, env = "PDFPAGES_TEMP_DIR", global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "PDFPAGES_LOG_JSON", global = true)]
    pub log_json: bool,
}

impl Settings {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_upload_bytes: self.max_upload_mb.saturating_mul(1024 * 1024),
            temp_dir: self.temp_dir.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server (primary mode)
    Mcp,

    /// Extract text from specific pages
    ReadPages {
        /// PDF file to read
        path: PathBuf,

        /// Page spec (e.g., "1,3-5,8")
        pages: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which pages a page spec selects
    Resolve {
        /// Page spec (e.g., "1,3-5,8")
        pages: String,

        /// Number of pages in the document
        #[arg(short, long)]
        max: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let cli = Cli::try_parse_from(["pdfpages", "resolve", "1-3", "--max", "10"]).unwrap();
        let config = cli.settings.extractor_config();
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert!(config.temp_dir.is_none());
        assert!(matches!(cli.command, Commands::Resolve { max: 10, .. }));
    }

    #[test]
    fn test_global_settings_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pdfpages",
            "read-pages",
            "doc.pdf",
            "1",
            "--max-upload-mb",
            "2",
            "--temp-dir",
            "/var/tmp/pdfpages",
        ])
        .unwrap();
        let config = cli.settings.extractor_config();
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(config.temp_dir, Some(PathBuf::from("/var/tmp/pdfpages")));
    }
}
