//! Command-line argument parsing for Sonance.

use std::path::PathBuf;

use clap::Parser;


/// Sonance - A terminal music library browser.
#[derive( Parser, Debug )]
#[command( name = "sonance" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Music folder to browse (overrides the saved setting).
    #[arg( short, long )]
    pub path: Option<PathBuf>,

    /// Start in the artist list instead of the album list.
    #[arg( short, long )]
    pub artists: bool,

    /// Double-click window in milliseconds (overrides the saved setting).
    #[arg( short, long, value_name = "MS" )]
    pub window_ms: Option<u64>,
}
