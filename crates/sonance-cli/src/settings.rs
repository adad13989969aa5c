//! Application settings management
//!
//! Handles persistent settings for the library location, album sort and
//! click behavior.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{ Deserialize, Serialize };

use sonance_core::{ AlbumSort, ClickScope };


/// Shortest double-click window the settings view allows.
pub const MIN_WINDOW_MS: u64 = 50;

/// Longest double-click window the settings view allows.
pub const MAX_WINDOW_MS: u64 = 1000;


/// Application settings.
#[derive( Debug, Clone, PartialEq, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Music folder to scan. Defaults to the platform music directory.
    pub library_path: Option<PathBuf>,

    /// Sort used when the album list is first shown.
    pub album_sort: AlbumSort,

    /// Double-click disambiguation window in milliseconds.
    pub click_window_ms: u64,

    /// Whether one click timer covers the whole list or each row.
    pub click_scope: ClickScope,

    /// Click window for this run only, from the command line. Never saved.
    #[serde( skip )]
    pub window_override: Option<u64>,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            library_path: None,
            album_sort: AlbumSort::default(),
            click_window_ms: 100,
            click_scope: ClickScope::default(),
            window_override: None,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "sonance" ).join( "settings.json" ) )
    }


    /// Gets the click window in effect, clamped to the allowed range.
    pub fn click_window( &self ) -> Duration {
        let ms = self.window_override.unwrap_or( self.click_window_ms );
        Duration::from_millis( ms.clamp( MIN_WINDOW_MS, MAX_WINDOW_MS ) )
    }


    /// Sets the saved click window. A command-line override stops applying.
    pub fn set_click_window_ms( &mut self, ms: u64 ) {
        self.click_window_ms = ms.clamp( MIN_WINDOW_MS, MAX_WINDOW_MS );
        self.window_override = None;
    }


    /// Adjusts the click window in effect by `delta` milliseconds and saves
    /// the result as the new window.
    pub fn nudge_click_window( &mut self, delta: i64 ) {
        let current = self.click_window().as_millis() as i64;
        let next = ( current + delta ).clamp( MIN_WINDOW_MS as i64, MAX_WINDOW_MS as i64 );
        self.set_click_window_ms( next as u64 );
    }


    /// Parses settings from JSON, falling back to defaults on bad input.
    pub fn from_json( contents: &str ) -> Self {
        match serde_json::from_str( contents ) {
            Ok( settings ) => settings,
            Err( e ) => {
                tracing::warn!( "Invalid settings file, using defaults: {}", e );
                Self::default()
            }
        }
    }


    /// Loads settings from disk, or returns defaults if not found.
    pub fn load() -> Self {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string( &path ) {
            Ok( contents ) => Self::from_json( &contents ),
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    /// Saves settings to disk.
    pub fn save( &self ) {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return,
        };

        // Create parent directory if needed
        if let Some( parent ) = path.parent() {
            if !parent.exists() {
                if let Err( e ) = fs::create_dir_all( parent ) {
                    tracing::warn!( "Failed to create settings directory: {}", e );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( &path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json( r#"{ "click_scope": "row", "album_sort": "newest" }"# );
        assert_eq!( settings.click_scope, ClickScope::Row );
        assert_eq!( settings.album_sort, AlbumSort::Newest );
        assert_eq!( settings.click_window_ms, 100 );
        assert_eq!( settings.library_path, None );
    }


    #[test]
    fn test_bad_json_uses_defaults() {
        assert_eq!( Settings::from_json( "not json" ), Settings::default() );
    }


    #[test]
    fn test_click_window_clamped() {
        let mut settings = Settings::default();
        settings.nudge_click_window( -500 );
        assert_eq!( settings.click_window_ms, MIN_WINDOW_MS );
        settings.nudge_click_window( 5000 );
        assert_eq!( settings.click_window(), Duration::from_millis( MAX_WINDOW_MS ) );

        settings.click_window_ms = 1;
        assert_eq!( settings.click_window(), Duration::from_millis( MIN_WINDOW_MS ) );
    }


    #[test]
    fn test_window_override_is_never_saved() {
        let mut settings = Settings::default();
        settings.click_scope = ClickScope::Row;
        settings.window_override = Some( 300 );
        assert_eq!( settings.click_window(), Duration::from_millis( 300 ) );

        let json = serde_json::to_string( &settings ).unwrap();
        let restored = Settings::from_json( &json );
        assert_eq!( restored.click_scope, ClickScope::Row );
        assert_eq!( restored.window_override, None );
        assert_eq!( restored.click_window(), Duration::from_millis( 100 ) );
    }


    #[test]
    fn test_changing_window_drops_override() {
        let mut settings = Settings::default();
        settings.window_override = Some( 300 );
        settings.nudge_click_window( 10 );
        assert_eq!( settings.window_override, None );
        assert_eq!( settings.click_window_ms, 310 );

        settings.window_override = Some( 500 );
        settings.set_click_window_ms( 200 );
        assert_eq!( settings.click_window(), Duration::from_millis( 200 ) );
    }
}
