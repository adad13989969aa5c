//! View mode management for the TUI.
//!
//! Defines the different views available in the application.


/// Current view mode of the application.
#[derive( Debug, Clone, PartialEq, Eq, Default )]
pub enum ViewMode {
    /// Dashboard - shelves of recently added and random albums.
    #[default]
    Dashboard,

    /// Album list.
    Albums,

    /// Artist list.
    Artists,

    /// Tracks of one album, opened by double-click.
    AlbumDetail { album_id: String },

    /// Albums of one artist, opened by double-click.
    ArtistDetail { artist: String },

    /// Help overlay - shows available commands.
    Help,

    /// Settings view - configure click behavior and defaults.
    Settings,
}


impl ViewMode {
    /// Returns the next view in tab order.
    ///
    /// Detail views and Help leave tab cycling to the list they came from.
    pub fn next_tab( &self ) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Albums,
            ViewMode::Albums => ViewMode::Artists,
            ViewMode::Artists => ViewMode::Settings,
            ViewMode::Settings => ViewMode::Dashboard,
            ViewMode::ArtistDetail { .. } => ViewMode::Artists,
            ViewMode::AlbumDetail { .. } | ViewMode::Help => ViewMode::Albums,
        }
    }


    /// Returns the previous view in tab order.
    pub fn prev_tab( &self ) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Settings,
            ViewMode::Albums => ViewMode::Dashboard,
            ViewMode::Artists => ViewMode::Albums,
            ViewMode::Settings => ViewMode::Artists,
            ViewMode::ArtistDetail { .. } => ViewMode::Artists,
            ViewMode::AlbumDetail { .. } | ViewMode::Help => ViewMode::Albums,
        }
    }


    /// Returns the header label of the view.
    pub fn title( &self ) -> &'static str {
        match self {
            ViewMode::Dashboard => "HOME",
            ViewMode::Albums => "ALBUMS",
            ViewMode::Artists => "ARTISTS",
            ViewMode::AlbumDetail { .. } => "ALBUM",
            ViewMode::ArtistDetail { .. } => "ARTIST",
            ViewMode::Help => "HELP",
            ViewMode::Settings => "SETTINGS",
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_tab_cycle_round_trips() {
        let mut view = ViewMode::default();
        assert_eq!( view, ViewMode::Dashboard );
        for _ in 0..4 {
            view = view.next_tab();
        }
        assert_eq!( view, ViewMode::Dashboard );
        assert_eq!( ViewMode::Albums.next_tab().prev_tab(), ViewMode::Albums );
        assert_eq!( ViewMode::Dashboard.prev_tab().next_tab(), ViewMode::Dashboard );
    }


    #[test]
    fn test_detail_tabs_back_to_list() {
        let detail = ViewMode::ArtistDetail { artist: "Davis".into() };
        assert_eq!( detail.next_tab(), ViewMode::Artists );
        let album = ViewMode::AlbumDetail { album_id: "/m/a".into() };
        assert_eq!( album.prev_tab(), ViewMode::Albums );
    }
}
