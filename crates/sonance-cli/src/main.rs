//! Sonance CLI - Terminal UI music library browser

mod cli;
mod fetch;
mod input;
mod pane;
mod settings;
mod view;

use std::fs::{ self, File };
use std::io;
use std::sync::Mutex;
use std::time::{ Duration, Instant };

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{ self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind },
    terminal::{ disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen },
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{ Block, Borders, List, ListItem, Paragraph, Wrap },
};
use tracing_subscriber::EnvFilter;

use cli::Args;
use fetch::{ FetchResult, Fetcher, QueryKey };
use input::{ InputBuffer, InputMode };
use pane::{ KeyOutcome, ListPane };
use settings::Settings;
use view::ViewMode;

use sonance_core::{
    command,
    library::{ ALBUM_SEARCH_FIELDS, ARTIST_SEARCH_FIELDS },
    search::Searchable,
    Album, AlbumSort, Artist, Catalog, Command, CommandError, Item, LibraryScanner, ListEvent, Modifiers,
    SHELVES,
};


/// Longest the event loop waits for input before ticking.
const TICK_RATE: Duration = Duration::from_millis( 100 );


/// Application state.
struct App {
    fetcher: Fetcher,
    should_quit: bool,

    // View state
    view_mode: ViewMode,
    back_stack: Vec<ViewMode>,
    album_sort: AlbumSort,

    // List views
    albums: ListPane<Album>,
    artists: ListPane<Artist>,
    artist_albums: ListPane<Album>,

    // Dashboard shelves, one pane per entry of SHELVES
    shelves: Vec<ListPane<Album>>,
    shelf_focus: usize,

    // Store list areas for mouse hit detection
    list_area: Option<Rect>,
    shelf_areas: Vec<Rect>,

    // Input state
    input_mode: InputMode,
    input_buffer: InputBuffer,

    // Help view scroll offset
    help_scroll: u16,

    // Status message (shown in status bar)
    status_message: Option<String>,
    status_clear_at: Option<Instant>,

    // Settings
    settings: Settings,
    settings_selected: usize,
}


impl App {
    /// Creates a new App instance.
    fn new( args: &Args ) -> Result<Self> {
        let mut settings = Settings::load();
        settings.window_override = args.window_ms;

        let root = args.path.clone()
            .or_else( || settings.library_path.clone() )
            .or_else( LibraryScanner::default_root );
        let roots = root.into_iter().collect::<Vec<_>>();
        tracing::info!( "Library roots: {:?}", roots );

        let window = settings.click_window();
        let scope = settings.click_scope;

        let view_mode = if args.artists {
            ViewMode::Artists
        } else {
            ViewMode::Dashboard
        };

        let mut app = Self {
            fetcher: Fetcher::new( roots )?,
            should_quit: false,
            view_mode,
            back_stack: Vec::new(),
            album_sort: settings.album_sort,
            albums: ListPane::new( ALBUM_SEARCH_FIELDS, window, scope ),
            artists: ListPane::new( ARTIST_SEARCH_FIELDS, window, scope ),
            artist_albums: ListPane::new( ALBUM_SEARCH_FIELDS, window, scope ),
            shelves: SHELVES.iter()
                .map( |_| ListPane::new( ALBUM_SEARCH_FIELDS, window, scope ) )
                .collect(),
            shelf_focus: 0,
            list_area: None,
            shelf_areas: Vec::new(),
            input_mode: InputMode::Normal,
            input_buffer: InputBuffer::new(),
            help_scroll: 0,
            status_message: None,
            status_clear_at: None,
            settings,
            settings_selected: 0,
        };

        app.fetcher.request( QueryKey::Albums( app.album_sort ) );
        app.fetcher.request( QueryKey::Artists );
        Ok( app )
    }


    /// Sets a status message that auto-clears after a delay.
    fn set_status( &mut self, msg: impl Into<String> ) {
        self.status_message = Some( msg.into() );
        self.status_clear_at = Some( Instant::now() + Duration::from_secs( 3 ) );
    }


    fn albums_key( &self ) -> QueryKey {
        QueryKey::Albums( self.album_sort )
    }


    /// Cache key backing the current view, if any.
    fn active_key( &self ) -> Option<QueryKey> {
        match self.view_mode {
            ViewMode::Albums | ViewMode::AlbumDetail { .. } => Some( self.albums_key() ),
            ViewMode::Dashboard | ViewMode::Artists | ViewMode::ArtistDetail { .. } => Some( QueryKey::Artists ),
            ViewMode::Help | ViewMode::Settings => None,
        }
    }


    /// Updates app state (clears expired messages, applies fetches, fires click timers).
    fn tick( &mut self ) {
        let now = Instant::now();

        // Clear expired status messages
        if let Some( clear_at ) = self.status_clear_at {
            if now >= clear_at {
                self.status_message = None;
                self.status_clear_at = None;
            }
        }

        for result in self.fetcher.poll() {
            self.apply_fetch( result );
        }

        let album_events = self.albums.tick( now );
        self.dispatch_album_events( album_events );
        let artist_events = self.artists.tick( now );
        self.dispatch_artist_events( artist_events );
        let artist_album_events = self.artist_albums.tick( now );
        self.dispatch_album_events( artist_album_events );
        let shelf_events: Vec<_> = self.shelves.iter_mut()
            .flat_map( |shelf| shelf.tick( now ) )
            .collect();
        self.dispatch_album_events( shelf_events );

        let active = [ self.albums_key(), QueryKey::Artists ];
        self.fetcher.evict( now, &active );
    }


    /// Pushes a finished fetch into the list views that show it. A failed
    /// fetch leaves every view as it was and reports the error.
    fn apply_fetch( &mut self, result: FetchResult ) {
        let FetchResult { key, outcome } = result;
        let catalog = match outcome {
            Ok(()) => Ok( self.fetcher.get( key ).cloned().unwrap_or_default() ),
            Err( e ) => Err( e ),
        };

        let applied = match key {
            QueryKey::Albums( sort ) if sort == self.album_sort => {
                self.albums.apply_fetch( catalog.map( |c| c.albums ) )
            }
            QueryKey::Albums( _ ) => catalog.map( |_| () ),
            QueryKey::Artists => match catalog {
                Ok( catalog ) => {
                    self.apply_library( &catalog );
                    Ok(())
                }
                Err( e ) => self.artists.apply_fetch( Err( e ) ),
            },
        };

        if let Err( e ) = applied {
            self.set_status( format!( "Failed to load library: {}", e ) );
        }
    }


    /// Refills the views built from the whole library.
    fn apply_library( &mut self, catalog: &Catalog ) {
        self.artists.set_items( catalog.artists.clone() );
        if let ViewMode::ArtistDetail { artist } = &self.view_mode {
            self.artist_albums.set_items( catalog.albums_by( artist ) );
        }
        for ( pane, shelf ) in self.shelves.iter_mut().zip( SHELVES.iter() ) {
            pane.set_items( shelf.albums( catalog ) );
        }
    }


    fn dispatch_album_events( &mut self, events: Vec<ListEvent<String>> ) {
        for event in events {
            if let ListEvent::Navigate( album_id ) = event {
                self.navigate( ViewMode::AlbumDetail { album_id } );
            }
        }
    }


    fn dispatch_artist_events( &mut self, events: Vec<ListEvent<String>> ) {
        for event in events {
            if let ListEvent::Navigate( artist ) = event {
                self.open_artist( artist );
            }
        }
    }


    /// Switches to a detail view, remembering where we came from.
    fn navigate( &mut self, target: ViewMode ) {
        tracing::debug!( "Navigate: {:?}", target );
        let previous = std::mem::replace( &mut self.view_mode, target );
        self.back_stack.push( previous );
    }


    fn open_artist( &mut self, artist: String ) {
        let albums = self.fetcher
            .get( QueryKey::Artists )
            .map( |catalog| catalog.albums_by( &artist ) )
            .unwrap_or_default();

        self.artist_albums.interaction.clear_selection();
        self.artist_albums.listing.clear_query();
        self.artist_albums.set_items( albums );
        self.artist_albums.listing.cursor_first();
        self.artist_albums.state = Default::default();
        self.navigate( ViewMode::ArtistDetail { artist } );
    }


    /// Returns to the view a detail view was opened from.
    fn go_back( &mut self ) {
        self.view_mode = self.back_stack.pop().unwrap_or_default();
    }


    /// Finds an album in the library, falling back to the album list while
    /// the full library is still loading.
    fn find_album( &self, id: &str ) -> Option<&Album> {
        self.fetcher
            .peek( QueryKey::Artists )
            .and_then( |catalog| catalog.album( id ) )
            .or_else( || self.albums.listing.items().iter().find( |a| a.id() == id ) )
    }


    /// Changes the album sort. Like switching sort in a search-capable list,
    /// this clears the search query and loads the list under the new sort.
    fn set_album_sort( &mut self, sort: AlbumSort ) {
        self.album_sort = sort;

        let key = self.albums_key();
        let cached = self.fetcher.get( key ).map( |catalog| catalog.albums.clone() );
        let albums = match cached {
            Some( albums ) => albums,
            None => {
                self.fetcher.request( key );
                Vec::new()
            }
        };
        self.albums.reorder( albums );
        self.set_status( format!( "Sort: {}", sort.label() ) );
    }


    /// Refetches the data behind the current view.
    fn refresh( &mut self ) {
        match self.active_key() {
            Some( key ) => {
                if self.fetcher.refresh( key ) {
                    self.set_status( "Refreshing..." );
                }
            }
            None => self.set_status( "Nothing to refresh here" ),
        }
    }


    /// Applies click settings to every list and saves them.
    fn apply_click_settings( &mut self ) {
        let window = self.settings.click_window();
        let scope = self.settings.click_scope;
        self.albums.set_click_settings( window, scope );
        self.artists.set_click_settings( window, scope );
        self.artist_albums.set_click_settings( window, scope );
        for shelf in &mut self.shelves {
            shelf.set_click_settings( window, scope );
        }
        self.settings.save();
    }


    /// Earliest moment a pending click needs the loop to wake up.
    fn next_deadline( &self ) -> Option<Instant> {
        [
            self.albums.next_deadline(),
            self.artists.next_deadline(),
            self.artist_albums.next_deadline(),
        ]
        .into_iter()
        .chain( self.shelves.iter().map( ListPane::next_deadline ) )
        .flatten()
        .min()
    }


    /// Handles a key event.
    fn handle_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key( code, modifiers ),
            InputMode::Command => self.handle_command_key( code ),
            InputMode::Search => self.handle_search_key( code ),
        }
    }


    /// Handles mouse events.
    fn handle_mouse( &mut self, mouse: MouseEvent ) {
        match mouse.kind {
            MouseEventKind::Down( MouseButton::Left ) => {
                let modifiers = Modifiers {
                    range: mouse.modifiers.contains( KeyModifiers::SHIFT ),
                    multi: mouse.modifiers.intersects( KeyModifiers::CONTROL | KeyModifiers::ALT ),
                };
                let now = Instant::now();

                if self.view_mode == ViewMode::Dashboard {
                    self.click_shelf( mouse.column, mouse.row, modifiers, now );
                    return;
                }

                let Some( area ) = self.list_area else {
                    return;
                };

                match self.view_mode {
                    ViewMode::Albums => {
                        if let Some( idx ) = self.albums.row_at( area, mouse.column, mouse.row ) {
                            let events = self.albums.pointer_down( idx, modifiers, now );
                            self.dispatch_album_events( events );
                        }
                    }
                    ViewMode::Artists => {
                        if let Some( idx ) = self.artists.row_at( area, mouse.column, mouse.row ) {
                            let events = self.artists.pointer_down( idx, modifiers, now );
                            self.dispatch_artist_events( events );
                        }
                    }
                    ViewMode::ArtistDetail { .. } => {
                        if let Some( idx ) = self.artist_albums.row_at( area, mouse.column, mouse.row ) {
                            let events = self.artist_albums.pointer_down( idx, modifiers, now );
                            self.dispatch_album_events( events );
                        }
                    }
                    _ => {}
                }
            }
            MouseEventKind::ScrollUp => {
                self.handle_list_key( KeyCode::Up, KeyModifiers::NONE );
            }
            MouseEventKind::ScrollDown => {
                self.handle_list_key( KeyCode::Down, KeyModifiers::NONE );
            }
            _ => {}
        }
    }


    /// Routes a dashboard click to the shelf under the pointer.
    fn click_shelf( &mut self, column: u16, row: u16, modifiers: Modifiers, now: Instant ) {
        let hit = self.shelf_areas.iter()
            .zip( &self.shelves )
            .enumerate()
            .find_map( |( i, ( area, shelf ) )| shelf.row_at( *area, column, row ).map( |idx| ( i, idx ) ) );

        if let Some(( focus, idx )) = hit {
            self.shelf_focus = focus;
            let events = self.shelves[ focus ].pointer_down( idx, modifiers, now );
            self.dispatch_album_events( events );
        }
    }


    fn handle_normal_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) {
        // Global keys (work in any view)
        match code {
            KeyCode::Char( '/' ) => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
                return;
            }
            KeyCode::Tab => {
                self.view_mode = self.view_mode.next_tab();
                self.back_stack.clear();
                return;
            }
            KeyCode::BackTab => {
                self.view_mode = self.view_mode.prev_tab();
                self.back_stack.clear();
                return;
            }
            KeyCode::Char( '?' ) => {
                if self.view_mode != ViewMode::Help {
                    self.navigate( ViewMode::Help );
                }
                return;
            }
            _ => {}
        }

        // View-specific keys
        match self.view_mode {
            ViewMode::Dashboard | ViewMode::Albums | ViewMode::Artists | ViewMode::ArtistDetail { .. } => {
                if !self.handle_list_key( code, modifiers ) {
                    self.handle_browse_key( code );
                }
            }
            ViewMode::AlbumDetail { .. } => self.handle_detail_key( code ),
            ViewMode::Help => self.handle_help_key( code ),
            ViewMode::Settings => self.handle_settings_key( code ),
        }
    }


    /// Routes a key to the active list pane.
    ///
    /// @returns true if the pane handled the key
    fn handle_list_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) -> bool {
        match self.view_mode {
            ViewMode::Dashboard => match code {
                KeyCode::Left | KeyCode::Char( 'h' ) => {
                    self.shelf_focus = self.shelf_focus.saturating_sub( 1 );
                }
                KeyCode::Right | KeyCode::Char( 'l' ) => {
                    self.shelf_focus = ( self.shelf_focus + 1 ).min( self.shelves.len().saturating_sub( 1 ) );
                }
                _ => {
                    let Some( shelf ) = self.shelves.get_mut( self.shelf_focus ) else {
                        return false;
                    };
                    match shelf.handle_key( code, modifiers ) {
                        KeyOutcome::Open( album_id ) => self.navigate( ViewMode::AlbumDetail { album_id } ),
                        KeyOutcome::Handled => {}
                        KeyOutcome::Ignored => return false,
                    }
                }
            },
            ViewMode::Albums => match self.albums.handle_key( code, modifiers ) {
                KeyOutcome::Open( album_id ) => self.navigate( ViewMode::AlbumDetail { album_id } ),
                KeyOutcome::Handled => {}
                KeyOutcome::Ignored => return false,
            },
            ViewMode::Artists => match self.artists.handle_key( code, modifiers ) {
                KeyOutcome::Open( artist ) => self.open_artist( artist ),
                KeyOutcome::Handled => {}
                KeyOutcome::Ignored => return false,
            },
            ViewMode::ArtistDetail { .. } => match self.artist_albums.handle_key( code, modifiers ) {
                KeyOutcome::Open( album_id ) => self.navigate( ViewMode::AlbumDetail { album_id } ),
                KeyOutcome::Handled => {}
                KeyOutcome::Ignored => return false,
            },
            _ => return false,
        }
        true
    }


    /// Keys shared by the list views that the panes leave alone.
    fn handle_browse_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) => {
                self.should_quit = true;
            }
            KeyCode::Char( 'f' ) => {
                if let Some( query ) = self.active_query() {
                    self.input_mode = InputMode::Search;
                    self.input_buffer.set( &query );
                }
            }
            KeyCode::Char( 'o' ) if self.view_mode == ViewMode::Albums => {
                self.set_album_sort( self.album_sort.next() );
            }
            KeyCode::Char( 'R' ) => {
                self.refresh();
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if let ViewMode::ArtistDetail { .. } = self.view_mode {
                    self.go_back();
                } else if self.active_query().is_some_and( |q| !q.is_empty() ) {
                    self.set_active_query( "" );
                }
            }
            _ => {}
        }
    }


    fn handle_detail_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char( 'h' ) => {
                self.go_back();
            }
            _ => {}
        }
    }


    fn handle_help_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Char( 'q' ) | KeyCode::Esc | KeyCode::Char( '?' ) => {
                self.go_back();
                self.help_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char( 'k' ) => {
                self.help_scroll = self.help_scroll.saturating_sub( 1 );
            }
            KeyCode::Down | KeyCode::Char( 'j' ) => {
                self.help_scroll = self.help_scroll.saturating_add( 1 );
            }
            KeyCode::PageUp => {
                self.help_scroll = self.help_scroll.saturating_sub( 10 );
            }
            KeyCode::PageDown => {
                self.help_scroll = self.help_scroll.saturating_add( 10 );
            }
            KeyCode::Home => {
                self.help_scroll = 0;
            }
            _ => {}
        }
    }


    fn handle_settings_key( &mut self, code: KeyCode ) {
        const SETTINGS_COUNT: usize = 3;

        match code {
            KeyCode::Char( 'q' ) => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                self.view_mode = ViewMode::Dashboard;
            }
            KeyCode::Up | KeyCode::Char( 'k' ) => {
                self.settings_selected = self.settings_selected
                    .checked_sub( 1 )
                    .unwrap_or( SETTINGS_COUNT - 1 );
            }
            KeyCode::Down | KeyCode::Char( 'j' ) => {
                self.settings_selected = ( self.settings_selected + 1 ) % SETTINGS_COUNT;
            }
            KeyCode::Enter | KeyCode::Char( ' ' ) | KeyCode::Left | KeyCode::Right => {
                let step: i64 = if code == KeyCode::Left { -10 } else { 10 };
                match self.settings_selected {
                    0 => {
                        self.settings.click_scope = self.settings.click_scope.toggled();
                        self.apply_click_settings();
                        self.set_status( format!( "Click timer: {}", self.settings.click_scope.name() ) );
                    }
                    1 => {
                        self.settings.nudge_click_window( step );
                        self.apply_click_settings();
                        self.set_status( format!( "Double-click window: {} ms", self.settings.click_window_ms ) );
                    }
                    2 => {
                        self.settings.album_sort = self.settings.album_sort.next();
                        self.settings.save();
                        self.set_status( format!( "Default sort: {}", self.settings.album_sort.label() ) );
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }


    fn handle_command_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                let input = self.input_buffer.content();
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.execute_command( &input );
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Backspace => {
                if self.input_buffer.is_empty() {
                    self.input_mode = InputMode::Normal;
                } else {
                    self.input_buffer.backspace();
                }
            }
            KeyCode::Delete => self.input_buffer.delete(),
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Home => self.input_buffer.move_home(),
            KeyCode::End => self.input_buffer.move_end(),
            KeyCode::Char( c ) => self.input_buffer.insert( c ),
            _ => {}
        }
    }


    fn handle_search_key( &mut self, code: KeyCode ) {
        match code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.set_active_query( "" );
            }
            KeyCode::Backspace => {
                self.input_buffer.backspace();
                self.set_active_query( &self.input_buffer.content() );
            }
            KeyCode::Left => self.input_buffer.move_left(),
            KeyCode::Right => self.input_buffer.move_right(),
            KeyCode::Char( c ) => {
                self.input_buffer.insert( c );
                self.set_active_query( &self.input_buffer.content() );
            }
            _ => {}
        }
    }


    /// Gets the search query of the active list view.
    fn active_query( &self ) -> Option<String> {
        match self.view_mode {
            ViewMode::Albums => Some( self.albums.listing.query().to_string() ),
            ViewMode::Artists => Some( self.artists.listing.query().to_string() ),
            ViewMode::ArtistDetail { .. } => Some( self.artist_albums.listing.query().to_string() ),
            _ => None,
        }
    }


    /// Sets the search query of the active list view. Selection is untouched.
    fn set_active_query( &mut self, query: &str ) {
        match self.view_mode {
            ViewMode::Albums => self.albums.listing.set_query( query ),
            ViewMode::Artists => self.artists.listing.set_query( query ),
            ViewMode::ArtistDetail { .. } => self.artist_albums.listing.set_query( query ),
            _ => {}
        }
    }


    fn execute_command( &mut self, input: &str ) {
        match Command::parse( input ) {
            Ok( cmd ) => {
                if let Err( e ) = self.run_command( cmd ) {
                    self.set_status( format!( "Error: {}", e ) );
                }
            }
            Err( e ) => {
                self.set_status( format!( "{}", e ) );
            }
        }
    }


    fn run_command( &mut self, cmd: Command ) -> Result<()> {
        match cmd {
            Command::Search { term } => {
                if self.active_query().is_none() {
                    self.view_mode = ViewMode::Albums;
                }
                self.set_active_query( &term );
            }
            Command::Sort { sort } => {
                let sort = sort.unwrap_or_else( || self.album_sort.next() );
                self.view_mode = ViewMode::Albums;
                self.set_album_sort( sort );
            }
            Command::Refresh => self.refresh(),
            Command::Home => {
                self.view_mode = ViewMode::Dashboard;
                self.back_stack.clear();
            }
            Command::Albums => {
                self.view_mode = ViewMode::Albums;
                self.back_stack.clear();
            }
            Command::Artists => {
                self.view_mode = ViewMode::Artists;
                self.back_stack.clear();
            }
            Command::Clear => {
                self.albums.interaction.clear_selection();
                self.artists.interaction.clear_selection();
                self.artist_albums.interaction.clear_selection();
                for shelf in &mut self.shelves {
                    shelf.interaction.clear_selection();
                }
                self.set_status( "Selection cleared" );
            }
            Command::All => {
                let count = match self.view_mode {
                    ViewMode::Albums => {
                        self.albums.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
                        self.albums.visible_selection_count()
                    }
                    ViewMode::Artists => {
                        self.artists.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
                        self.artists.visible_selection_count()
                    }
                    ViewMode::ArtistDetail { .. } => {
                        self.artist_albums.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
                        self.artist_albums.visible_selection_count()
                    }
                    ViewMode::Dashboard if self.shelf_focus < self.shelves.len() => {
                        let shelf = &mut self.shelves[ self.shelf_focus ];
                        shelf.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
                        shelf.visible_selection_count()
                    }
                    _ => return Err( CommandError::ExecutionFailed( "no list to select from".into() ).into() ),
                };
                self.set_status( format!( "Selected {}", count ) );
            }
            Command::Window { window } => {
                self.settings.set_click_window_ms( window.as_millis() as u64 );
                self.apply_click_settings();
                self.set_status( format!( "Double-click window: {} ms", self.settings.click_window().as_millis() ) );
            }
            Command::Scope { scope } => {
                self.settings.click_scope = scope.unwrap_or_else( || self.settings.click_scope.toggled() );
                self.apply_click_settings();
                self.set_status( format!( "Click timer: {}", self.settings.click_scope.name() ) );
            }
            Command::Help => {
                if self.view_mode != ViewMode::Help {
                    self.navigate( ViewMode::Help );
                }
            }
            Command::Quit => {
                self.should_quit = true;
            }
        }
        Ok(())
    }
}


/// Sends tracing output to a log file; the terminal belongs to the UI.
fn init_logging() {
    let Some( dir ) = dirs::data_dir().map( |d| d.join( "sonance" ) ) else {
        return;
    };
    if fs::create_dir_all( &dir ).is_err() {
        return;
    }
    let Ok( file ) = File::create( dir.join( "sonance.log" ) ) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new( "info" ) );
    tracing_subscriber::fmt()
        .with_env_filter( filter )
        .with_writer( Mutex::new( file ) )
        .with_ansi( false )
        .init();
}


fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // Create app before taking over the terminal so startup errors stay readable
    let mut app = App::new( &args )?;

    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute( EnterAlternateScreen )?;
    io::stdout().execute( crossterm::event::EnableMouseCapture )?;

    let mut terminal = Terminal::new( CrosstermBackend::new( io::stdout() ) )?;

    // Main loop
    let outcome = run( &mut terminal, &mut app );

    // Cleanup
    io::stdout().execute( crossterm::event::DisableMouseCapture )?;
    disable_raw_mode()?;
    io::stdout().execute( LeaveAlternateScreen )?;

    outcome
}


fn run( terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App ) -> Result<()> {
    loop {
        // Update state
        app.tick();

        // Draw UI
        terminal.draw( |frame| draw_ui( frame, app ) )?;

        // Wake up early when a click window is about to close
        let timeout = app.next_deadline()
            .map( |deadline| deadline.saturating_duration_since( Instant::now() ).min( TICK_RATE ) )
            .unwrap_or( TICK_RATE );

        if event::poll( timeout )? {
            match event::read()? {
                Event::Key( key ) if key.kind == KeyEventKind::Press => {
                    app.handle_key( key.code, key.modifiers );
                }
                Event::Mouse( mouse ) => {
                    app.handle_mouse( mouse );
                }
                _ => {}
            }
        }

        if app.should_quit {
            tracing::info!( "Quitting" );
            return Ok(());
        }
    }
}


/// Draws the main UI.
fn draw_ui( frame: &mut Frame, app: &mut App ) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction( Direction::Vertical )
        .constraints([
            Constraint::Length( 2 ),  // Header
            Constraint::Min( 0 ),     // Main content
            Constraint::Length( 1 ),  // Status bar
        ])
        .split( area );

    let header = Paragraph::new( format!( "  SONANCE - {}", app.view_mode.title() ) )
        .style( Style::default().fg( Color::Cyan ).bold() )
        .block( Block::default().borders( Borders::BOTTOM ) );
    frame.render_widget( header, chunks[0] );

    app.list_area = None;
    app.shelf_areas.clear();
    match app.view_mode.clone() {
        ViewMode::Dashboard => draw_dashboard( frame, app, chunks[1] ),
        ViewMode::Albums => {
            let title = list_title( "Albums", &app.albums, Some( app.album_sort ), app.fetcher.is_loading( app.albums_key() ) );
            app.list_area = Some( chunks[1] );
            draw_pane( frame, &mut app.albums, chunks[1], title, album_line );
        }
        ViewMode::Artists => {
            let title = list_title( "Artists", &app.artists, None, app.fetcher.is_loading( QueryKey::Artists ) );
            app.list_area = Some( chunks[1] );
            draw_pane( frame, &mut app.artists, chunks[1], title, artist_line );
        }
        ViewMode::ArtistDetail { artist } => {
            let title = list_title( &artist, &app.artist_albums, None, false );
            app.list_area = Some( chunks[1] );
            draw_pane( frame, &mut app.artist_albums, chunks[1], title, album_line );
        }
        ViewMode::AlbumDetail { album_id } => draw_album_detail( frame, app, &album_id, chunks[1] ),
        ViewMode::Help => draw_help( frame, app, chunks[1] ),
        ViewMode::Settings => draw_settings( frame, app, chunks[1] ),
    }

    draw_status_bar( frame, app, chunks[2] );
}


fn list_title<T>( name: &str, pane: &ListPane<T>, sort: Option<AlbumSort>, loading: bool ) -> String
where
    T: Item + Searchable + Clone,
{
    let mut title = format!( " {} ({})", name, pane.listing.len() );
    if let Some( sort ) = sort {
        title.push_str( &format!( " [{}]", sort.label() ) );
    }
    if pane.listing.is_filtering() {
        title.push_str( &format!( " search: '{}'", pane.listing.query() ) );
    }
    let selected = pane.visible_selection_count();
    if selected > 0 {
        title.push_str( &format!( " | {} selected", selected ) );
    }
    if loading {
        title.push_str( " loading..." );
    }
    title.push( ' ' );
    title
}


fn draw_dashboard( frame: &mut Frame, app: &mut App, area: Rect ) {
    let columns = Layout::default()
        .direction( Direction::Horizontal )
        .constraints( vec![ Constraint::Ratio( 1, SHELVES.len() as u32 ); SHELVES.len() ] )
        .split( area );

    let loading = app.fetcher.is_loading( QueryKey::Artists );
    for ( i, ( shelf, pane ) ) in SHELVES.iter().zip( app.shelves.iter_mut() ).enumerate() {
        let mut title = list_title( shelf.title, pane, None, loading );
        if i == app.shelf_focus {
            title = format!( "*{}", title );
        }
        app.shelf_areas.push( columns[ i ] );
        draw_pane( frame, pane, columns[ i ], title, album_line );
    }
}


fn album_line( album: &Album ) -> String {
    match album.year {
        Some( year ) => format!( "{} - {} ({})", album.name, album.artist, year ),
        None => format!( "{} - {}", album.name, album.artist ),
    }
}


fn artist_line( artist: &Artist ) -> String {
    let unit = if artist.album_count == 1 { "album" } else { "albums" };
    format!( "{}  ({} {})", artist.name, artist.album_count, unit )
}


fn draw_pane<T>( frame: &mut Frame, pane: &mut ListPane<T>, area: Rect, title: String, line: fn( &T ) -> String )
where
    T: Item + Searchable + Clone,
{
    let items: Vec<ListItem> = pane.listing.displayed()
        .iter()
        .enumerate()
        .map( |( i, item )| {
            let selected = pane.is_selected( i );
            let marker = if selected { "+ " } else { "  " };
            let style = if selected {
                Style::default().fg( Color::Black ).bg( Color::Cyan )
            } else {
                Style::default()
            };
            ListItem::new( format!( "{}{}", marker, line( item ) ) ).style( style )
        })
        .collect();

    pane.state.select( ( !pane.listing.is_empty() ).then_some( pane.listing.cursor() ) );

    let widget = List::new( items )
        .block( Block::default().title( title ).borders( Borders::ALL ) )
        .highlight_style( Style::default().add_modifier( Modifier::BOLD | Modifier::REVERSED ) )
        .highlight_symbol( ">> " );

    frame.render_stateful_widget( widget, area, &mut pane.state );
}


fn draw_album_detail( frame: &mut Frame, app: &App, album_id: &str, area: Rect ) {
    let Some( album ) = app.find_album( album_id ) else {
        let missing = Paragraph::new( "  This album is no longer in the library." )
            .block( Block::default().title( " Album " ).borders( Borders::ALL ) );
        frame.render_widget( missing, area );
        return;
    };

    let mut lines = vec![
        Line::from( vec![
            Span::styled( "  Artist: ", Style::default().fg( Color::DarkGray ) ),
            Span::raw( album.artist.clone() ),
        ]),
        Line::from( vec![
            Span::styled( "  Year:   ", Style::default().fg( Color::DarkGray ) ),
            Span::raw( album.year.map( |y| y.to_string() ).unwrap_or_else( || "-".into() ) ),
        ]),
        Line::from( vec![
            Span::styled( "  Folder: ", Style::default().fg( Color::DarkGray ) ),
            Span::raw( album.path.display().to_string() ),
        ]),
        Line::from( "" ),
    ];

    for ( i, track ) in album.tracks.iter().enumerate() {
        let name = track.file_name()
            .map( |n| n.to_string_lossy().into_owned() )
            .unwrap_or_else( || "Unknown".into() );
        lines.push( Line::from( format!( "  {:>3}. {}", i + 1, name ) ) );
    }

    let title = format!( " {} ({} tracks) ", album.name, album.tracks.len() );
    let detail = Paragraph::new( lines )
        .block( Block::default().title( title ).borders( Borders::ALL ) )
        .wrap( Wrap { trim: false } );

    frame.render_widget( detail, area );
}


fn draw_help( frame: &mut Frame, app: &mut App, area: Rect ) {
    let help_text = command::help_text();
    let line_count = help_text.lines().count() as u16;
    let visible_height = area.height.saturating_sub( 2 ); // Account for borders

    // Clamp scroll to valid range
    let max_scroll = line_count.saturating_sub( visible_height );
    if app.help_scroll > max_scroll {
        app.help_scroll = max_scroll;
    }

    let help = Paragraph::new( help_text )
        .block( Block::default()
            .title( " Help (scroll, ? or Esc to close) " )
            .borders( Borders::ALL )
        )
        .wrap( Wrap { trim: false } )
        .scroll(( app.help_scroll, 0 ));

    frame.render_widget( help, area );
}


fn draw_settings( frame: &mut Frame, app: &App, area: Rect ) {
    let settings_items = [
        format!( "Click timer scope:     {}", app.settings.click_scope.name() ),
        format!( "Double-click window:   {} ms", app.settings.click_window().as_millis() ),
        format!( "Default album sort:    {}", app.settings.album_sort.label() ),
    ];

    let items: Vec<ListItem> = settings_items.iter().enumerate().map( |( idx, text )| {
        let style = if idx == app.settings_selected {
            Style::default().fg( Color::Yellow ).bold()
        } else {
            Style::default().fg( Color::White )
        };

        ListItem::new( format!( " {}", text ) ).style( style )
    }).collect();

    let list = List::new( items )
        .block(
            Block::default()
                .title( " Settings " )
                .borders( Borders::ALL )
                .border_style( Style::default().fg( Color::Cyan ) )
        );

    frame.render_widget( list, area );
}


fn draw_status_bar( frame: &mut Frame, app: &App, area: Rect ) {
    let ( text, style ) = match app.input_mode {
        InputMode::Command => {
            ( format!( "/{}", app.input_buffer.content() ), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Search => {
            ( format!( "Search: {}", app.input_buffer.content() ), Style::default().fg( Color::Yellow ) )
        }
        InputMode::Normal => {
            if let Some( ref msg ) = app.status_message {
                ( msg.clone(), Style::default().fg( Color::Green ) )
            } else {
                let hint = match app.view_mode {
                    ViewMode::Dashboard => " [/]Cmd [Tab]Views [Left/Right]Shelf [Space]Toggle [Enter]Open [R]Refresh [?]Help [q]Quit ",
                    ViewMode::Albums => " [/]Cmd [Tab]Views [f]Search [o]Sort [Space]Toggle [a]All [R]Refresh [?]Help [q]Quit ",
                    ViewMode::Artists => " [/]Cmd [Tab]Views [f]Search [Space]Toggle [a]All [Enter]Open [R]Refresh [?]Help ",
                    ViewMode::ArtistDetail { .. } => " [Enter]Open [Space]Toggle [Esc]Back [?]Help ",
                    ViewMode::AlbumDetail { .. } => " [Esc]Back [Tab]Views [?]Help [q]Quit ",
                    ViewMode::Help => " [?]Close [Esc]Close ",
                    ViewMode::Settings => " [Up/Down]Navigate [Enter/Space]Change [Left/Right]Adjust [Tab]Views ",
                };
                ( hint.to_string(), Style::default().fg( Color::DarkGray ) )
            }
        }
    };

    let status = Paragraph::new( text ).style( style );
    frame.render_widget( status, area );

    // Show cursor in command/search mode
    if app.input_mode != InputMode::Normal {
        let prefix = if app.input_mode == InputMode::Command { 1 } else { 8 };
        let cursor_x = area.x + prefix + app.input_buffer.cursor() as u16;
        frame.set_cursor_position(( cursor_x, area.y ));
    }
}
