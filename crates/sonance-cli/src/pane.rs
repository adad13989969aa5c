//! A selectable list view.
//!
//! Couples a listing (rows, search) with the click/selection engine and the
//! ratatui scroll state, and maps mouse and keyboard input onto them.

use std::time::{ Duration, Instant };

use crossterm::event::{ KeyCode, KeyModifiers };
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

use sonance_core::search::Searchable;
use sonance_core::{ ClickScope, Item, LibraryError, ListEvent, ListInteraction, Listing, Modifiers };


/// What a key press did to a pane.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum KeyOutcome<Id> {
    /// The pane does not handle this key.
    Ignored,

    /// The pane handled the key.
    Handled,

    /// The user asked to open a row. Selection has already been cleared.
    Open( Id ),
}


/// One list view with its selection engine.
#[derive( Debug )]
pub struct ListPane<T: Item> {
    pub listing: Listing<T>,
    pub interaction: ListInteraction<T::Id>,
    pub state: ListState,
}


impl<T: Item + Searchable + Clone> ListPane<T> {
    /// Creates an empty pane.
    pub fn new( fields: &'static [&'static str], window: Duration, scope: ClickScope ) -> Self {
        Self {
            listing: Listing::new( fields ),
            interaction: ListInteraction::new( window, scope ),
            state: ListState::default(),
        }
    }


    /// Replaces the rows after a fetch. Selection is left as is; ids that
    /// disappeared simply stop being highlighted.
    pub fn set_items( &mut self, items: Vec<T> ) {
        self.listing.set_items( items );
    }


    /// Applies a finished fetch of this pane's rows.
    ///
    /// A failed fetch leaves rows, search and selection exactly as they were
    /// and hands the error back for the status bar.
    pub fn apply_fetch( &mut self, outcome: Result<Vec<T>, LibraryError> ) -> Result<(), LibraryError> {
        let items = outcome?;
        self.set_items( items );
        Ok(())
    }


    /// Shows the rows in a new order. A new order starts with an empty
    /// search and the cursor on the first row; the selection is kept.
    pub fn reorder( &mut self, items: Vec<T> ) {
        self.listing.clear_query();
        self.set_items( items );
        self.listing.cursor_first();
        self.state = ListState::default();
    }


    /// Applies new click settings, dropping any pending click.
    pub fn set_click_settings( &mut self, window: Duration, scope: ClickScope ) {
        let clicks = self.interaction.clicks_mut();
        clicks.cancel();
        clicks.set_window( window );
        clicks.set_scope( scope );
    }


    /// Maps a terminal cell to a displayed row index.
    ///
    /// `area` is the bordered list area from the last draw.
    pub fn row_at( &self, area: Rect, column: u16, row: u16 ) -> Option<usize> {
        let inside = column > area.x && column < area.x + area.width.saturating_sub( 1 )
            && row > area.y && row < area.y + area.height.saturating_sub( 1 );
        if !inside {
            return None;
        }

        let index = self.state.offset() + ( row - area.y - 1 ) as usize;
        ( index < self.listing.len() ).then_some( index )
    }


    /// Handles a pointer-down on a displayed row.
    pub fn pointer_down( &mut self, index: usize, modifiers: Modifiers, now: Instant ) -> Vec<ListEvent<T::Id>> {
        let Some( id ) = self.listing.displayed().get( index ).map( T::id ) else {
            return Vec::new();
        };
        self.listing.set_cursor( index );
        self.interaction.on_row_pointer_down( id, modifiers, now, self.listing.displayed() )
    }


    /// Fires any single click whose window has elapsed.
    pub fn tick( &mut self, now: Instant ) -> Vec<ListEvent<T::Id>> {
        self.interaction.tick( now, self.listing.displayed() )
    }


    /// Handles list keys: cursor movement and keyboard selection.
    pub fn handle_key( &mut self, code: KeyCode, modifiers: KeyModifiers ) -> KeyOutcome<T::Id> {
        let shift = modifiers.contains( KeyModifiers::SHIFT );

        match code {
            KeyCode::Up | KeyCode::Char( 'k' ) => {
                self.listing.cursor_previous();
                if shift {
                    self.extend_to_cursor();
                }
            }
            KeyCode::Down | KeyCode::Char( 'j' ) => {
                self.listing.cursor_next();
                if shift {
                    self.extend_to_cursor();
                }
            }
            KeyCode::Char( 'K' ) => {
                self.listing.cursor_previous();
                self.extend_to_cursor();
            }
            KeyCode::Char( 'J' ) => {
                self.listing.cursor_next();
                self.extend_to_cursor();
            }
            KeyCode::Home | KeyCode::Char( 'g' ) => self.listing.cursor_first(),
            KeyCode::End | KeyCode::Char( 'G' ) => self.listing.cursor_last(),
            KeyCode::Char( ' ' ) => {
                if let Some( id ) = self.listing.cursor_item().map( T::id ) {
                    self.interaction.selection_mut().toggle( &id, self.listing.displayed() );
                }
            }
            KeyCode::Char( 'a' ) => {
                self.interaction.selection_mut().select_all( self.listing.displayed() );
            }
            KeyCode::Esc if !self.interaction.selection().is_empty() => {
                self.interaction.clear_selection();
            }
            KeyCode::Enter => {
                return match self.listing.cursor_item().map( T::id ) {
                    Some( id ) => {
                        self.interaction.clear_selection();
                        KeyOutcome::Open( id )
                    }
                    None => KeyOutcome::Handled,
                };
            }
            _ => return KeyOutcome::Ignored,
        }

        KeyOutcome::Handled
    }


    fn extend_to_cursor( &mut self ) {
        if let Some( id ) = self.listing.cursor_item().map( T::id ) {
            self.interaction.selection_mut().extend_range( &id, self.listing.displayed() );
        }
    }


    /// Returns true if the displayed row at `index` is selected.
    pub fn is_selected( &self, index: usize ) -> bool {
        self.listing.displayed()
            .get( index )
            .is_some_and( |item| self.interaction.selection().contains( &item.id() ) )
    }


    /// Gets how many selected rows are currently displayed.
    pub fn visible_selection_count( &self ) -> usize {
        self.interaction.selection().visible_in( self.listing.displayed() ).len()
    }


    /// Earliest pending click deadline, for sizing the event poll timeout.
    pub fn next_deadline( &self ) -> Option<Instant> {
        self.interaction.clicks().next_deadline()
    }
}


#[cfg( test )]
mod tests {
    use std::borrow::Cow;
    use std::path::PathBuf;

    use super::*;


    #[derive( Debug, Clone, PartialEq )]
    struct Row( &'static str );


    impl Item for Row {
        type Id = &'static str;


        fn id( &self ) -> Self::Id {
            self.0
        }
    }


    impl Searchable for Row {
        fn field( &self, _name: &str ) -> Option<Cow<'_, str>> {
            Some( Cow::Borrowed( self.0 ) )
        }
    }


    fn pane( ids: &[&'static str] ) -> ListPane<Row> {
        let mut pane = ListPane::new( &[ "name" ], Duration::from_millis( 100 ), ClickScope::List );
        pane.set_items( ids.iter().map( |id| Row( *id ) ).collect() );
        pane
    }


    #[test]
    fn test_row_at_inside_borders() {
        let pane = pane( &[ "a", "b", "c" ] );
        let area = Rect::new( 0, 2, 40, 10 );

        assert_eq!( pane.row_at( area, 5, 3 ), Some( 0 ) );
        assert_eq!( pane.row_at( area, 5, 5 ), Some( 2 ) );
        assert_eq!( pane.row_at( area, 5, 6 ), None );
        assert_eq!( pane.row_at( area, 0, 3 ), None );
        assert_eq!( pane.row_at( area, 5, 2 ), None );
    }


    #[test]
    fn test_pointer_down_resolves_through_engine() {
        let mut pane = pane( &[ "a", "b", "c" ] );
        let t0 = Instant::now();

        assert!( pane.pointer_down( 1, Modifiers::NONE, t0 ).is_empty() );
        assert_eq!( pane.tick( t0 + Duration::from_millis( 120 ) ), vec![ ListEvent::SelectionChanged ] );
        assert!( pane.is_selected( 1 ) );
        assert_eq!( pane.listing.cursor(), 1 );

        let t1 = t0 + Duration::from_secs( 1 );
        pane.pointer_down( 2, Modifiers::NONE, t1 );
        let events = pane.pointer_down( 2, Modifiers::NONE, t1 + Duration::from_millis( 20 ) );
        assert_eq!( events, vec![ ListEvent::Navigate( "c" ) ] );
        assert_eq!( pane.visible_selection_count(), 0 );
    }


    #[test]
    fn test_shift_arrows_extend_from_anchor() {
        let mut pane = pane( &[ "a", "b", "c", "d" ] );
        pane.handle_key( KeyCode::Down, KeyModifiers::NONE );
        pane.handle_key( KeyCode::Char( ' ' ), KeyModifiers::NONE );
        assert!( pane.is_selected( 1 ) );

        pane.handle_key( KeyCode::Down, KeyModifiers::SHIFT );
        pane.handle_key( KeyCode::Down, KeyModifiers::SHIFT );
        assert_eq!( pane.visible_selection_count(), 3 );

        pane.handle_key( KeyCode::Up, KeyModifiers::SHIFT );
        assert_eq!( pane.interaction.selection().visible_in( pane.listing.displayed() ), vec![ "b", "c" ] );
    }


    #[test]
    fn test_enter_opens_and_clears() {
        let mut pane = pane( &[ "a", "b" ] );
        pane.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
        assert_eq!( pane.visible_selection_count(), 2 );

        assert_eq!( pane.handle_key( KeyCode::Enter, KeyModifiers::NONE ), KeyOutcome::Open( "a" ) );
        assert_eq!( pane.visible_selection_count(), 0 );
    }


    #[test]
    fn test_failed_fetch_keeps_rows_and_selection() {
        let mut pane = pane( &[ "a", "b", "c" ] );
        pane.listing.set_query( "b" );
        pane.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );
        let before = pane.interaction.selection_snapshot();

        let outcome = pane.apply_fetch( Err( LibraryError::NotFound( PathBuf::from( "/gone" ) ) ) );
        assert!( matches!( outcome, Err( LibraryError::NotFound( _ ) ) ) );
        assert_eq!( pane.interaction.selection_snapshot(), before );
        assert_eq!( pane.listing.items().len(), 3 );
        assert_eq!( pane.listing.query(), "b" );
    }


    #[test]
    fn test_fetch_keeps_selection_of_surviving_rows() {
        let mut pane = pane( &[ "a", "b" ] );
        pane.handle_key( KeyCode::Char( 'a' ), KeyModifiers::NONE );

        pane.apply_fetch( Ok( vec![ Row( "b" ), Row( "c" ) ] ) ).unwrap();
        assert!( pane.is_selected( 0 ) );
        assert!( !pane.is_selected( 1 ) );
    }


    #[test]
    fn test_reorder_clears_search() {
        let mut pane = pane( &[ "a", "b", "c" ] );
        pane.listing.set_query( "c" );
        pane.listing.cursor_last();
        pane.handle_key( KeyCode::Char( ' ' ), KeyModifiers::NONE );

        pane.reorder( vec![ Row( "c" ), Row( "b" ), Row( "a" ) ] );
        assert_eq!( pane.listing.query(), "" );
        assert_eq!( pane.listing.displayed(), &[ Row( "c" ), Row( "b" ), Row( "a" ) ] );
        assert_eq!( pane.listing.cursor(), 0 );
        assert!( pane.is_selected( 0 ) );
    }


    #[test]
    fn test_click_settings_reach_engine() {
        let mut pane = pane( &[ "a" ] );
        pane.pointer_down( 0, Modifiers::NONE, Instant::now() );

        pane.set_click_settings( Duration::from_millis( 250 ), ClickScope::Row );
        let clicks = pane.interaction.clicks();
        assert_eq!( clicks.window(), Duration::from_millis( 250 ) );
        assert_eq!( clicks.scope(), ClickScope::Row );
        assert!( !clicks.is_pending() );
    }


    #[test]
    fn test_esc_only_handled_with_selection() {
        let mut pane = pane( &[ "a" ] );
        assert_eq!( pane.handle_key( KeyCode::Esc, KeyModifiers::NONE ), KeyOutcome::Ignored );
        pane.handle_key( KeyCode::Char( ' ' ), KeyModifiers::NONE );
        assert_eq!( pane.handle_key( KeyCode::Esc, KeyModifiers::NONE ), KeyOutcome::Handled );
        assert_eq!( pane.visible_selection_count(), 0 );
    }
}
