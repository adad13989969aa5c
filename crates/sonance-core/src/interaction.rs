//! Pointer interaction for list views
//!
//! Ties the click disambiguator to the selection state. Single clicks become
//! selection changes, double clicks clear the selection and ask the caller
//! to navigate to the row's detail view.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{ Duration, Instant };

use crate::click::{ ClickDisambiguator, ClickScope, Gesture, Modifiers };
use crate::range::Item;
use crate::selection::Selection;


/// Outcome of a resolved gesture, for the caller to act on.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum ListEvent<Id> {
    /// A single click changed (or tried to change) the selection.
    SelectionChanged,

    /// A double click asked to open the row. The selection is already clear.
    Navigate( Id ),
}


/// Click handling and selection shared by every list view.
#[derive( Debug )]
pub struct ListInteraction<Id> {
    clicks: ClickDisambiguator<Id>,
    selection: Selection<Id>,
}


impl<Id: Clone + Eq + Hash + std::fmt::Debug> ListInteraction<Id> {
    /// Creates an interaction with the given click window and timer scope.
    pub fn new( window: Duration, scope: ClickScope ) -> Self {
        Self {
            clicks: ClickDisambiguator::new( window, scope ),
            selection: Selection::new(),
        }
    }


    /// Handles a pointer-down on a displayed row.
    ///
    /// @param row - Id of the clicked row, captured at click time
    /// @param modifiers - Modifier keys held
    /// @param now - Time of the event
    /// @param seq - The currently displayed sequence
    ///
    /// @returns Events resolved immediately (due single clicks, a double click)
    pub fn on_row_pointer_down<T: Item<Id = Id>>(
        &mut self,
        row: Id,
        modifiers: Modifiers,
        now: Instant,
        seq: &[T],
    ) -> Vec<ListEvent<Id>> {
        let gestures = self.clicks.on_pointer_down( row, modifiers, now );
        self.apply_all( gestures, seq )
    }


    /// Fires single clicks whose window has elapsed.
    ///
    /// `seq` is whatever is displayed when the timer fires, which may differ
    /// from what was displayed at click time.
    pub fn tick<T: Item<Id = Id>>( &mut self, now: Instant, seq: &[T] ) -> Vec<ListEvent<Id>> {
        let gestures = self.clicks.poll( now );
        self.apply_all( gestures, seq )
    }


    fn apply_all<T: Item<Id = Id>>( &mut self, gestures: Vec<Gesture<Id>>, seq: &[T] ) -> Vec<ListEvent<Id>> {
        gestures.into_iter()
            .map( |gesture| self.apply( gesture, seq ) )
            .collect()
    }


    fn apply<T: Item<Id = Id>>( &mut self, gesture: Gesture<Id>, seq: &[T] ) -> ListEvent<Id> {
        match gesture {
            Gesture::Single { row, modifiers } => {
                if modifiers.multi {
                    self.selection.toggle( &row, seq );
                } else if modifiers.range {
                    self.selection.extend_range( &row, seq );
                } else {
                    self.selection.select_only( &row, seq );
                }
                ListEvent::SelectionChanged
            }
            Gesture::Double { row } => {
                self.clicks.cancel();
                self.selection.clear();
                tracing::debug!( "Navigating to {:?}", row );
                ListEvent::Navigate( row )
            }
        }
    }


    /// Returns a copy of the selected ids for highlighting.
    pub fn selection_snapshot( &self ) -> HashSet<Id> {
        self.selection.snapshot()
    }


    /// Clears the selection and drops any pending click.
    pub fn clear_selection( &mut self ) {
        self.clicks.cancel();
        self.selection.clear();
    }


    /// Gets the selection state.
    pub fn selection( &self ) -> &Selection<Id> {
        &self.selection
    }


    /// Gets the selection state for keyboard-driven changes.
    pub fn selection_mut( &mut self ) -> &mut Selection<Id> {
        &mut self.selection
    }


    /// Gets the click disambiguator.
    pub fn clicks( &self ) -> &ClickDisambiguator<Id> {
        &self.clicks
    }


    /// Gets the click disambiguator for settings changes.
    pub fn clicks_mut( &mut self ) -> &mut ClickDisambiguator<Id> {
        &mut self.clicks
    }
}


impl<Id: Clone + Eq + Hash + std::fmt::Debug> Default for ListInteraction<Id> {
    fn default() -> Self {
        Self::new( crate::click::DEFAULT_WINDOW, ClickScope::default() )
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::range::tests::{ rows, Row };


    fn ms( n: u64 ) -> Duration {
        Duration::from_millis( n )
    }


    fn set( ids: &[&'static str] ) -> HashSet<&'static str> {
        ids.iter().copied().collect()
    }


    /// Clicks once and lets the window elapse.
    fn click(
        list: &mut ListInteraction<&'static str>,
        row: &'static str,
        modifiers: Modifiers,
        at: Instant,
        seq: &[Row],
    ) -> Vec<ListEvent<&'static str>> {
        let mut events = list.on_row_pointer_down( row, modifiers, at, seq );
        events.extend( list.tick( at + ms( 150 ), seq ) );
        events
    }


    #[test]
    fn test_plain_click_selects_row() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();

        let events = click( &mut list, "b", Modifiers::NONE, t0, &seq );
        assert_eq!( events, vec![ ListEvent::SelectionChanged ] );
        assert_eq!( list.selection_snapshot(), set( &[ "b" ] ) );
        assert_eq!( list.selection().anchor(), Some( &"b" ) );
    }


    #[test]
    fn test_click_scenario() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();

        click( &mut list, "a", Modifiers::NONE, t0, &seq );
        assert_eq!( list.selection_snapshot(), set( &[ "a" ] ) );

        click( &mut list, "c", Modifiers::RANGE, t0 + ms( 500 ), &seq );
        assert_eq!( list.selection_snapshot(), set( &[ "a", "b", "c" ] ) );
        assert_eq!( list.selection().anchor(), Some( &"a" ) );

        click( &mut list, "b", Modifiers::RANGE, t0 + ms( 1000 ), &seq );
        assert_eq!( list.selection_snapshot(), set( &[ "a", "b" ] ) );
        assert_eq!( list.selection().anchor(), Some( &"a" ) );
    }


    #[test]
    fn test_ctrl_click_toggles() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();

        click( &mut list, "a", Modifiers::MULTI, t0, &seq );
        click( &mut list, "c", Modifiers::MULTI, t0 + ms( 500 ), &seq );
        assert_eq!( list.selection_snapshot(), set( &[ "a", "c" ] ) );

        click( &mut list, "a", Modifiers::MULTI, t0 + ms( 1000 ), &seq );
        assert_eq!( list.selection_snapshot(), set( &[ "c" ] ) );
    }


    #[test]
    fn test_double_click_navigates_and_clears() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();
        click( &mut list, "a", Modifiers::NONE, t0, &seq );
        click( &mut list, "c", Modifiers::RANGE, t0 + ms( 500 ), &seq );
        assert_eq!( list.selection().len(), 3 );

        let t1 = t0 + ms( 2000 );
        let mut events = list.on_row_pointer_down( "b", Modifiers::NONE, t1, &seq );
        events.extend( list.on_row_pointer_down( "b", Modifiers::NONE, t1 + ms( 30 ), &seq ) );
        events.extend( list.tick( t1 + ms( 1000 ), &seq ) );

        assert_eq!( events, vec![ ListEvent::Navigate( "b" ) ] );
        assert!( list.selection().is_empty() );
        assert_eq!( list.selection().anchor(), None );
        assert!( !list.clicks().is_pending() );
    }


    #[test]
    fn test_refetch_while_pending_drops_missing_row() {
        let before = rows( &[ "a", "b", "c" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();
        click( &mut list, "a", Modifiers::NONE, t0, &before );

        let t1 = t0 + ms( 500 );
        list.on_row_pointer_down( "b", Modifiers::MULTI, t1, &before );

        // The dataset is replaced before the timer fires and "b" is gone.
        let after = rows( &[ "c", "a" ] );
        let events = list.tick( t1 + ms( 200 ), &after );
        assert_eq!( events, vec![ ListEvent::SelectionChanged ] );
        assert_eq!( list.selection_snapshot(), set( &[ "a" ] ) );
    }


    #[test]
    fn test_range_after_filter_uses_new_ranks() {
        let full = rows( &[ "a", "b", "c", "d", "e" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();
        click( &mut list, "b", Modifiers::NONE, t0, &full );

        let filtered = rows( &[ "b", "d", "e" ] );
        click( &mut list, "e", Modifiers::RANGE, t0 + ms( 500 ), &filtered );
        assert_eq!( list.selection_snapshot(), set( &[ "b", "d", "e" ] ) );
    }


    #[test]
    fn test_clear_selection_cancels_pending_click() {
        let seq = rows( &[ "a", "b" ] );
        let mut list = ListInteraction::default();
        let t0 = Instant::now();
        list.on_row_pointer_down( "a", Modifiers::NONE, t0, &seq );
        list.clear_selection();

        assert!( list.tick( t0 + ms( 500 ), &seq ).is_empty() );
        assert!( list.selection().is_empty() );
    }
}
