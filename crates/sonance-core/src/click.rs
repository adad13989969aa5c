//! Single/double click disambiguation
//!
//! A pointer-down starts a short timer. If a second pointer-down arrives
//! before it runs out the pair is a double-click (navigation); otherwise the
//! timer fires and the first click becomes a single click (selection).
//! Time is always passed in by the caller so the event loop owns the clock.

use std::time::{ Duration, Instant };

use serde::{ Deserialize, Serialize };


/// Default disambiguation window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis( 100 );


/// Modifier keys held during a pointer-down.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub struct Modifiers {
    /// Shift - extend a contiguous range from the anchor.
    pub range: bool,

    /// Ctrl - toggle a single row in or out of the selection.
    pub multi: bool,
}


impl Modifiers {
    pub const NONE: Modifiers = Modifiers { range: false, multi: false };
    pub const RANGE: Modifiers = Modifiers { range: true, multi: false };
    pub const MULTI: Modifiers = Modifiers { range: false, multi: true };
}


/// How far a pending click timer reaches.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize )]
#[serde( rename_all = "lowercase" )]
pub enum ClickScope {
    /// One timer for the whole list. Two quick clicks on different rows
    /// resolve as a double-click on the second row.
    #[default]
    List,

    /// One timer per row. Clicks on other rows never cancel it.
    Row,
}


impl ClickScope {
    /// Returns the other scope.
    pub fn toggled( self ) -> Self {
        match self {
            ClickScope::List => ClickScope::Row,
            ClickScope::Row => ClickScope::List,
        }
    }


    /// Returns the display name of the scope.
    pub fn name( &self ) -> &'static str {
        match self {
            ClickScope::List => "Shared (whole list)",
            ClickScope::Row => "Per row",
        }
    }
}


/// A resolved click gesture.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum Gesture<Id> {
    Single { row: Id, modifiers: Modifiers },
    Double { row: Id },
}


/// The payload a pending single click carries until it fires.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct PendingClick<Id> {
    pub row: Id,
    pub modifiers: Modifiers,
}


/// A one-shot deadline holding a payload until it is cancelled or due.
#[derive( Debug )]
pub struct ClickTimer<P> {
    pending: Option<( Instant, P )>,
}


impl<P> ClickTimer<P> {
    /// Creates an idle timer.
    pub fn new() -> Self {
        Self { pending: None }
    }


    /// Arms the timer, replacing anything already pending.
    pub fn start( &mut self, deadline: Instant, payload: P ) {
        self.pending = Some(( deadline, payload ));
    }


    /// Disarms the timer and returns its payload.
    ///
    /// Cancelling an idle timer is a no-op returning None.
    pub fn cancel( &mut self ) -> Option<P> {
        self.pending.take().map( |( _, payload )| payload )
    }


    /// Returns true while the timer is armed.
    pub fn is_pending( &self ) -> bool {
        self.pending.is_some()
    }


    /// Returns true if the timer is armed and its deadline has passed.
    pub fn is_due( &self, now: Instant ) -> bool {
        self.pending.as_ref().is_some_and( |( deadline, _ )| now >= *deadline )
    }


    /// Disarms the timer if it is due, returning the payload.
    pub fn take_due( &mut self, now: Instant ) -> Option<P> {
        if self.is_due( now ) {
            self.cancel()
        } else {
            None
        }
    }


    /// Gets the deadline, if armed.
    pub fn deadline( &self ) -> Option<Instant> {
        self.pending.as_ref().map( |( deadline, _ )| *deadline )
    }
}


impl<P> Default for ClickTimer<P> {
    fn default() -> Self {
        Self::new()
    }
}


#[derive( Debug )]
enum Timers<Id> {
    Shared( ClickTimer<PendingClick<Id>> ),
    PerRow( Vec<( Id, ClickTimer<Modifiers> )> ),
}


impl<Id> Timers<Id> {
    fn for_scope( scope: ClickScope ) -> Self {
        match scope {
            ClickScope::List => Timers::Shared( ClickTimer::new() ),
            ClickScope::Row => Timers::PerRow( Vec::new() ),
        }
    }
}


/// Turns raw pointer-downs on list rows into single or double clicks.
#[derive( Debug )]
pub struct ClickDisambiguator<Id> {
    window: Duration,
    scope: ClickScope,
    timers: Timers<Id>,
}


impl<Id: Clone + PartialEq + std::fmt::Debug> ClickDisambiguator<Id> {
    /// Creates a disambiguator with the given window and timer scope.
    pub fn new( window: Duration, scope: ClickScope ) -> Self {
        Self {
            window,
            scope,
            timers: Timers::for_scope( scope ),
        }
    }


    /// Handles a pointer-down on a row.
    ///
    /// Any single clicks that were already due fire first, so a late poll
    /// never merges two separate gestures into one.
    ///
    /// @param row - Id of the row under the pointer
    /// @param modifiers - Modifier keys held at the time of the click
    /// @param now - Time of the event
    ///
    /// @returns Gestures resolved by this event, in order
    pub fn on_pointer_down( &mut self, row: Id, modifiers: Modifiers, now: Instant ) -> Vec<Gesture<Id>> {
        let mut resolved = self.poll( now );
        let deadline = now + self.window;

        match &mut self.timers {
            Timers::Shared( timer ) => {
                if timer.cancel().is_some() {
                    tracing::debug!( "Double click on {:?}", row );
                    resolved.push( Gesture::Double { row } );
                } else {
                    timer.start( deadline, PendingClick { row, modifiers } );
                }
            }
            Timers::PerRow( timers ) => {
                if let Some( pos ) = timers.iter().position( |( id, _ )| *id == row ) {
                    timers.remove( pos );
                    tracing::debug!( "Double click on {:?}", row );
                    resolved.push( Gesture::Double { row } );
                } else {
                    let mut timer = ClickTimer::new();
                    timer.start( deadline, modifiers );
                    timers.push(( row, timer ));
                }
            }
        }

        resolved
    }


    /// Fires every pending single click whose window has elapsed.
    pub fn poll( &mut self, now: Instant ) -> Vec<Gesture<Id>> {
        let mut fired = Vec::new();

        match &mut self.timers {
            Timers::Shared( timer ) => {
                if let Some( PendingClick { row, modifiers } ) = timer.take_due( now ) {
                    fired.push( Gesture::Single { row, modifiers } );
                }
            }
            Timers::PerRow( timers ) => {
                timers.retain_mut( |( row, timer )| match timer.take_due( now ) {
                    Some( modifiers ) => {
                        fired.push( Gesture::Single { row: row.clone(), modifiers } );
                        false
                    }
                    None => true,
                });
            }
        }

        for gesture in &fired {
            tracing::trace!( "Single click resolved: {:?}", gesture );
        }
        fired
    }


    /// Drops every pending click without firing anything.
    ///
    /// @returns true if something was pending
    pub fn cancel( &mut self ) -> bool {
        match &mut self.timers {
            Timers::Shared( timer ) => timer.cancel().is_some(),
            Timers::PerRow( timers ) => {
                let had_any = !timers.is_empty();
                timers.clear();
                had_any
            }
        }
    }


    /// Returns true if any click is waiting for its window to elapse.
    pub fn is_pending( &self ) -> bool {
        match &self.timers {
            Timers::Shared( timer ) => timer.is_pending(),
            Timers::PerRow( timers ) => !timers.is_empty(),
        }
    }


    /// Earliest instant at which `poll` can fire something.
    pub fn next_deadline( &self ) -> Option<Instant> {
        match &self.timers {
            Timers::Shared( timer ) => timer.deadline(),
            Timers::PerRow( timers ) => timers.iter().filter_map( |( _, t )| t.deadline() ).min(),
        }
    }


    /// Gets the disambiguation window.
    pub fn window( &self ) -> Duration {
        self.window
    }


    /// Sets the disambiguation window. Applies to clicks started afterwards.
    pub fn set_window( &mut self, window: Duration ) {
        self.window = window;
    }


    /// Gets the timer scope.
    pub fn scope( &self ) -> ClickScope {
        self.scope
    }


    /// Switches timer scope, dropping anything pending.
    pub fn set_scope( &mut self, scope: ClickScope ) {
        if scope != self.scope {
            self.scope = scope;
            self.timers = Timers::for_scope( scope );
        }
    }
}


impl<Id: Clone + PartialEq + std::fmt::Debug> Default for ClickDisambiguator<Id> {
    fn default() -> Self {
        Self::new( DEFAULT_WINDOW, ClickScope::default() )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    fn ms( n: u64 ) -> Duration {
        Duration::from_millis( n )
    }


    fn singles( gestures: &[Gesture<&str>] ) -> usize {
        gestures.iter().filter( |g| matches!( g, Gesture::Single { .. } ) ).count()
    }


    fn doubles( gestures: &[Gesture<&str>] ) -> usize {
        gestures.iter().filter( |g| matches!( g, Gesture::Double { .. } ) ).count()
    }


    #[test]
    fn test_timer_cancel_twice() {
        let mut timer = ClickTimer::new();
        let t0 = Instant::now();
        timer.start( t0 + ms( 100 ), 7 );
        assert!( timer.is_pending() );
        assert_eq!( timer.cancel(), Some( 7 ) );
        assert_eq!( timer.cancel(), None );
        assert!( !timer.is_pending() );
    }


    #[test]
    fn test_timer_take_due() {
        let mut timer = ClickTimer::new();
        let t0 = Instant::now();
        timer.start( t0 + ms( 100 ), "x" );
        assert_eq!( timer.take_due( t0 + ms( 99 ) ), None );
        assert_eq!( timer.take_due( t0 + ms( 100 ) ), Some( "x" ) );
        assert!( !timer.is_pending() );
    }


    #[test]
    fn test_single_click_after_silence() {
        let mut clicks = ClickDisambiguator::default();
        let t0 = Instant::now();
        let mut all = clicks.on_pointer_down( "a", Modifiers::MULTI, t0 );
        assert!( all.is_empty() );

        all.extend( clicks.poll( t0 + ms( 50 ) ) );
        assert!( all.is_empty() );

        all.extend( clicks.poll( t0 + ms( 100 ) ) );
        all.extend( clicks.poll( t0 + ms( 500 ) ) );
        assert_eq!( all, vec![ Gesture::Single { row: "a", modifiers: Modifiers::MULTI } ] );
        assert!( !clicks.is_pending() );
    }


    #[test]
    fn test_double_click_within_window() {
        let mut clicks = ClickDisambiguator::default();
        let t0 = Instant::now();
        let mut all = clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        all.extend( clicks.on_pointer_down( "a", Modifiers::NONE, t0 + ms( 60 ) ) );
        all.extend( clicks.poll( t0 + ms( 1000 ) ) );

        assert_eq!( doubles( &all ), 1 );
        assert_eq!( singles( &all ), 0 );
        assert!( !clicks.is_pending() );
    }


    #[test]
    fn test_clicks_spaced_past_window_are_two_singles() {
        let mut clicks = ClickDisambiguator::default();
        let t0 = Instant::now();
        let mut all = clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        // No poll in between: the due click must still fire first.
        all.extend( clicks.on_pointer_down( "b", Modifiers::NONE, t0 + ms( 150 ) ) );
        all.extend( clicks.poll( t0 + ms( 300 ) ) );

        assert_eq!( all, vec![
            Gesture::Single { row: "a", modifiers: Modifiers::NONE },
            Gesture::Single { row: "b", modifiers: Modifiers::NONE },
        ]);
    }


    #[test]
    fn test_shared_scope_quirk_uses_second_row() {
        let mut clicks = ClickDisambiguator::new( DEFAULT_WINDOW, ClickScope::List );
        let t0 = Instant::now();
        let mut all = clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        all.extend( clicks.on_pointer_down( "b", Modifiers::NONE, t0 + ms( 40 ) ) );
        all.extend( clicks.poll( t0 + ms( 1000 ) ) );

        assert_eq!( all, vec![ Gesture::Double { row: "b" } ] );
    }


    #[test]
    fn test_row_scope_keeps_rows_independent() {
        let mut clicks = ClickDisambiguator::new( DEFAULT_WINDOW, ClickScope::Row );
        let t0 = Instant::now();
        let mut all = clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        all.extend( clicks.on_pointer_down( "b", Modifiers::NONE, t0 + ms( 40 ) ) );
        all.extend( clicks.on_pointer_down( "b", Modifiers::NONE, t0 + ms( 70 ) ) );
        all.extend( clicks.poll( t0 + ms( 1000 ) ) );

        assert_eq!( all, vec![
            Gesture::Double { row: "b" },
            Gesture::Single { row: "a", modifiers: Modifiers::NONE },
        ]);
    }


    #[test]
    fn test_cancel_drops_pending() {
        let mut clicks = ClickDisambiguator::default();
        let t0 = Instant::now();
        clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        assert!( clicks.cancel() );
        assert!( !clicks.cancel() );
        assert!( clicks.poll( t0 + ms( 1000 ) ).is_empty() );
    }


    #[test]
    fn test_next_deadline() {
        let mut clicks = ClickDisambiguator::new( ms( 200 ), ClickScope::Row );
        let t0 = Instant::now();
        assert_eq!( clicks.next_deadline(), None );
        clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        clicks.on_pointer_down( "b", Modifiers::NONE, t0 + ms( 10 ) );
        assert_eq!( clicks.next_deadline(), Some( t0 + ms( 200 ) ) );
    }


    #[test]
    fn test_set_scope_drops_pending() {
        let mut clicks = ClickDisambiguator::default();
        let t0 = Instant::now();
        clicks.on_pointer_down( "a", Modifiers::NONE, t0 );
        clicks.set_scope( ClickScope::Row );
        assert!( !clicks.is_pending() );
        assert_eq!( clicks.scope(), ClickScope::Row );
    }
}
