//! Multi-row selection state
//!
//! Holds the set of selected ids and the anchor used for shift-click ranges.
//! Every operation takes the currently displayed sequence as a parameter;
//! nothing here caches ranks or remembers which sequence it last saw.

use std::collections::HashSet;
use std::hash::Hash;

use crate::range::{ rank_of, resolve_range, Item };


/// Selected ids plus the range anchor.
#[derive( Debug, Clone )]
pub struct Selection<Id> {
    selected: HashSet<Id>,
    anchor: Option<Id>,
}


impl<Id> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
            anchor: None,
        }
    }
}


impl<Id: Clone + Eq + Hash + std::fmt::Debug> Selection<Id> {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }


    /// Flips `id` in or out of the selection and makes it the anchor.
    ///
    /// Ids that are not displayed are ignored, so toggling twice always
    /// restores the previous state.
    pub fn toggle<T: Item<Id = Id>>( &mut self, id: &Id, seq: &[T] ) {
        if rank_of( id, seq ).is_none() {
            tracing::debug!( "Ignoring toggle of undisplayed row {:?}", id );
            return;
        }

        if !self.selected.remove( id ) {
            self.selected.insert( id.clone() );
        }
        self.anchor = Some( id.clone() );
    }


    /// Replaces the selection with `id` alone and makes it the anchor.
    pub fn select_only<T: Item<Id = Id>>( &mut self, id: &Id, seq: &[T] ) {
        if rank_of( id, seq ).is_none() {
            tracing::debug!( "Ignoring click on undisplayed row {:?}", id );
            return;
        }

        self.selected.clear();
        self.selected.insert( id.clone() );
        self.anchor = Some( id.clone() );
    }


    /// Replaces the selection with the rows between `anchor` and `target`.
    ///
    /// The stored anchor is left alone so repeated shift-clicks pivot on
    /// the same row. If either end is not displayed nothing changes.
    pub fn set_range<T: Item<Id = Id>>( &mut self, anchor: &Id, target: &Id, seq: &[T] ) {
        match resolve_range( anchor, target, seq ) {
            Some( ids ) => {
                self.selected = ids.into_iter().collect();
            }
            None => {
                tracing::debug!( "Range {:?}..{:?} not resolvable, keeping selection", anchor, target );
            }
        }
    }


    /// Extends a range from the current anchor to `target`.
    ///
    /// Without an anchor this behaves like a plain click on `target`.
    pub fn extend_range<T: Item<Id = Id>>( &mut self, target: &Id, seq: &[T] ) {
        match self.anchor.clone() {
            Some( anchor ) => self.set_range( &anchor, target, seq ),
            None => self.select_only( target, seq ),
        }
    }


    /// Selects every displayed row, keeping the anchor.
    pub fn select_all<T: Item<Id = Id>>( &mut self, seq: &[T] ) {
        self.selected = seq.iter().map( T::id ).collect();
    }


    /// Empties the selection and forgets the anchor.
    pub fn clear( &mut self ) {
        self.selected.clear();
        self.anchor = None;
    }


    /// Returns true if `id` is selected.
    pub fn contains( &self, id: &Id ) -> bool {
        self.selected.contains( id )
    }


    /// Gets the current anchor.
    pub fn anchor( &self ) -> Option<&Id> {
        self.anchor.as_ref()
    }


    /// Returns a copy of the selected ids.
    pub fn snapshot( &self ) -> HashSet<Id> {
        self.selected.clone()
    }


    /// Returns the selected ids that are still displayed, in display order.
    ///
    /// Ids left over from an earlier dataset or a different filter are
    /// skipped rather than reported.
    pub fn visible_in<T: Item<Id = Id>>( &self, seq: &[T] ) -> Vec<Id> {
        seq.iter()
            .map( T::id )
            .filter( |id| self.selected.contains( id ) )
            .collect()
    }


    /// Gets the number of selected ids, stale ones included.
    pub fn len( &self ) -> usize {
        self.selected.len()
    }


    /// Returns true if nothing is selected.
    pub fn is_empty( &self ) -> bool {
        self.selected.is_empty()
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::range::tests::rows;


    fn set( ids: &[&'static str] ) -> HashSet<&'static str> {
        ids.iter().copied().collect()
    }


    #[test]
    fn test_toggle_adds_and_removes() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut sel = Selection::new();

        sel.toggle( &"b", &seq );
        assert_eq!( sel.snapshot(), set( &[ "b" ] ) );
        assert_eq!( sel.anchor(), Some( &"b" ) );

        sel.toggle( &"c", &seq );
        assert_eq!( sel.snapshot(), set( &[ "b", "c" ] ) );
        assert_eq!( sel.anchor(), Some( &"c" ) );

        sel.toggle( &"b", &seq );
        assert_eq!( sel.snapshot(), set( &[ "c" ] ) );
    }


    #[test]
    fn test_toggle_twice_restores_state() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut sel = Selection::new();
        sel.toggle( &"a", &seq );

        for id in [ "a", "b", "c", "missing" ] {
            let before = sel.snapshot();
            sel.toggle( &id, &seq );
            sel.toggle( &id, &seq );
            assert_eq!( sel.snapshot(), before, "toggling {} twice", id );
        }
    }


    #[test]
    fn test_toggle_undisplayed_is_noop() {
        let seq = rows( &[ "a" ] );
        let mut sel = Selection::new();
        sel.toggle( &"zzz", &seq );
        assert!( sel.is_empty() );
        assert_eq!( sel.anchor(), None );
    }


    #[test]
    fn test_set_range_both_directions() {
        let seq = rows( &[ "a", "b", "c", "d", "e" ] );
        let mut forward = Selection::new();
        let mut backward = Selection::new();

        forward.set_range( &"b", &"d", &seq );
        backward.set_range( &"d", &"b", &seq );

        assert_eq!( forward.snapshot(), set( &[ "b", "c", "d" ] ) );
        assert_eq!( backward.snapshot(), forward.snapshot() );
    }


    #[test]
    fn test_set_range_symmetry_all_pairs() {
        let ids = [ "a", "b", "c", "d", "e" ];
        let seq = rows( &ids );

        for x in ids {
            for y in ids {
                let mut one = Selection::new();
                let mut two = Selection::new();
                one.set_range( &x, &y, &seq );
                two.set_range( &y, &x, &seq );
                assert_eq!( one.snapshot(), two.snapshot() );
            }
        }
    }


    #[test]
    fn test_set_range_replaces_selection() {
        let seq = rows( &[ "a", "b", "c", "d", "e" ] );
        let mut sel = Selection::new();
        sel.toggle( &"e", &seq );
        sel.set_range( &"a", &"b", &seq );
        assert_eq!( sel.snapshot(), set( &[ "a", "b" ] ) );
        // Range operations keep whatever anchor was set before.
        assert_eq!( sel.anchor(), Some( &"e" ) );
    }


    #[test]
    fn test_stale_anchor_is_noop() {
        let full = rows( &[ "a", "b", "c", "d" ] );
        let mut sel = Selection::new();
        sel.select_only( &"a", &full );
        sel.extend_range( &"b", &full );
        assert_eq!( sel.snapshot(), set( &[ "a", "b" ] ) );

        // "a" is filtered out before the next shift-click.
        let filtered = rows( &[ "b", "c", "d" ] );
        sel.extend_range( &"d", &filtered );
        assert_eq!( sel.snapshot(), set( &[ "a", "b" ] ) );
        assert_eq!( sel.anchor(), Some( &"a" ) );
    }


    #[test]
    fn test_extend_without_anchor_selects_target() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut sel = Selection::new();
        sel.extend_range( &"c", &seq );
        assert_eq!( sel.snapshot(), set( &[ "c" ] ) );
        assert_eq!( sel.anchor(), Some( &"c" ) );
    }


    #[test]
    fn test_anchor_scenario() {
        let seq = rows( &[ "a", "b", "c" ] );
        let mut sel = Selection::new();

        sel.select_only( &"a", &seq );
        assert_eq!( sel.snapshot(), set( &[ "a" ] ) );
        assert_eq!( sel.anchor(), Some( &"a" ) );

        sel.extend_range( &"c", &seq );
        assert_eq!( sel.snapshot(), set( &[ "a", "b", "c" ] ) );
        assert_eq!( sel.anchor(), Some( &"a" ) );

        sel.extend_range( &"b", &seq );
        assert_eq!( sel.snapshot(), set( &[ "a", "b" ] ) );
        assert_eq!( sel.anchor(), Some( &"a" ) );
    }


    #[test]
    fn test_clear() {
        let seq = rows( &[ "a", "b" ] );
        let mut sel = Selection::new();
        sel.select_all( &seq );
        assert_eq!( sel.len(), 2 );
        sel.clear();
        assert!( sel.is_empty() );
        assert_eq!( sel.anchor(), None );
    }


    #[test]
    fn test_visible_in_skips_stale_ids() {
        let before = rows( &[ "a", "b", "c" ] );
        let mut sel = Selection::new();
        sel.set_range( &"a", &"c", &before );

        let after = rows( &[ "c", "x", "a" ] );
        assert_eq!( sel.visible_in( &after ), vec![ "c", "a" ] );
        assert_eq!( sel.len(), 3 );
        assert!( sel.contains( &"b" ) );
    }
}
