//! Dataset and search state for one list view.
//!
//! Holds the fetched rows, the active search query and the filtered rows,
//! and decides which of the two is currently displayed. Also tracks the
//! keyboard cursor, which is independent of the selection set.

use crate::search::{ self, Searchable };


/// One list view's rows and search state.
#[derive( Debug )]
pub struct Listing<T> {
    items: Vec<T>,
    filtered: Vec<T>,
    query: String,
    fields: &'static [&'static str],
    cursor: usize,
}


impl<T: Searchable + Clone> Listing<T> {
    /// Creates an empty listing searching the given fields.
    pub fn new( fields: &'static [&'static str] ) -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            fields,
            cursor: 0,
        }
    }


    /// Replaces the dataset, e.g. after a fetch or refetch.
    ///
    /// The query survives; the filtered rows are rebuilt from the new data.
    pub fn set_items( &mut self, items: Vec<T> ) {
        self.items = items;
        self.apply_filter();
    }


    /// Sets the search query and rebuilds the filtered rows.
    pub fn set_query( &mut self, query: impl Into<String> ) {
        self.query = query.into();
        self.apply_filter();
    }


    /// Clears the search query.
    pub fn clear_query( &mut self ) {
        self.query.clear();
        self.apply_filter();
    }


    /// Gets the current query.
    pub fn query( &self ) -> &str {
        &self.query
    }


    /// Returns true while a non-empty query is active.
    pub fn is_filtering( &self ) -> bool {
        !self.query.is_empty()
    }


    /// Returns the rows currently shown: the filtered rows while a query is
    /// active, the full dataset otherwise.
    pub fn displayed( &self ) -> &[T] {
        if self.is_filtering() {
            &self.filtered
        } else {
            &self.items
        }
    }


    /// Gets the full fetched dataset.
    pub fn items( &self ) -> &[T] {
        &self.items
    }


    fn apply_filter( &mut self ) {
        if self.is_filtering() {
            self.filtered = search::filter( &self.query, &self.items, self.fields );
        } else {
            self.filtered.clear();
        }

        // Keep the cursor on a real row
        let len = self.len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub( 1 );
        }
    }


    /// Moves the cursor down, wrapping at the end.
    pub fn cursor_next( &mut self ) {
        let len = self.len();
        if len > 0 {
            self.cursor = ( self.cursor + 1 ) % len;
        }
    }


    /// Moves the cursor up, wrapping at the start.
    pub fn cursor_previous( &mut self ) {
        let len = self.len();
        if len > 0 {
            self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
        }
    }


    /// Jumps to the first row.
    pub fn cursor_first( &mut self ) {
        self.cursor = 0;
    }


    /// Jumps to the last row.
    pub fn cursor_last( &mut self ) {
        self.cursor = self.len().saturating_sub( 1 );
    }


    /// Places the cursor on a displayed row index.
    pub fn set_cursor( &mut self, index: usize ) {
        if index < self.len() {
            self.cursor = index;
        }
    }


    /// Gets the cursor index for UI state.
    pub fn cursor( &self ) -> usize {
        self.cursor
    }


    /// Gets the row under the cursor.
    pub fn cursor_item( &self ) -> Option<&T> {
        self.displayed().get( self.cursor )
    }


    /// Gets the number of displayed rows.
    pub fn len( &self ) -> usize {
        self.displayed().len()
    }


    /// Returns true if no rows are displayed.
    pub fn is_empty( &self ) -> bool {
        self.displayed().is_empty()
    }
}


#[cfg( test )]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::range::Item;
    use crate::selection::Selection;


    #[derive( Debug, Clone, PartialEq )]
    struct Track( &'static str );


    impl Item for Track {
        type Id = &'static str;


        fn id( &self ) -> Self::Id {
            self.0
        }
    }


    impl Searchable for Track {
        fn field( &self, name: &str ) -> Option<Cow<'_, str>> {
            ( name == "name" ).then( || Cow::Borrowed( self.0 ) )
        }
    }


    fn listing( names: &[&'static str] ) -> Listing<Track> {
        let mut listing = Listing::new( &[ "name" ] );
        listing.set_items( names.iter().map( |n| Track( *n ) ).collect() );
        listing
    }


    fn names( listing: &Listing<Track> ) -> Vec<&'static str> {
        listing.displayed().iter().map( |t| t.0 ).collect()
    }


    #[test]
    fn test_displayed_follows_query() {
        let mut listing = listing( &[ "alpha", "beta", "alphabet" ] );
        assert_eq!( names( &listing ), vec![ "alpha", "beta", "alphabet" ] );

        listing.set_query( "alpha" );
        assert!( listing.is_filtering() );
        assert_eq!( names( &listing ), vec![ "alpha", "alphabet" ] );

        listing.clear_query();
        assert_eq!( names( &listing ), vec![ "alpha", "beta", "alphabet" ] );
    }


    #[test]
    fn test_refetch_keeps_query() {
        let mut listing = listing( &[ "alpha", "beta" ] );
        listing.set_query( "a" );
        listing.set_items( vec![ Track( "gamma" ), Track( "delta" ), Track( "omicron" ) ] );
        assert_eq!( names( &listing ), vec![ "gamma", "delta" ] );
    }


    #[test]
    fn test_cursor_clamped_after_filter() {
        let mut listing = listing( &[ "a1", "b1", "a2", "b2" ] );
        listing.cursor_last();
        assert_eq!( listing.cursor(), 3 );

        listing.set_query( "a" );
        assert_eq!( listing.cursor(), 1 );
        assert_eq!( listing.cursor_item(), Some( &Track( "a2" ) ) );

        listing.cursor_next();
        assert_eq!( listing.cursor(), 0 );
        listing.cursor_previous();
        assert_eq!( listing.cursor(), 1 );
    }


    #[test]
    fn test_query_change_leaves_selection_alone() {
        let mut listing = listing( &[ "ant", "bee", "cat", "dog" ] );
        let mut sel = Selection::new();
        sel.set_range( &"ant", &"cat", listing.displayed() );

        listing.set_query( "o" );
        assert_eq!( sel.len(), 3 );
        assert!( sel.visible_in( listing.displayed() ).is_empty() );

        listing.clear_query();
        assert_eq!( sel.visible_in( listing.displayed() ), vec![ "ant", "bee", "cat" ] );
    }


    #[test]
    fn test_range_uses_filtered_ranks() {
        let mut listing = listing( &[ "a1", "b1", "a2", "b2", "a3" ] );
        listing.set_query( "a" );

        let mut sel = Selection::new();
        sel.select_only( &"a1", listing.displayed() );
        sel.extend_range( &"a3", listing.displayed() );
        assert_eq!( sel.visible_in( listing.displayed() ), vec![ "a1", "a2", "a3" ] );
        assert!( !sel.contains( &"b1" ) );
    }
}
