//! Search filtering for list views.

use std::borrow::Cow;


/// A row whose named text fields can be searched.
pub trait Searchable {
    /// Returns the text of the named field, or None if the row has no such field.
    fn field( &self, name: &str ) -> Option<Cow<'_, str>>;
}


/// Returns the rows matching `query` in any of `fields`, preserving order.
///
/// Matching is a case-insensitive substring test. An empty (or blank) query
/// matches everything.
pub fn filter<T: Searchable + Clone>( query: &str, items: &[T], fields: &[&str] ) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    items.iter()
        .filter( |item| is_match( *item, &needle, fields ) )
        .cloned()
        .collect()
}


fn is_match<T: Searchable>( item: &T, needle: &str, fields: &[&str] ) -> bool {
    fields.iter()
        .filter_map( |name| item.field( name ) )
        .any( |value| value.to_lowercase().contains( needle ) )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[derive( Debug, Clone, PartialEq )]
    struct Entry {
        name: &'static str,
        artist: &'static str,
    }


    impl Searchable for Entry {
        fn field( &self, name: &str ) -> Option<Cow<'_, str>> {
            match name {
                "name" => Some( Cow::Borrowed( self.name ) ),
                "artist" => Some( Cow::Borrowed( self.artist ) ),
                _ => None,
            }
        }
    }


    fn entries() -> Vec<Entry> {
        vec![
            Entry { name: "Blue Train", artist: "John Coltrane" },
            Entry { name: "Kind of Blue", artist: "Miles Davis" },
            Entry { name: "Giant Steps", artist: "John Coltrane" },
        ]
    }


    #[test]
    fn test_empty_query_keeps_all() {
        assert_eq!( filter( "", &entries(), &[ "name" ] ), entries() );
        assert_eq!( filter( "   ", &entries(), &[ "name" ] ), entries() );
    }


    #[test]
    fn test_case_insensitive_order_preserved() {
        let found = filter( "BLUE", &entries(), &[ "name" ] );
        let names: Vec<_> = found.iter().map( |e| e.name ).collect();
        assert_eq!( names, vec![ "Blue Train", "Kind of Blue" ] );
    }


    #[test]
    fn test_only_named_fields_searched() {
        assert!( filter( "coltrane", &entries(), &[ "name" ] ).is_empty() );
        assert_eq!( filter( "coltrane", &entries(), &[ "name", "artist" ] ).len(), 2 );
        assert!( filter( "blue", &entries(), &[ "genre" ] ).is_empty() );
    }
}
