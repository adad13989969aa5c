//! Dashboard shelves
//!
//! The dashboard shows a few short album rows, each the head of the library
//! under one sort order.

use crate::library::{ Album, AlbumSort, Catalog };


/// Most albums a shelf holds.
pub const SHELF_SIZE: usize = 20;


/// One dashboard row of albums.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct Shelf {
    pub title: &'static str,
    pub sort: AlbumSort,
}


/// Shelves in display order.
pub const SHELVES: [Shelf; 2] = [
    Shelf { title: "Recently Added", sort: AlbumSort::Newest },
    Shelf { title: "Random", sort: AlbumSort::Random },
];


impl Shelf {
    /// Picks this shelf's albums from a catalog.
    ///
    /// @param catalog - The scanned library
    ///
    /// @returns At most `SHELF_SIZE` albums in shelf order
    pub fn albums( &self, catalog: &Catalog ) -> Vec<Album> {
        let mut albums = catalog.albums.clone();
        self.sort.apply( &mut albums );
        albums.truncate( SHELF_SIZE );
        albums
    }
}


#[cfg( test )]
mod tests {
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::time::{ Duration, SystemTime };

    use super::*;
    use crate::range::Item;


    fn album( n: u64 ) -> Album {
        Album {
            path: PathBuf::from( format!( "/music/Artist/Album {}", n ) ),
            name: format!( "Album {}", n ),
            artist: "Artist".into(),
            year: None,
            tracks: Vec::new(),
            added: Some( SystemTime::UNIX_EPOCH + Duration::from_secs( n ) ),
        }
    }


    fn catalog( count: u64 ) -> Catalog {
        Catalog::from_albums( ( 0..count ).map( album ).collect() )
    }


    #[test]
    fn test_recently_added_newest_first_and_capped() {
        let albums = SHELVES[ 0 ].albums( &catalog( 25 ) );
        assert_eq!( albums.len(), SHELF_SIZE );
        assert_eq!( albums[ 0 ].name, "Album 24" );
        assert_eq!( albums[ SHELF_SIZE - 1 ].name, "Album 5" );
    }


    #[test]
    fn test_random_shelf_is_distinct_albums_from_library() {
        let library = catalog( 25 );
        let albums = SHELVES[ 1 ].albums( &library );
        assert_eq!( albums.len(), SHELF_SIZE );

        let ids: HashSet<_> = albums.iter().map( Album::id ).collect();
        assert_eq!( ids.len(), SHELF_SIZE );
        assert!( ids.iter().all( |id| library.album( id ).is_some() ) );
    }


    #[test]
    fn test_small_library_fills_shelf_partially() {
        assert_eq!( SHELVES[ 0 ].albums( &catalog( 3 ) ).len(), 3 );
        assert!( SHELVES[ 1 ].albums( &Catalog::default() ).is_empty() );
    }
}
