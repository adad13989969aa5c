//! Library scanning and catalog building
//!
//! Walks music directories, groups audio files into albums by folder and
//! derives the artist list. Folder layout is expected to be
//! `<root>/<Artist>/<Album>/<tracks>`; albums directly under the root are
//! credited to an unknown artist.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{ Path, PathBuf };
use std::str::FromStr;
use std::time::SystemTime;

use serde::{ Deserialize, Serialize };
use thiserror::Error;

use crate::range::Item;
use crate::search::Searchable;


/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "wav", "m4a", "aac", "opus", "wma", "aiff", "alac",
];

/// Artist credited to albums that sit directly under a root.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Fields searched in the album list. Folder scans carry no genre tags.
pub const ALBUM_SEARCH_FIELDS: &[&str] = &[ "name", "artist", "year" ];

/// Fields searched in the artist list.
pub const ARTIST_SEARCH_FIELDS: &[&str] = &[ "name" ];


/// Errors that can occur during library operations.
#[derive( Debug, Error )]
pub enum LibraryError {
    #[error( "IO error: {0}" )]
    Io( #[from] std::io::Error ),

    #[error( "Path not found: {0}" )]
    NotFound( PathBuf ),

    #[error( "No library folders configured" )]
    NoRoots,

    #[error( "Unknown sort type: {0}" )]
    UnknownSort( String ),

    #[error( "Scan task failed: {0}" )]
    Task( String ),
}


/// An album: one folder of audio files.
#[derive( Debug, Clone, PartialEq )]
pub struct Album {
    pub path: PathBuf,
    pub name: String,
    pub artist: String,
    pub year: Option<i32>,
    pub tracks: Vec<PathBuf>,
    pub added: Option<SystemTime>,
}


impl Item for Album {
    type Id = String;


    fn id( &self ) -> Self::Id {
        self.path.to_string_lossy().into_owned()
    }
}


impl Searchable for Album {
    fn field( &self, name: &str ) -> Option<Cow<'_, str>> {
        match name {
            "name" => Some( Cow::Borrowed( self.name.as_str() ) ),
            "artist" => Some( Cow::Borrowed( self.artist.as_str() ) ),
            "year" => self.year.map( |y| Cow::Owned( y.to_string() ) ),
            _ => None,
        }
    }
}


/// An artist and how many albums they have.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Artist {
    pub name: String,
    pub album_count: usize,
}


impl Item for Artist {
    type Id = String;


    fn id( &self ) -> Self::Id {
        self.name.clone()
    }
}


impl Searchable for Artist {
    fn field( &self, name: &str ) -> Option<Cow<'_, str>> {
        ( name == "name" ).then( || Cow::Borrowed( self.name.as_str() ) )
    }
}


/// Sort order for the album list.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize )]
#[serde( rename_all = "lowercase" )]
pub enum AlbumSort {
    Name,
    Artist,
    Newest,
    #[default]
    Random,
}


impl AlbumSort {
    /// Sort types in menu order.
    pub const ALL: [AlbumSort; 4] = [ AlbumSort::Name, AlbumSort::Artist, AlbumSort::Newest, AlbumSort::Random ];


    /// Returns the display label of the sort type.
    pub fn label( &self ) -> &'static str {
        match self {
            AlbumSort::Name => "A-Z (Name)",
            AlbumSort::Artist => "A-Z (Artist)",
            AlbumSort::Newest => "Newly Added",
            AlbumSort::Random => "Random",
        }
    }


    /// Returns the next sort type in menu order, wrapping around.
    pub fn next( self ) -> Self {
        let pos = Self::ALL.iter().position( |s| *s == self ).unwrap_or( 0 );
        Self::ALL[ ( pos + 1 ) % Self::ALL.len() ]
    }


    /// Sorts albums in place.
    pub fn apply( &self, albums: &mut [Album] ) {
        match self {
            AlbumSort::Name => {
                albums.sort_by( |a, b| a.name.to_lowercase().cmp( &b.name.to_lowercase() ) );
            }
            AlbumSort::Artist => {
                albums.sort_by( |a, b| {
                    a.artist.to_lowercase().cmp( &b.artist.to_lowercase() )
                        .then_with( || a.year.cmp( &b.year ) )
                        .then_with( || a.name.to_lowercase().cmp( &b.name.to_lowercase() ) )
                });
            }
            AlbumSort::Newest => {
                albums.sort_by( |a, b| b.added.cmp( &a.added ) );
            }
            AlbumSort::Random => shuffle( albums ),
        }
    }
}


impl FromStr for AlbumSort {
    type Err = LibraryError;


    fn from_str( s: &str ) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "alphabeticalbyname" | "az" => Ok( AlbumSort::Name ),
            "artist" | "alphabeticalbyartist" => Ok( AlbumSort::Artist ),
            "newest" | "new" | "added" => Ok( AlbumSort::Newest ),
            "random" | "shuffle" => Ok( AlbumSort::Random ),
            _ => Err( LibraryError::UnknownSort( s.to_string() ) ),
        }
    }
}


/// Albums and artists found by a scan.
#[derive( Debug, Clone, Default )]
pub struct Catalog {
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
}


impl Catalog {
    /// Builds a catalog from scanned albums, deriving the artist list.
    pub fn from_albums( albums: Vec<Album> ) -> Self {
        let mut counts: BTreeMap<String, ( String, usize )> = BTreeMap::new();
        for album in &albums {
            let entry = counts
                .entry( album.artist.to_lowercase() )
                .or_insert_with( || ( album.artist.clone(), 0 ) );
            entry.1 += 1;
        }

        let artists = counts
            .into_values()
            .map( |( name, album_count )| Artist { name, album_count } )
            .collect();

        Self { albums, artists }
    }


    /// Gets the albums credited to an artist, oldest first.
    pub fn albums_by( &self, artist: &str ) -> Vec<Album> {
        let mut albums: Vec<Album> = self.albums
            .iter()
            .filter( |a| a.artist.eq_ignore_ascii_case( artist ) )
            .cloned()
            .collect();
        AlbumSort::Artist.apply( &mut albums );
        albums
    }


    /// Finds an album by its id.
    pub fn album( &self, id: &str ) -> Option<&Album> {
        self.albums.iter().find( |a| a.id() == id )
    }
}


/// Library scanner for discovering albums.
pub struct LibraryScanner {
    roots: Vec<PathBuf>,
}


impl LibraryScanner {
    /// Creates a new scanner with no root directories.
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }


    /// Returns the platform music folder, falling back to `~/Music`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::audio_dir().or_else( || dirs::home_dir().map( |h| h.join( "Music" ) ) )
    }


    /// Adds a root directory to scan.
    pub fn add_root( &mut self, path: PathBuf ) {
        if !self.roots.contains( &path ) {
            self.roots.push( path );
        }
    }



    /// Scans all roots and builds the catalog.
    pub fn scan( &self ) -> Result<Catalog, LibraryError> {
        if self.roots.is_empty() {
            return Err( LibraryError::NoRoots );
        }

        let mut folders: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for root in &self.roots {
            tracing::info!( "Scanning: {:?}", root );
            self.scan_recursive( root, &mut folders )?;
        }

        let albums: Vec<Album> = folders
            .into_iter()
            .map( |( dir, mut tracks )| {
                tracks.sort();
                let root = self.roots.iter().find( |r| dir.starts_with( r ) );
                album_from_folder( dir, root.map( PathBuf::as_path ), tracks )
            })
            .collect();

        tracing::info!( "Found {} albums", albums.len() );
        Ok( Catalog::from_albums( albums ) )
    }


    fn scan_recursive(
        &self,
        dir: &Path,
        folders: &mut BTreeMap<PathBuf, Vec<PathBuf>>,
    ) -> Result<(), LibraryError> {
        let entries = match std::fs::read_dir( dir ) {
            Ok( e ) => e,
            Err( e ) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                tracing::warn!( "Access denied: {:?}", dir );
                return Ok(()); // Skip inaccessible directories
            }
            Err( e ) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err( LibraryError::NotFound( dir.to_path_buf() ) );
            }
            Err( e ) => return Err( LibraryError::Io( e ) ),
        };

        for entry in entries.flatten() {
            let path = entry.path();

            if path.is_dir() {
                self.scan_recursive( &path, folders )?;
            } else if is_audio_file( &path ) {
                folders.entry( dir.to_path_buf() ).or_default().push( path );
            }
        }

        Ok(())
    }
}


impl Default for LibraryScanner {
    fn default() -> Self {
        Self::new()
    }
}


fn album_from_folder( dir: PathBuf, root: Option<&Path>, tracks: Vec<PathBuf> ) -> Album {
    let folder = file_name( &dir );
    let ( name, year ) = split_year( &folder );

    let artist = match dir.parent() {
        Some( parent ) if Some( dir.as_path() ) != root && Some( parent ) != root => file_name( parent ),
        _ => UNKNOWN_ARTIST.to_string(),
    };

    let added = tracks.iter()
        .filter_map( |t| std::fs::metadata( t ).and_then( |m| m.modified() ).ok() )
        .max();

    Album { path: dir, name, artist, year, tracks, added }
}


fn file_name( path: &Path ) -> String {
    path.file_name()
        .map( |n| n.to_string_lossy().into_owned() )
        .unwrap_or_else( || path.to_string_lossy().into_owned() )
}


/// Splits a release year off an album folder name.
///
/// Recognizes `Name (1999)`, `Name [1999]` and `1999 - Name`.
fn split_year( folder: &str ) -> ( String, Option<i32> ) {
    let trimmed = folder.trim();

    for ( open, close ) in [ ( '(', ')' ), ( '[', ']' ) ] {
        if let Some( rest ) = trimmed.strip_suffix( close ) {
            if let Some( idx ) = rest.rfind( open ) {
                if let Some( year ) = parse_year( &rest[ idx + 1.. ] ) {
                    return ( rest[ ..idx ].trim().to_string(), Some( year ) );
                }
            }
        }
    }

    if let Some(( head, tail )) = trimmed.split_once( " - " ) {
        if let Some( year ) = parse_year( head ) {
            return ( tail.trim().to_string(), Some( year ) );
        }
    }

    ( trimmed.to_string(), None )
}


fn parse_year( s: &str ) -> Option<i32> {
    let s = s.trim();
    if s.len() != 4 || !s.chars().all( |c| c.is_ascii_digit() ) {
        return None;
    }
    s.parse().ok()
}


/// Checks if a file has a supported audio extension.
fn is_audio_file( path: &Path ) -> bool {
    path.extension()
        .and_then( |e| e.to_str() )
        .map( |e| SUPPORTED_EXTENSIONS.contains( &e.to_lowercase().as_str() ) )
        .unwrap_or( false )
}


fn shuffle<T>( items: &mut [T] ) {
    use std::collections::hash_map::RandomState;
    use std::hash::{ BuildHasher, Hasher };

    // Simple Fisher-Yates shuffle
    let hasher = RandomState::new();
    for i in ( 1..items.len() ).rev() {
        let mut h = hasher.build_hasher();
        h.write_usize( i );
        let j = h.finish() as usize % ( i + 1 );
        items.swap( i, j );
    }
}


#[cfg( test )]
mod tests {
    use std::fs;

    use super::*;


    fn touch( path: &Path ) {
        fs::create_dir_all( path.parent().unwrap() ).unwrap();
        fs::write( path, b"" ).unwrap();
    }


    fn album( name: &str, artist: &str, year: Option<i32> ) -> Album {
        Album {
            path: PathBuf::from( format!( "/music/{}/{}", artist, name ) ),
            name: name.to_string(),
            artist: artist.to_string(),
            year,
            tracks: Vec::new(),
            added: None,
        }
    }


    #[test]
    fn test_split_year() {
        assert_eq!( split_year( "Blue Train (1957)" ), ( "Blue Train".to_string(), Some( 1957 ) ) );
        assert_eq!( split_year( "Kind of Blue [1959]" ), ( "Kind of Blue".to_string(), Some( 1959 ) ) );
        assert_eq!( split_year( "1959 - Giant Steps" ), ( "Giant Steps".to_string(), Some( 1959 ) ) );
        assert_eq!( split_year( "Live (Remastered)" ), ( "Live (Remastered)".to_string(), None ) );
        assert_eq!( split_year( "Untitled" ), ( "Untitled".to_string(), None ) );
    }


    #[test]
    fn test_scan_groups_albums_by_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch( &root.join( "Coltrane/Blue Train (1957)/01 Blue Train.flac" ) );
        touch( &root.join( "Coltrane/Blue Train (1957)/02 Moment's Notice.flac" ) );
        touch( &root.join( "Coltrane/Blue Train (1957)/cover.jpg" ) );
        touch( &root.join( "Coltrane/Giant Steps/01 Giant Steps.mp3" ) );
        touch( &root.join( "Davis/Kind of Blue/01 So What.ogg" ) );
        touch( &root.join( "Loose/01 track.wav" ) );
        touch( &root.join( "notes.txt" ) );

        let mut scanner = LibraryScanner::new();
        scanner.add_root( root.to_path_buf() );
        let catalog = scanner.scan().unwrap();

        assert_eq!( catalog.albums.len(), 4 );
        let blue = catalog.albums.iter().find( |a| a.name == "Blue Train" ).unwrap();
        assert_eq!( blue.artist, "Coltrane" );
        assert_eq!( blue.year, Some( 1957 ) );
        assert_eq!( blue.tracks.len(), 2 );

        let loose = catalog.albums.iter().find( |a| a.name == "Loose" ).unwrap();
        assert_eq!( loose.artist, UNKNOWN_ARTIST );

        let artists: Vec<_> = catalog.artists.iter().map( |a| ( a.name.as_str(), a.album_count ) ).collect();
        assert_eq!( artists, vec![ ( "Coltrane", 2 ), ( "Davis", 1 ), ( UNKNOWN_ARTIST, 1 ) ] );
    }


    #[test]
    fn test_scan_missing_root() {
        let mut scanner = LibraryScanner::new();
        scanner.add_root( PathBuf::from( "/definitely/not/a/music/folder" ) );
        assert!( matches!( scanner.scan(), Err( LibraryError::NotFound( _ ) ) ) );
    }


    #[test]
    fn test_scan_without_roots() {
        assert!( matches!( LibraryScanner::new().scan(), Err( LibraryError::NoRoots ) ) );
    }


    #[test]
    fn test_sort_by_name_and_artist() {
        let mut albums = vec![
            album( "Giant Steps", "Coltrane", Some( 1960 ) ),
            album( "Kind of Blue", "Davis", Some( 1959 ) ),
            album( "Blue Train", "Coltrane", Some( 1957 ) ),
        ];

        AlbumSort::Name.apply( &mut albums );
        let names: Vec<_> = albums.iter().map( |a| a.name.as_str() ).collect();
        assert_eq!( names, vec![ "Blue Train", "Giant Steps", "Kind of Blue" ] );

        AlbumSort::Artist.apply( &mut albums );
        let names: Vec<_> = albums.iter().map( |a| a.name.as_str() ).collect();
        assert_eq!( names, vec![ "Blue Train", "Giant Steps", "Kind of Blue" ] );
    }


    #[test]
    fn test_random_sort_keeps_albums() {
        let mut albums: Vec<_> = ( 0..20 ).map( |i| album( &i.to_string(), "x", None ) ).collect();
        AlbumSort::Random.apply( &mut albums );
        assert_eq!( albums.len(), 20 );
        let mut names: Vec<_> = albums.iter().map( |a| a.name.parse::<i32>().unwrap() ).collect();
        names.sort();
        assert_eq!( names, ( 0..20 ).collect::<Vec<_>>() );
    }


    #[test]
    fn test_sort_parse() {
        assert_eq!( "alphabeticalByName".parse::<AlbumSort>().unwrap(), AlbumSort::Name );
        assert_eq!( "NEWEST".parse::<AlbumSort>().unwrap(), AlbumSort::Newest );
        assert!( "frequent".parse::<AlbumSort>().is_err() );
    }


    #[test]
    fn test_sort_next_cycles_menu_order() {
        let mut sort = AlbumSort::Name;
        let mut seen = Vec::new();
        for _ in 0..AlbumSort::ALL.len() {
            seen.push( sort );
            sort = sort.next();
        }
        assert_eq!( seen, AlbumSort::ALL );
        assert_eq!( sort, AlbumSort::Name );
    }


    #[test]
    fn test_albums_by_artist() {
        let catalog = Catalog::from_albums( vec![
            album( "Giant Steps", "Coltrane", Some( 1960 ) ),
            album( "Kind of Blue", "Davis", Some( 1959 ) ),
            album( "Blue Train", "Coltrane", Some( 1957 ) ),
        ]);
        let names: Vec<_> = catalog.albums_by( "coltrane" ).into_iter().map( |a| a.name ).collect();
        assert_eq!( names, vec![ "Blue Train", "Giant Steps" ] );
        assert!( catalog.album( "/music/Davis/Kind of Blue" ).is_some() );
    }


    #[test]
    fn test_album_search_fields() {
        let a = album( "Blue Train", "Coltrane", Some( 1957 ) );
        assert_eq!( a.field( "year" ).as_deref(), Some( "1957" ) );
        assert_eq!( a.field( "genre" ), None );
    }
}
