//! Asynchronous list fetching with a manual-refresh cache
//!
//! Library scans run on a tokio blocking pool and report back over a
//! channel that the UI loop drains every tick. Cached results never go
//! stale on their own; only an explicit refresh fetches again. Entries
//! nobody has looked at for an hour are dropped.

use std::collections::{ HashMap, HashSet };
use std::path::PathBuf;
use std::time::{ Duration, Instant };

use anyhow::Result;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use sonance_core::{ AlbumSort, Catalog, LibraryError, LibraryScanner };


/// How long an unused cache entry is kept.
pub const CACHE_TIME: Duration = Duration::from_secs( 60 * 60 );


/// Identifies one cached list.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum QueryKey {
    Albums( AlbumSort ),
    Artists,
}


/// A finished fetch, delivered by `Fetcher::poll`.
#[derive( Debug )]
pub struct FetchResult {
    pub key: QueryKey,
    pub outcome: Result<(), LibraryError>,
}


#[derive( Debug )]
struct CacheEntry {
    catalog: Catalog,
    last_used: Instant,
}


/// Runs library scans in the background and caches their results.
pub struct Fetcher {
    runtime: Runtime,
    roots: Vec<PathBuf>,
    tx: mpsc::UnboundedSender<( QueryKey, Result<Catalog, LibraryError> )>,
    rx: mpsc::UnboundedReceiver<( QueryKey, Result<Catalog, LibraryError> )>,
    cache: HashMap<QueryKey, CacheEntry>,
    in_flight: HashSet<QueryKey>,
}


impl Fetcher {
    /// Creates a fetcher scanning the given library folders.
    pub fn new( roots: Vec<PathBuf> ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads( 1 )
            .thread_name( "sonance-fetch" )
            .enable_all()
            .build()?;
        let ( tx, rx ) = mpsc::unbounded_channel();

        Ok( Self {
            runtime,
            roots,
            tx,
            rx,
            cache: HashMap::new(),
            in_flight: HashSet::new(),
        })
    }


    /// Starts a fetch unless the key is cached or already loading.
    ///
    /// @returns true if a fetch was started
    pub fn request( &mut self, key: QueryKey ) -> bool {
        if self.cache.contains_key( &key ) {
            return false;
        }
        self.spawn( key )
    }


    /// Starts a fetch even if the key is cached. The cached data stays
    /// available until the new result arrives.
    pub fn refresh( &mut self, key: QueryKey ) -> bool {
        self.spawn( key )
    }


    fn spawn( &mut self, key: QueryKey ) -> bool {
        if !self.in_flight.insert( key ) {
            return false;
        }

        tracing::debug!( "Fetching {:?}", key );
        let roots = self.roots.clone();
        let tx = self.tx.clone();

        self.runtime.spawn( async move {
            let outcome = tokio::task::spawn_blocking( move || load( &roots, key ) )
                .await
                .unwrap_or_else( |e| Err( LibraryError::Task( e.to_string() ) ) );

            // The receiver only goes away when the app is shutting down
            let _ = tx.send(( key, outcome ));
        });

        true
    }


    /// Collects finished fetches and stores successful ones.
    ///
    /// A failed fetch leaves any previously cached data in place.
    pub fn poll( &mut self ) -> Vec<FetchResult> {
        let mut results = Vec::new();

        while let Ok(( key, outcome )) = self.rx.try_recv() {
            self.in_flight.remove( &key );

            let outcome = match outcome {
                Ok( catalog ) => {
                    tracing::info!( "Fetched {:?}: {} albums", key, catalog.albums.len() );
                    self.cache.insert( key, CacheEntry { catalog, last_used: Instant::now() } );
                    Ok(())
                }
                Err( e ) => {
                    tracing::warn!( "Fetch {:?} failed: {}", key, e );
                    Err( e )
                }
            };
            results.push( FetchResult { key, outcome } );
        }

        results
    }


    /// Gets a cached catalog and marks it as used.
    pub fn get( &mut self, key: QueryKey ) -> Option<&Catalog> {
        let entry = self.cache.get_mut( &key )?;
        entry.last_used = Instant::now();
        Some( &entry.catalog )
    }


    /// Gets a cached catalog without touching its usage time.
    pub fn peek( &self, key: QueryKey ) -> Option<&Catalog> {
        self.cache.get( &key ).map( |e| &e.catalog )
    }


    /// Returns true while a fetch for `key` is running.
    pub fn is_loading( &self, key: QueryKey ) -> bool {
        self.in_flight.contains( &key )
    }


    /// Drops cache entries unused for longer than `CACHE_TIME`, except the active ones.
    pub fn evict( &mut self, now: Instant, active: &[QueryKey] ) {
        self.cache.retain( |key, entry| {
            active.contains( key ) || now.duration_since( entry.last_used ) < CACHE_TIME
        });
    }
}


/// Scans the library and orders it for `key`.
fn load( roots: &[PathBuf], key: QueryKey ) -> Result<Catalog, LibraryError> {
    let mut scanner = LibraryScanner::new();
    for root in roots {
        scanner.add_root( root.clone() );
    }

    let mut catalog = scanner.scan()?;
    if let QueryKey::Albums( sort ) = key {
        sort.apply( &mut catalog.albums );
    }
    Ok( catalog )
}


#[cfg( test )]
mod tests {
    use std::fs;

    use super::*;


    /// Polls until a result arrives or a generous timeout passes.
    fn wait( fetcher: &mut Fetcher ) -> Vec<FetchResult> {
        let deadline = Instant::now() + Duration::from_secs( 10 );
        loop {
            let results = fetcher.poll();
            if !results.is_empty() || Instant::now() > deadline {
                return results;
            }
            std::thread::sleep( Duration::from_millis( 10 ) );
        }
    }


    fn library() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for rel in [ "B Artist/Zed/01.mp3", "A Artist/Alpha/01.flac" ] {
            let path = dir.path().join( rel );
            fs::create_dir_all( path.parent().unwrap() ).unwrap();
            fs::write( path, b"" ).unwrap();
        }
        dir
    }


    #[test]
    fn test_fetch_then_cache() {
        let dir = library();
        let mut fetcher = Fetcher::new( vec![ dir.path().to_path_buf() ] ).unwrap();
        let key = QueryKey::Albums( AlbumSort::Name );

        assert!( fetcher.request( key ) );
        assert!( fetcher.is_loading( key ) );
        assert!( !fetcher.request( key ) );

        let results = wait( &mut fetcher );
        assert_eq!( results.len(), 1 );
        assert!( results[ 0 ].outcome.is_ok() );
        assert!( !fetcher.is_loading( key ) );

        let names: Vec<_> = fetcher.get( key ).unwrap().albums.iter().map( |a| a.name.clone() ).collect();
        assert_eq!( names, vec![ "Alpha", "Zed" ] );

        // Cached: only an explicit refresh fetches again.
        assert!( !fetcher.request( key ) );
        assert!( fetcher.refresh( key ) );
        assert_eq!( wait( &mut fetcher ).len(), 1 );
    }


    #[test]
    fn test_failed_refresh_keeps_cache() {
        let dir = library();
        let root = dir.path().to_path_buf();
        let mut fetcher = Fetcher::new( vec![ root.clone() ] ).unwrap();
        fetcher.request( QueryKey::Artists );
        wait( &mut fetcher );
        assert_eq!( fetcher.peek( QueryKey::Artists ).unwrap().artists.len(), 2 );

        drop( dir );
        fetcher.refresh( QueryKey::Artists );
        let results = wait( &mut fetcher );
        assert!( matches!( results[ 0 ].outcome, Err( LibraryError::NotFound( _ ) ) ) );
        assert_eq!( fetcher.peek( QueryKey::Artists ).unwrap().artists.len(), 2 );
    }


    #[test]
    fn test_evict_keeps_active() {
        let dir = library();
        let mut fetcher = Fetcher::new( vec![ dir.path().to_path_buf() ] ).unwrap();
        fetcher.request( QueryKey::Artists );
        wait( &mut fetcher );
        fetcher.request( QueryKey::Albums( AlbumSort::Random ) );
        wait( &mut fetcher );

        let later = Instant::now() + CACHE_TIME + Duration::from_secs( 1 );
        fetcher.evict( later, &[ QueryKey::Artists ] );
        assert!( fetcher.peek( QueryKey::Artists ).is_some() );
        assert!( fetcher.peek( QueryKey::Albums( AlbumSort::Random ) ).is_none() );
    }
}
