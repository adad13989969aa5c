//! Sonance Core - Library scanning and list interaction
//!
//! This crate provides the core functionality behind the library browser:
//! scanning music folders into albums and artists, search filtering, and
//! the click/selection engine shared by every list view.

pub mod click;
pub mod command;
pub mod dashboard;
pub mod interaction;
pub mod library;
pub mod listing;
pub mod range;
pub mod search;
pub mod selection;

pub use click::{ ClickDisambiguator, ClickScope, ClickTimer, Gesture, Modifiers };
pub use command::{ Command, CommandError };
pub use dashboard::{ Shelf, SHELVES, SHELF_SIZE };
pub use interaction::{ ListEvent, ListInteraction };
pub use library::{ Album, AlbumSort, Artist, Catalog, LibraryError, LibraryScanner };
pub use listing::Listing;
pub use range::Item;
pub use selection::Selection;
