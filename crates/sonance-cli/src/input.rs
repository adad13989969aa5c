//! Input mode handling for the TUI.
//!
//! Tracks whether keys drive the list, a slash command or the search bar,
//! and holds the line being edited.


/// Current input mode of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum InputMode {
    /// Normal mode - keyboard shortcuts active.
    #[default]
    Normal,

    /// Command mode - typing a slash command.
    Command,

    /// Search mode - typing the list filter, applied as you type.
    Search,
}


/// Single-line edit buffer. The cursor counts characters, not bytes.
#[derive( Debug, Default )]
pub struct InputBuffer {
    chars: Vec<char>,
    cursor: usize,
}


impl InputBuffer {
    /// Creates a new empty input buffer.
    pub fn new() -> Self {
        Self::default()
    }


    /// Replaces the content and puts the cursor at the end.
    pub fn set( &mut self, content: &str ) {
        self.chars = content.chars().collect();
        self.cursor = self.chars.len();
    }


    /// Inserts a character at the cursor.
    pub fn insert( &mut self, c: char ) {
        self.chars.insert( self.cursor, c );
        self.cursor += 1;
    }


    /// Deletes the character before the cursor.
    pub fn backspace( &mut self ) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove( self.cursor );
        }
    }


    /// Deletes the character under the cursor.
    pub fn delete( &mut self ) {
        if self.cursor < self.chars.len() {
            self.chars.remove( self.cursor );
        }
    }


    /// Clears the buffer.
    pub fn clear( &mut self ) {
        self.chars.clear();
        self.cursor = 0;
    }


    /// Gets the current content.
    pub fn content( &self ) -> String {
        self.chars.iter().collect()
    }


    /// Gets the cursor position in characters (for display).
    pub fn cursor( &self ) -> usize {
        self.cursor
    }


    pub fn move_left( &mut self ) {
        self.cursor = self.cursor.saturating_sub( 1 );
    }


    pub fn move_right( &mut self ) {
        self.cursor = ( self.cursor + 1 ).min( self.chars.len() );
    }


    pub fn move_home( &mut self ) {
        self.cursor = 0;
    }


    pub fn move_end( &mut self ) {
        self.cursor = self.chars.len();
    }


    /// Returns true if the buffer is empty.
    pub fn is_empty( &self ) -> bool {
        self.chars.is_empty()
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_edit_multibyte() {
        let mut buf = InputBuffer::new();
        for c in "café".chars() {
            buf.insert( c );
        }
        buf.move_left();
        buf.backspace();
        assert_eq!( buf.content(), "caé" );
        assert_eq!( buf.cursor(), 2 );

        buf.delete();
        assert_eq!( buf.content(), "ca" );
    }


    #[test]
    fn test_set_moves_cursor_to_end() {
        let mut buf = InputBuffer::new();
        buf.set( "blue" );
        assert_eq!( buf.cursor(), 4 );
        buf.move_home();
        buf.insert( '>' );
        assert_eq!( buf.content(), ">blue" );
        buf.move_end();
        buf.move_right();
        assert_eq!( buf.cursor(), 5 );
    }
}
