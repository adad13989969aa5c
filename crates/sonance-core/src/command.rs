//! Slash command parsing.
//!
//! Provides the command infrastructure for the TUI slash commands.
//! Commands are parsed from user input and executed by the front end
//! against the current list view.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::click::ClickScope;
use crate::library::AlbumSort;


/// Errors that can occur during command parsing or execution.
#[derive( Debug, Error )]
pub enum CommandError {
    #[error( "Unknown command: {0}" )]
    Unknown( String ),

    #[error( "Invalid argument: {0}" )]
    InvalidArgument( String ),

    #[error( "Missing argument: {0}" )]
    MissingArgument( String ),

    #[error( "Execution failed: {0}" )]
    ExecutionFailed( String ),
}


/// Parsed slash command.
#[derive( Debug, Clone, PartialEq )]
pub enum Command {
    // List commands
    Search { term: String },
    Sort { sort: Option<AlbumSort> },
    Refresh,
    Home,
    Albums,
    Artists,

    // Selection commands
    Clear,
    All,

    // Click settings
    Window { window: Duration },
    Scope { scope: Option<ClickScope> },

    // UI commands
    Help,
    Quit,
}


/// Parses a click scope argument.
fn parse_scope( s: &str ) -> Result<ClickScope, CommandError> {
    match s.to_lowercase().as_str() {
        "list" | "shared" => Ok( ClickScope::List ),
        "row" => Ok( ClickScope::Row ),
        _ => Err( CommandError::InvalidArgument(
            format!( "Invalid click scope: '{}'. Use 'list' or 'row'", s )
        )),
    }
}


impl Command {
    /// Parses a command string (without the leading `/`).
    ///
    /// @param input - The command string to parse
    ///
    /// @returns The parsed command or an error
    pub fn parse( input: &str ) -> Result<Self, CommandError> {
        let input = input.trim();
        let mut parts = input.splitn( 2, ' ' );
        let cmd = parts.next().unwrap_or( "" ).to_lowercase();
        let args = parts.next().map( |s| s.trim() ).filter( |s| !s.is_empty() );

        match cmd.as_str() {
            // List commands
            "search" | "find" | "?" => {
                let term = args
                    .ok_or_else( || CommandError::MissingArgument( "search term".into() ) )?;
                Ok( Command::Search { term: term.to_string() } )
            }
            "sort" | "so" => {
                let sort = args
                    .map( AlbumSort::from_str )
                    .transpose()
                    .map_err( |e| CommandError::InvalidArgument( e.to_string() ) )?;
                Ok( Command::Sort { sort } )
            }
            "refresh" | "r" | "reload" => Ok( Command::Refresh ),
            "home" | "dashboard" => Ok( Command::Home ),
            "albums" | "al" => Ok( Command::Albums ),
            "artists" | "ar" => Ok( Command::Artists ),

            // Selection commands
            "clear" | "cl" | "none" => Ok( Command::Clear ),
            "all" | "selectall" => Ok( Command::All ),

            // Click settings
            "window" | "win" => {
                let ms = args
                    .ok_or_else( || CommandError::MissingArgument( "window in ms".into() ) )?;
                let ms: u64 = ms.parse()
                    .map_err( |_| CommandError::InvalidArgument( format!( "Invalid window: {}", ms ) ) )?;
                Ok( Command::Window { window: Duration::from_millis( ms ) } )
            }
            "scope" => {
                let scope = args.map( parse_scope ).transpose()?;
                Ok( Command::Scope { scope } )
            }

            // UI commands
            "help" | "h" => Ok( Command::Help ),
            "quit" | "q" | "exit" => Ok( Command::Quit ),

            "" => Err( CommandError::Unknown( "empty command".into() ) ),
            other => Err( CommandError::Unknown( other.to_string() ) ),
        }
    }
}


/// Returns help text listing all available commands.
pub fn help_text() -> &'static str {
    r#"List Commands:
  /search <term>  Filter current list       [f]
  /sort [type]    Album sort (name/artist/newest/random)  [o]
  /refresh        Refetch the library       [R]
  /home           Show the dashboard        [Tab]
  /albums         Show albums               [Tab]
  /artists        Show artists              [Tab]

Selection:
  click           Select row
  ctrl+click      Toggle row                [Space]
  shift+click     Select range from anchor  [Shift+Up/Down]
  double-click    Open row                  [Enter]
  /clear          Clear selection           [Esc]
  /all            Select every shown row    [a]

Click Settings:
  /window <ms>    Double-click window
  /scope [mode]   Click timer scope (list/row)

Other Commands:
  /help           Show this help            [?]
  /quit           Exit sonance              [q]"#
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_search() {
        let cmd = Command::parse( "search blue train" ).unwrap();
        assert_eq!( cmd, Command::Search { term: "blue train".to_string() } );
    }


    #[test]
    fn test_parse_sort_with_type() {
        let cmd = Command::parse( "sort newest" ).unwrap();
        assert_eq!( cmd, Command::Sort { sort: Some( AlbumSort::Newest ) } );
    }


    #[test]
    fn test_parse_sort_cycle() {
        let cmd = Command::parse( "sort" ).unwrap();
        assert_eq!( cmd, Command::Sort { sort: None } );
    }


    #[test]
    fn test_parse_sort_invalid() {
        let result = Command::parse( "sort frequent" );
        assert!( matches!( result, Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_window() {
        let cmd = Command::parse( "window 250" ).unwrap();
        assert_eq!( cmd, Command::Window { window: Duration::from_millis( 250 ) } );
        assert!( matches!( Command::parse( "window fast" ), Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_scope() {
        assert_eq!( Command::parse( "scope row" ).unwrap(), Command::Scope { scope: Some( ClickScope::Row ) } );
        assert_eq!( Command::parse( "scope" ).unwrap(), Command::Scope { scope: None } );
    }


    #[test]
    fn test_parse_aliases() {
        assert_eq!( Command::parse( "r" ).unwrap(), Command::Refresh );
        assert_eq!( Command::parse( "CL" ).unwrap(), Command::Clear );
        assert_eq!( Command::parse( "ar" ).unwrap(), Command::Artists );
        assert_eq!( Command::parse( "dashboard" ).unwrap(), Command::Home );
    }


    #[test]
    fn test_parse_unknown() {
        let result = Command::parse( "foobar" );
        assert!( matches!( result, Err( CommandError::Unknown( _ ) ) ) );
    }


    #[test]
    fn test_parse_missing_arg() {
        let result = Command::parse( "search" );
        assert!( matches!( result, Err( CommandError::MissingArgument( _ ) ) ) );
    }
}
