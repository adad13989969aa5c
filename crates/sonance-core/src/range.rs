//! Range resolution over the displayed sequence.
//!
//! Ranks are never stored. Every lookup walks the sequence it is handed,
//! so a re-sort, re-filter or refetch between two clicks cannot leave a
//! stale index behind.


/// A row that can take part in selection.
pub trait Item {
    type Id: Clone + Eq + std::hash::Hash + std::fmt::Debug;

    /// Returns the stable identifier of this row.
    fn id( &self ) -> Self::Id;
}


/// Returns the index of `id` within `seq`, if present.
pub fn rank_of<T: Item>( id: &T::Id, seq: &[T] ) -> Option<usize> {
    seq.iter().position( |item| item.id() == *id )
}


/// Resolves the inclusive run of ids between `anchor` and `target`.
///
/// Direction does not matter: the result is always in sequence order.
///
/// @param anchor - Id the range starts from
/// @param target - Id the range extends to
/// @param seq - The currently displayed sequence
///
/// @returns The ids in the range, or None if either end is not displayed
pub fn resolve_range<T: Item>( anchor: &T::Id, target: &T::Id, seq: &[T] ) -> Option<Vec<T::Id>> {
    let a = rank_of( anchor, seq )?;
    let t = rank_of( target, seq )?;
    let ( lo, hi ) = if a <= t { ( a, t ) } else { ( t, a ) };

    Some( seq[ lo..=hi ].iter().map( T::id ).collect() )
}


#[cfg( test )]
pub( crate ) mod tests {
    use super::*;


    /// Minimal row used across the engine tests.
    #[derive( Debug, Clone, PartialEq )]
    pub struct Row( pub &'static str );


    impl Item for Row {
        type Id = &'static str;


        fn id( &self ) -> Self::Id {
            self.0
        }
    }


    pub fn rows( ids: &[&'static str] ) -> Vec<Row> {
        ids.iter().map( |id| Row( *id ) ).collect()
    }


    #[test]
    fn test_rank_of() {
        let seq = rows( &[ "a", "b", "c" ] );
        assert_eq!( rank_of( &"a", &seq ), Some( 0 ) );
        assert_eq!( rank_of( &"c", &seq ), Some( 2 ) );
        assert_eq!( rank_of( &"z", &seq ), None );
    }


    #[test]
    fn test_range_forward() {
        let seq = rows( &[ "a", "b", "c", "d", "e" ] );
        assert_eq!( resolve_range( &"b", &"d", &seq ), Some( vec![ "b", "c", "d" ] ) );
    }


    #[test]
    fn test_range_backward_is_sequence_ordered() {
        let seq = rows( &[ "a", "b", "c", "d", "e" ] );
        assert_eq!( resolve_range( &"d", &"b", &seq ), Some( vec![ "b", "c", "d" ] ) );
    }


    #[test]
    fn test_range_single_row() {
        let seq = rows( &[ "a", "b", "c" ] );
        assert_eq!( resolve_range( &"b", &"b", &seq ), Some( vec![ "b" ] ) );
    }


    #[test]
    fn test_range_missing_end() {
        let seq = rows( &[ "a", "b", "c" ] );
        assert_eq!( resolve_range( &"x", &"b", &seq ), None );
        assert_eq!( resolve_range( &"a", &"x", &seq ), None );
        assert_eq!( resolve_range::<Row>( &"a", &"b", &[] ), None );
    }


    #[test]
    fn test_range_recomputed_after_reorder() {
        let seq = rows( &[ "a", "b", "c", "d" ] );
        assert_eq!( resolve_range( &"a", &"c", &seq ), Some( vec![ "a", "b", "c" ] ) );

        let resorted = rows( &[ "d", "c", "b", "a" ] );
        assert_eq!( resolve_range( &"a", &"c", &resorted ), Some( vec![ "c", "b", "a" ] ) );

        let filtered = rows( &[ "a", "c" ] );
        assert_eq!( resolve_range( &"a", &"c", &filtered ), Some( vec![ "a", "c" ] ) );
    }
}
