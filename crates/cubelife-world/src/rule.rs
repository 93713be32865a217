//! The 3D life rule.
//!
//! - A live cell with 6 or fewer live neighbors dies of underpopulation.
//! - A live cell with 7 to 10 live neighbors survives.
//! - A live cell with more than 10 live neighbors dies of overpopulation.
//! - A dead cell with 6 to 11 live neighbors is born.
//! - A dead cell still marked with a cause of death that does not qualify for
//!   birth settles back to `Default`.

use cubelife_core::CellState;
use std::ops::RangeInclusive;

/// Live-neighbor counts that keep a live cell alive.
pub const SURVIVAL_RANGE: RangeInclusive<u8> = 7..=10;

/// Live-neighbor counts that bring a dead cell to life.
pub const BIRTH_RANGE: RangeInclusive<u8> = 6..=11;

/// Decide the next state of a cell.
///
/// Returns `None` when the cell is already `Default` and stays that way, in
/// which case no transition is reported.
pub fn next_state(current: CellState, live_neighbors: u8) -> Option<CellState> {
    if current.is_alive() {
        let next = if live_neighbors < *SURVIVAL_RANGE.start() {
            CellState::Underpopulation
        } else if live_neighbors <= *SURVIVAL_RANGE.end() {
            CellState::Survivor
        } else {
            CellState::Overpopulation
        };
        Some(next)
    } else if BIRTH_RANGE.contains(&live_neighbors) {
        Some(CellState::Reproduction)
    } else if !current.is_default() {
        Some(CellState::Default)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_live_cell_rules() {
        for alive in [CellState::Survivor, CellState::Reproduction] {
            assert_eq!(next_state(alive, 0), Some(CellState::Underpopulation));
            assert_eq!(next_state(alive, 6), Some(CellState::Underpopulation));
            assert_eq!(next_state(alive, 7), Some(CellState::Survivor));
            assert_eq!(next_state(alive, 10), Some(CellState::Survivor));
            assert_eq!(next_state(alive, 11), Some(CellState::Overpopulation));
            assert_eq!(next_state(alive, 26), Some(CellState::Overpopulation));
        }
    }

    #[test]
    fn test_default_cell_rules() {
        assert_eq!(next_state(CellState::Default, 5), None);
        assert_eq!(next_state(CellState::Default, 6), Some(CellState::Reproduction));
        assert_eq!(next_state(CellState::Default, 11), Some(CellState::Reproduction));
        assert_eq!(next_state(CellState::Default, 12), None);
        assert_eq!(next_state(CellState::Default, 0), None);
    }

    #[test]
    fn test_dead_flavors_settle_to_default() {
        for dead in [CellState::Underpopulation, CellState::Overpopulation] {
            assert_eq!(next_state(dead, 3), Some(CellState::Default));
            assert_eq!(next_state(dead, 20), Some(CellState::Default));
            assert_eq!(next_state(dead, 8), Some(CellState::Reproduction));
        }
    }

    #[test]
    fn test_settling_happens_once() {
        let settled = next_state(CellState::Underpopulation, 2).unwrap();
        assert_eq!(settled, CellState::Default);
        assert_eq!(next_state(settled, 2), None);
    }

    proptest! {
        #[test]
        fn prop_live_cells_always_transition(n in 0u8..=26) {
            for alive in [CellState::Survivor, CellState::Reproduction] {
                let next = next_state(alive, n);
                prop_assert!(next.is_some());
                prop_assert_eq!(next.map(|s| s.is_alive()), Some(SURVIVAL_RANGE.contains(&n)));
            }
        }

        #[test]
        fn prop_only_default_can_stay_silent(n in 0u8..=26) {
            for state in CellState::ALL {
                if next_state(state, n).is_none() {
                    prop_assert_eq!(state, CellState::Default);
                    prop_assert!(!BIRTH_RANGE.contains(&n));
                }
            }
        }
    }
}
