//! Hand-written maps for tests.
//!
//! - [`OPEN_FLOOR`]: a 6x5 floor with one shelf and one goal in the
//!   bottom corners, for movement tests.
//! - [`CORRIDOR`]: a one-row corridor flanked by walls, for chain tests.
//! - [`STORE_ROOM`]: two shelves above a goal, for delivery tests.

pub const OPEN_FLOOR: &str = "\
......
......
......
......
x....g";

pub const CORRIDOR: &str = "\
#######
.......
#x###g#";

/// Shelves 0 and 1 at (1,0) and (2,0); goal at (1,3).
pub const STORE_ROOM: &str = "\
.xx.
....
....
.g..";
