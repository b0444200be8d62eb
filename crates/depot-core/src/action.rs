//! The discrete per-agent action set.

use std::fmt;

/// One agent's action for a single tick.
///
/// Encoded on the wire as a small integer (see [`Action::code`]).
/// `ToggleLoad` loads a shelf when the agent is empty-handed and unloads
/// when it is carrying one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Action {
    /// Do nothing.
    #[default]
    NoOp = 0,
    /// Attempt to move one cell in the facing direction.
    Forward = 1,
    /// Rotate 90 degrees counter-clockwise in place.
    TurnLeft = 2,
    /// Rotate 90 degrees clockwise in place.
    TurnRight = 3,
    /// Load the shelf underneath, or unload the carried shelf.
    ToggleLoad = 4,
}

impl Action {
    /// Number of distinct actions (size of the discrete action space).
    pub const COUNT: usize = 5;

    /// Integer encoding used in action buffers.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Action {
    type Error = i32;

    /// Decode an action code. Returns the offending value on failure.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::NoOp),
            1 => Ok(Action::Forward),
            2 => Ok(Action::TurnLeft),
            3 => Ok(Action::TurnRight),
            4 => Ok(Action::ToggleLoad),
            other => Err(other),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::NoOp => "noop",
            Action::Forward => "forward",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::ToggleLoad => "toggle_load",
        };
        f.write_str(name)
    }
}
