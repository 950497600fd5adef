//! Discrete event notifications for the driver collaborators
//!
//! The core accumulates events during `tick`/command handling; the
//! renderer and audio driver drain them once per frame. The core never
//! plays sounds or draws effects itself.

/// Something that happened inside the core this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The active piece moved horizontally (successful move only)
    PieceMoved,
    /// The active piece rotated (successful rotation only)
    PieceRotated,
    /// The active piece was committed into the board
    PieceLocked,
    /// A hard drop was executed, falling `distance` rows
    HardDropped { distance: i32 },
    /// Rows were cleared; `per_row_points` feeds the renderer's floating
    /// score texts
    LinesCleared {
        rows: Vec<usize>,
        per_row_points: u64,
    },
    /// A fresh combo chain began
    ComboStarted { count: u32 },
    /// A clearing lock extended the running chain
    ComboContinued { count: u32 },
    /// The combo window lapsed with no further clears
    ComboEnded,
    /// Progress damage landed on the boss
    BossDamaged { amount: u32 },
    /// The boss healed part of its pool
    BossHealed { amount: u32 },
    /// The final boss refilled its ability gauges
    BossBoosted,
    /// A non-final boss's pool was filled; the transition window began
    BossDefeated { index: usize },
    /// A boss took the stage (including the first at session start)
    BossAppeared { index: usize },
    /// The hide-next meter fired; the preview is concealed for a while
    NextPieceHidden,
    /// Piece gravity sped up under the boss's speed ability
    SpeedSurgeStarted,
    SpeedSurgeEnded,
    /// A lock above the visible board ended the session
    GameOver,
}
