//! GRBL Command Creator
//!
//! Builds the command text written to the plotter. Every command is a single
//! newline-terminated ASCII line.

use spectroplot_core::{Axis, MoveKind, PartialPosition};

/// Status report request, newline-terminated like every other command
pub const STATUS_QUERY: &[u8; 2] = b"?\n";

/// Stateless GRBL command builder
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCreator;

impl CommandCreator {
    /// Status query line
    pub fn status_query() -> &'static [u8] {
        STATUS_QUERY
    }

    /// Alarm unlock
    pub fn unlock() -> String {
        "$X\n".to_string()
    }

    /// Linear move in millimetres.
    ///
    /// `G91 G1 G21 X1.0 Y-2.5 F500` for incremental moves, `G90 ...` for
    /// absolute ones. Axis values are written with one decimal.
    pub fn motion(kind: MoveKind, target: &PartialPosition, feed: u32) -> String {
        let mut cmd = match kind {
            MoveKind::Incremental => "G91 G1 G21 ".to_string(),
            MoveKind::Absolute => "G90 G1 G21 ".to_string(),
        };
        for (axis, value) in target.axes() {
            cmd.push_str(&format!("{}{:.1} ", axis.letter(), value));
        }
        cmd.push_str(&format!("F{}\n", feed));
        cmd
    }

    /// Set the work origin on the given axes to the current position
    pub fn set_work_origin(axes: &[Axis]) -> String {
        let mut cmd = "G10 P1 L20".to_string();
        for axis in axes {
            cmd.push_str(&format!(" {}0", axis.letter()));
        }
        cmd.push('\n');
        cmd
    }

    /// Append a newline if the command lacks one
    pub fn ensure_newline(command: &str) -> String {
        if command.ends_with('\n') {
            command.to_string()
        } else {
            format!("{}\n", command)
        }
    }
}
