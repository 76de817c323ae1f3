//! GRBL Status Report Parsing
//!
//! Status frames look like `<Idle|WPos:1.000,2.000,0.000|FS:0,0>`:
//! field 0 is the machine state token, field 1 the position, and any
//! further fields are kept verbatim but not interpreted.

use spectroplot_core::{Position3, ProtocolError};

/// Parsed work position components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkPosition {
    /// X position in work coordinates
    pub x: f64,
    /// Y position in work coordinates
    pub y: f64,
    /// Z position in work coordinates
    pub z: f64,
}

impl WorkPosition {
    /// Parse work position from a `x,y,z` string
    ///
    /// Every component must be a finite number; extra axes are ignored.
    pub fn parse(pos_str: &str) -> Result<Self, String> {
        let coords = pos_str
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("invalid coordinate '{}'", s.trim()))
            })
            .collect::<Result<Vec<f64>, String>>()?;

        if coords.len() < 3 {
            return Err(format!("expected 3 coordinates, found {}", coords.len()));
        }

        Ok(Self {
            x: coords[0],
            y: coords[1],
            z: coords[2],
        })
    }
}

impl From<WorkPosition> for Position3 {
    fn from(pos: WorkPosition) -> Self {
        Position3::new(pos.x, pos.y, pos.z)
    }
}

/// Complete parsed status frame
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFrame {
    /// Machine state (Idle, Run, Hold, Alarm, ...)
    pub state: String,
    /// Reported position
    pub position: Position3,
    /// Fields after the position, unparsed
    pub extra_fields: Vec<String>,
}

impl StatusFrame {
    /// Value of an extra field such as `FS:` or `Bf:`
    pub fn field(&self, prefix: &str) -> Option<&str> {
        self.extra_fields
            .iter()
            .find_map(|field| field.strip_prefix(prefix))
    }
}

/// Status frame parser
pub struct StatusParser;

impl StatusParser {
    /// Whether a line is bracketed like a status frame
    pub fn is_status_frame(line: &str) -> bool {
        let line = line.trim_end_matches(['\r', '\n']);
        line.len() >= 2 && line.starts_with('<') && line.ends_with('>')
    }

    /// Parse a complete status frame.
    ///
    /// The position field is expected as `WPos:x,y,z`; `MPos:` is accepted
    /// as well for controllers configured to report machine coordinates.
    pub fn parse_frame(line: &str) -> Result<StatusFrame, ProtocolError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let fail = |reason: String| ProtocolError::FrameParse {
            frame: trimmed.to_string(),
            reason,
        };

        if !Self::is_status_frame(trimmed) {
            return Err(fail("not enclosed in '<' and '>'".to_string()));
        }

        let body = &trimmed[1..trimmed.len() - 1];
        let fields: Vec<&str> = body.split('|').collect();
        if fields.len() < 2 {
            return Err(fail(format!(
                "expected at least 2 '|' separated fields, found {}",
                fields.len()
            )));
        }

        let state = fields[0].trim();
        if state.is_empty() {
            return Err(fail("empty state token".to_string()));
        }

        let (label, coords) = fields[1]
            .split_once(':')
            .ok_or_else(|| fail(format!("position field '{}' has no ':'", fields[1])))?;
        if label != "WPos" && label != "MPos" {
            return Err(fail(format!("unexpected position field '{}'", label)));
        }
        let position = WorkPosition::parse(coords).map_err(fail)?;

        Ok(StatusFrame {
            state: state.to_string(),
            position: position.into(),
            extra_fields: fields[2..].iter().map(|f| f.to_string()).collect(),
        })
    }
}
