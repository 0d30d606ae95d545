//! Open-mode parsing.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// Validated capability set of an open handle.
///
/// Built once from a mode string such as `"r"`, `"w+"` or `"ab"`:
///
/// | token | readable | writable | append | truncate | create |
/// |-------|----------|----------|--------|----------|--------|
/// | `r`   | yes      | no       | no     | no       | no     |
/// | `r+`  | yes      | yes      | no     | no       | no     |
/// | `w`   | no       | yes      | no     | yes      | yes    |
/// | `w+`  | yes      | yes      | no     | yes      | yes    |
/// | `a`   | no       | yes      | yes    | no       | yes    |
/// | `a+`  | yes      | yes      | yes    | no       | yes    |
///
/// A `b` selects binary access, `t` (the default) text access. Characters
/// may come in any order but never twice.
///
/// ```
/// use textio_core::ModeSpec;
///
/// let mode: ModeSpec = "rb+".parse().unwrap();
/// assert!(mode.readable() && mode.writable() && mode.binary());
/// assert!("rw".parse::<ModeSpec>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeSpec {
    readable: bool,
    writable: bool,
    append: bool,
    truncate: bool,
    create: bool,
    binary: bool,
}

impl Default for ModeSpec {
    fn default() -> Self {
        Self {
            readable: true,
            writable: false,
            append: false,
            truncate: false,
            create: false,
            binary: false,
        }
    }
}

impl ModeSpec {
    /// Parses a mode string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` for the empty string, unknown characters,
    /// repeated characters, more or fewer than one of `r`/`w`/`a`, or both
    /// `b` and `t`.
    pub fn parse(mode: &str) -> CoreResult<Self> {
        if mode.is_empty() {
            return Err(CoreError::invalid_mode(mode, "empty mode"));
        }

        let mut base = None;
        let mut plus = false;
        let mut binary = None;

        for c in mode.chars() {
            match c {
                'r' | 'w' | 'a' => match base {
                    Some(prev) if prev == c => {
                        return Err(CoreError::invalid_mode(mode, format!("duplicate '{c}'")));
                    }
                    Some(_) => {
                        return Err(CoreError::invalid_mode(mode, "more than one of r, w, a"));
                    }
                    None => base = Some(c),
                },
                '+' => {
                    if plus {
                        return Err(CoreError::invalid_mode(mode, "duplicate '+'"));
                    }
                    plus = true;
                }
                'b' | 't' => match binary {
                    Some(prev) if prev == (c == 'b') => {
                        return Err(CoreError::invalid_mode(mode, format!("duplicate '{c}'")));
                    }
                    Some(_) => {
                        return Err(CoreError::invalid_mode(mode, "b and t are mutually exclusive"));
                    }
                    None => binary = Some(c == 'b'),
                },
                other => {
                    return Err(CoreError::invalid_mode(
                        mode,
                        format!("unknown character {other:?}"),
                    ));
                }
            }
        }

        let base =
            base.ok_or_else(|| CoreError::invalid_mode(mode, "must contain one of r, w, a"))?;

        Ok(Self {
            readable: base == 'r' || plus,
            writable: base != 'r' || plus,
            append: base == 'a',
            truncate: base == 'w',
            create: base != 'r',
            binary: binary.unwrap_or(false),
        })
    }

    /// Whether reads are permitted.
    #[must_use]
    pub const fn readable(&self) -> bool {
        self.readable
    }

    /// Whether writes are permitted.
    #[must_use]
    pub const fn writable(&self) -> bool {
        self.writable
    }

    /// Whether every write goes to the end of the stream.
    #[must_use]
    pub const fn append(&self) -> bool {
        self.append
    }

    /// Whether existing content is discarded on open.
    #[must_use]
    pub const fn truncate(&self) -> bool {
        self.truncate
    }

    /// Whether a missing file is created on open.
    #[must_use]
    pub const fn create(&self) -> bool {
        self.create
    }

    /// Whether the handle is byte-oriented.
    #[must_use]
    pub const fn binary(&self) -> bool {
        self.binary
    }

    /// Whether the handle is character-oriented.
    #[must_use]
    pub const fn text(&self) -> bool {
        !self.binary
    }

    /// OS open options matching this mode.
    pub(crate) fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.readable)
            .write(self.writable && !self.append)
            .append(self.append)
            .create(self.create)
            .truncate(self.truncate);
        options
    }
}

impl FromStr for ModeSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Formats the canonical mode string, e.g. `r+` or `ab`.
impl fmt::Display for ModeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = if self.append {
            'a'
        } else if self.truncate {
            'w'
        } else {
            'r'
        };
        write!(f, "{base}")?;
        if self.readable && self.writable {
            f.write_str("+")?;
        }
        if self.binary {
            f.write_str("b")?;
        }
        Ok(())
    }
}
