//! The 27-cell directional sector lattice.
//!
//! Space around an oriented box divides into a 3×3×3 grid of sectors.  A
//! [`BBoxSector`] encodes one cell as a bit-set: at most one flag per axis
//! pair (`AHEAD`/`BEHIND`, `LEFT`/`RIGHT`, `OVER`/`UNDER`), or the single
//! `INSIDE` flag for the centre cell.  That yields exactly 27 legal
//! combinations.
//!
//! Each cell has a canonical short label built from the letters
//! `a b l r o u` in the fixed order ahead/behind → left/right → over/under
//! (`"al"`, `"alo"`, …); the centre cell is `"i"`.  These labels double as
//! the sectoriality predicates of the relation taxonomy.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Directional sector flags.
    ///
    /// Legal values set at most one flag of each opposing pair, or `INSIDE`
    /// alone.  [`BBoxSector::is_valid`] checks this.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BBoxSector: u8 {
        const INSIDE = 1 << 0;
        const AHEAD  = 1 << 1;
        const BEHIND = 1 << 2;
        const LEFT   = 1 << 3;
        const RIGHT  = 1 << 4;
        const OVER   = 1 << 5;
        const UNDER  = 1 << 6;
    }
}

impl BBoxSector {
    /// Number of axes on which this sector diverges from the centre:
    /// `0` for `INSIDE`, otherwise the count of set direction flags (1–3).
    pub fn divergence(self) -> u32 {
        if self.contains(Self::INSIDE) {
            0
        } else {
            self.bits().count_ones()
        }
    }

    pub fn is_inside(self) -> bool {
        self.contains(Self::INSIDE)
    }

    /// True when the sector diverges on the vertical axis only.
    pub fn is_vertical(self) -> bool {
        self.divergence() == 1 && self.intersects(Self::OVER | Self::UNDER)
    }

    /// Mirror every direction flag (`INSIDE` is its own opposite).
    pub fn opposite(self) -> Self {
        let mut out = Self::empty();
        if self.contains(Self::INSIDE) {
            out |= Self::INSIDE;
        }
        for (flag, counter) in [
            (Self::AHEAD, Self::BEHIND),
            (Self::BEHIND, Self::AHEAD),
            (Self::LEFT, Self::RIGHT),
            (Self::RIGHT, Self::LEFT),
            (Self::OVER, Self::UNDER),
            (Self::UNDER, Self::OVER),
        ] {
            if self.contains(flag) {
                out |= counter;
            }
        }
        out
    }

    /// At most one flag per opposing pair, and `INSIDE` only alone.
    pub fn is_valid(self) -> bool {
        if self.contains(Self::INSIDE) {
            return self == Self::INSIDE;
        }
        !(self.contains(Self::AHEAD | Self::BEHIND)
            || self.contains(Self::LEFT | Self::RIGHT)
            || self.contains(Self::OVER | Self::UNDER))
    }

    /// Canonical short label (`"i"`, `"a"`, `"al"`, `"alo"`, …).  The empty
    /// sector renders as `""` and is not a legal cell.
    pub fn label(self) -> String {
        if self.contains(Self::INSIDE) {
            return "i".to_string();
        }
        let mut s = String::with_capacity(3);
        if self.contains(Self::AHEAD) {
            s.push('a');
        } else if self.contains(Self::BEHIND) {
            s.push('b');
        }
        if self.contains(Self::LEFT) {
            s.push('l');
        } else if self.contains(Self::RIGHT) {
            s.push('r');
        }
        if self.contains(Self::OVER) {
            s.push('o');
        } else if self.contains(Self::UNDER) {
            s.push('u');
        }
        s
    }

    /// Parse a canonical label.  Returns `None` for anything that is not
    /// one of the 27 cells (including letter repetitions and conflicts).
    pub fn from_label(label: &str) -> Option<Self> {
        if label == "i" {
            return Some(Self::INSIDE);
        }
        if label.is_empty() {
            return None;
        }
        let mut sector = Self::empty();
        for c in label.chars() {
            let flag = match c {
                'a' => Self::AHEAD,
                'b' => Self::BEHIND,
                'l' => Self::LEFT,
                'r' => Self::RIGHT,
                'o' => Self::OVER,
                'u' => Self::UNDER,
                _ => return None,
            };
            if sector.contains(flag) {
                return None;
            }
            sector |= flag;
        }
        if sector.is_valid() && sector.label() == label {
            Some(sector)
        } else {
            None
        }
    }

    /// All 27 legal cells, centre first.
    pub fn all_cells() -> Vec<Self> {
        let mut cells = vec![Self::INSIDE];
        let depth = [Self::empty(), Self::AHEAD, Self::BEHIND];
        let side = [Self::empty(), Self::LEFT, Self::RIGHT];
        let vert = [Self::empty(), Self::OVER, Self::UNDER];
        for d in depth {
            for s in side {
                for v in vert {
                    let cell = d | s | v;
                    if !cell.is_empty() {
                        cells.push(cell);
                    }
                }
            }
        }
        cells
    }
}

impl fmt::Display for BBoxSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
