//! The closed predicate taxonomy.
//!
//! Every relation the engine can infer is one of the named [`Predicate`]s
//! below, organised into nine non-overlapping [`PredicateCategory`]s (plus
//! the 27 sector cells and the reserved geography compass set).  A parallel
//! term table maps each predicate to the words used when rendering a
//! relation for a human reader, and [`Predicate::converse`] gives the
//! mirrored predicate so renderers can avoid emitting both directions of a
//! symmetric pair.
//!
//! Unknown names resolve to [`Predicate::Undefined`] rather than failing, so
//! pipeline expressions referencing a predicate the engine does not know
//! simply never match.

use spacia_geometry::BBoxSector;
use std::fmt;

// ────────────────────────────────────────────────────────────────────────────
// PredicateCategory
// ────────────────────────────────────────────────────────────────────────────

/// Semantic family of a predicate.  Deduction categories toggle whole
/// families at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateCategory {
    Proximity,
    Directionality,
    Adjacency,
    Orientation,
    Topology,
    Connectivity,
    Comparability,
    Similarity,
    Visibility,
    Sectoriality,
    /// Compass directions; reserved, no inference populates these yet.
    Geography,
    Undefined,
}

// ────────────────────────────────────────────────────────────────────────────
// Predicate
// ────────────────────────────────────────────────────────────────────────────

/// A named spatial relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    // proximity
    Near,
    Far,
    // directionality (from the reference object's frame)
    Left,
    Right,
    Ahead,
    Behind,
    Above,
    Below,
    // adjacency
    LeftSide,
    RightSide,
    FrontSide,
    BackSide,
    UpperSide,
    LowerSide,
    Ontop,
    Beneath,
    Touching,
    Meeting,
    Beside,
    // orientation
    Aligned,
    FrontAligned,
    BackAligned,
    LeftAligned,
    RightAligned,
    Opposite,
    Orthogonal,
    // assembly / topology
    Inside,
    Containing,
    Overlapping,
    Crossing,
    Disjoint,
    // connectivity (contacts, once per unordered pair)
    On,
    In,
    By,
    At,
    // comparability
    Bigger,
    Smaller,
    Taller,
    Shorter,
    Longer,
    Wider,
    Thinner,
    Fitting,
    Exceeding,
    // similarity
    SameCenter,
    SamePosition,
    SameWidth,
    SameHeight,
    SameDepth,
    SameLength,
    SamePerimeter,
    SameFootprint,
    SameFront,
    SameSide,
    SameSurface,
    SameVolume,
    SameCuboid,
    Congruent,
    SameShape,
    // visibility / bearing
    EightOClock,
    NineOClock,
    TenOClock,
    ElevenOClock,
    TwelveOClock,
    OneOClock,
    TwoOClock,
    ThreeOClock,
    FourOClock,
    Tangible,
    // sectoriality – one of the 27 cells
    Sector(BBoxSector),
    // geography (reserved)
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
    Undefined,
}

impl Predicate {
    /// The predicate's name as used in pipeline expressions.
    pub fn name(&self) -> String {
        match self {
            Self::Near => "near".into(),
            Self::Far => "far".into(),
            Self::Left => "left".into(),
            Self::Right => "right".into(),
            Self::Ahead => "ahead".into(),
            Self::Behind => "behind".into(),
            Self::Above => "above".into(),
            Self::Below => "below".into(),
            Self::LeftSide => "leftside".into(),
            Self::RightSide => "rightside".into(),
            Self::FrontSide => "frontside".into(),
            Self::BackSide => "backside".into(),
            Self::UpperSide => "upperside".into(),
            Self::LowerSide => "lowerside".into(),
            Self::Ontop => "ontop".into(),
            Self::Beneath => "beneath".into(),
            Self::Touching => "touching".into(),
            Self::Meeting => "meeting".into(),
            Self::Beside => "beside".into(),
            Self::Aligned => "aligned".into(),
            Self::FrontAligned => "frontaligned".into(),
            Self::BackAligned => "backaligned".into(),
            Self::LeftAligned => "leftaligned".into(),
            Self::RightAligned => "rightaligned".into(),
            Self::Opposite => "opposite".into(),
            Self::Orthogonal => "orthogonal".into(),
            Self::Inside => "inside".into(),
            Self::Containing => "containing".into(),
            Self::Overlapping => "overlapping".into(),
            Self::Crossing => "crossing".into(),
            Self::Disjoint => "disjoint".into(),
            Self::On => "on".into(),
            Self::In => "in".into(),
            Self::By => "by".into(),
            Self::At => "at".into(),
            Self::Bigger => "bigger".into(),
            Self::Smaller => "smaller".into(),
            Self::Taller => "taller".into(),
            Self::Shorter => "shorter".into(),
            Self::Longer => "longer".into(),
            Self::Wider => "wider".into(),
            Self::Thinner => "thinner".into(),
            Self::Fitting => "fitting".into(),
            Self::Exceeding => "exceeding".into(),
            Self::SameCenter => "samecenter".into(),
            Self::SamePosition => "sameposition".into(),
            Self::SameWidth => "samewidth".into(),
            Self::SameHeight => "sameheight".into(),
            Self::SameDepth => "samedepth".into(),
            Self::SameLength => "samelength".into(),
            Self::SamePerimeter => "sameperimeter".into(),
            Self::SameFootprint => "samefootprint".into(),
            Self::SameFront => "samefront".into(),
            Self::SameSide => "sameside".into(),
            Self::SameSurface => "samesurface".into(),
            Self::SameVolume => "samevolume".into(),
            Self::SameCuboid => "samecuboid".into(),
            Self::Congruent => "congruent".into(),
            Self::SameShape => "sameshape".into(),
            Self::EightOClock => "eightoclock".into(),
            Self::NineOClock => "nineoclock".into(),
            Self::TenOClock => "tenoclock".into(),
            Self::ElevenOClock => "elevenoclock".into(),
            Self::TwelveOClock => "twelveoclock".into(),
            Self::OneOClock => "oneoclock".into(),
            Self::TwoOClock => "twooclock".into(),
            Self::ThreeOClock => "threeoclock".into(),
            Self::FourOClock => "fouroclock".into(),
            Self::Tangible => "tangible".into(),
            Self::Sector(sector) => sector.label(),
            Self::North => "north".into(),
            Self::South => "south".into(),
            Self::East => "east".into(),
            Self::West => "west".into(),
            Self::NorthEast => "northeast".into(),
            Self::NorthWest => "northwest".into(),
            Self::SouthEast => "southeast".into(),
            Self::SouthWest => "southwest".into(),
            Self::Undefined => "undefined".into(),
        }
    }

    /// Resolve a predicate name; unknown names yield
    /// [`Predicate::Undefined`], never an error.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name {
            "near" => Self::Near,
            "far" => Self::Far,
            "left" => Self::Left,
            "right" => Self::Right,
            "ahead" => Self::Ahead,
            "behind" => Self::Behind,
            "above" | "over" => Self::Above,
            "below" | "under" => Self::Below,
            "leftside" => Self::LeftSide,
            "rightside" => Self::RightSide,
            "frontside" => Self::FrontSide,
            "backside" => Self::BackSide,
            "upperside" => Self::UpperSide,
            "lowerside" => Self::LowerSide,
            "ontop" => Self::Ontop,
            "beneath" => Self::Beneath,
            "touching" => Self::Touching,
            "meeting" => Self::Meeting,
            "beside" => Self::Beside,
            "aligned" => Self::Aligned,
            "frontaligned" => Self::FrontAligned,
            "backaligned" => Self::BackAligned,
            "leftaligned" => Self::LeftAligned,
            "rightaligned" => Self::RightAligned,
            "opposite" => Self::Opposite,
            "orthogonal" => Self::Orthogonal,
            "inside" => Self::Inside,
            "containing" => Self::Containing,
            "overlapping" => Self::Overlapping,
            "crossing" => Self::Crossing,
            "disjoint" => Self::Disjoint,
            "on" => Self::On,
            "in" => Self::In,
            "by" => Self::By,
            "at" => Self::At,
            "bigger" => Self::Bigger,
            "smaller" => Self::Smaller,
            "taller" => Self::Taller,
            "shorter" => Self::Shorter,
            "longer" => Self::Longer,
            "wider" => Self::Wider,
            "thinner" => Self::Thinner,
            "fitting" => Self::Fitting,
            "exceeding" => Self::Exceeding,
            "samecenter" => Self::SameCenter,
            "sameposition" => Self::SamePosition,
            "samewidth" => Self::SameWidth,
            "sameheight" => Self::SameHeight,
            "samedepth" => Self::SameDepth,
            "samelength" => Self::SameLength,
            "sameperimeter" => Self::SamePerimeter,
            "samefootprint" => Self::SameFootprint,
            "samefront" => Self::SameFront,
            "sameside" => Self::SameSide,
            "samesurface" => Self::SameSurface,
            "samevolume" => Self::SameVolume,
            "samecuboid" => Self::SameCuboid,
            "congruent" => Self::Congruent,
            "sameshape" => Self::SameShape,
            "eightoclock" => Self::EightOClock,
            "nineoclock" => Self::NineOClock,
            "tenoclock" => Self::TenOClock,
            "elevenoclock" => Self::ElevenOClock,
            "twelveoclock" => Self::TwelveOClock,
            "oneoclock" => Self::OneOClock,
            "twooclock" => Self::TwoOClock,
            "threeoclock" => Self::ThreeOClock,
            "fouroclock" => Self::FourOClock,
            "tangible" => Self::Tangible,
            "north" => Self::North,
            "south" => Self::South,
            "east" => Self::East,
            "west" => Self::West,
            "northeast" => Self::NorthEast,
            "northwest" => Self::NorthWest,
            "southeast" => Self::SouthEast,
            "southwest" => Self::SouthWest,
            _ => match BBoxSector::from_label(name) {
                Some(sector) => Self::Sector(sector),
                None => Self::Undefined,
            },
        }
    }

    /// The predicate's semantic family.
    pub fn category(&self) -> PredicateCategory {
        use Predicate::*;
        match self {
            Near | Far => PredicateCategory::Proximity,
            Left | Right | Ahead | Behind | Above | Below => PredicateCategory::Directionality,
            LeftSide | RightSide | FrontSide | BackSide | UpperSide | LowerSide | Ontop
            | Beneath | Touching | Meeting | Beside => PredicateCategory::Adjacency,
            Aligned | FrontAligned | BackAligned | LeftAligned | RightAligned | Opposite
            | Orthogonal => PredicateCategory::Orientation,
            Inside | Containing | Overlapping | Crossing | Disjoint => {
                PredicateCategory::Topology
            }
            On | In | By | At => PredicateCategory::Connectivity,
            Bigger | Smaller | Taller | Shorter | Longer | Wider | Thinner | Fitting
            | Exceeding => PredicateCategory::Comparability,
            SameCenter | SamePosition | SameWidth | SameHeight | SameDepth | SameLength
            | SamePerimeter | SameFootprint | SameFront | SameSide | SameSurface
            | SameVolume | SameCuboid | Congruent | SameShape => PredicateCategory::Similarity,
            EightOClock | NineOClock | TenOClock | ElevenOClock | TwelveOClock | OneOClock
            | TwoOClock | ThreeOClock | FourOClock | Tangible => PredicateCategory::Visibility,
            Sector(_) => PredicateCategory::Sectoriality,
            North | South | East | West | NorthEast | NorthWest | SouthEast | SouthWest => {
                PredicateCategory::Geography
            }
            Undefined => PredicateCategory::Undefined,
        }
    }

    /// The mirrored predicate: `A left B` ⇒ `B right A`.  Symmetric
    /// predicates are their own converse.
    pub fn converse(&self) -> Predicate {
        use Predicate::*;
        match self {
            Left => Right,
            Right => Left,
            Ahead => Behind,
            Behind => Ahead,
            Above => Below,
            Below => Above,
            LeftSide => RightSide,
            RightSide => LeftSide,
            FrontSide => BackSide,
            BackSide => FrontSide,
            UpperSide => LowerSide,
            LowerSide => UpperSide,
            Ontop => Beneath,
            Beneath => Ontop,
            Inside => Containing,
            Containing => Inside,
            Bigger => Smaller,
            Smaller => Bigger,
            Taller => Shorter,
            Shorter => Taller,
            Longer => Shorter,
            Wider => Thinner,
            Thinner => Wider,
            Fitting => Exceeding,
            Exceeding => Fitting,
            North => South,
            South => North,
            East => West,
            West => East,
            NorthEast => SouthWest,
            SouthWest => NorthEast,
            NorthWest => SouthEast,
            SouthEast => NorthWest,
            Sector(sector) => Sector(sector.opposite()),
            other => *other,
        }
    }

    /// True when both directions of the relation read the same.
    pub fn is_symmetric(&self) -> bool {
        *self == self.converse()
    }

    /// Words used to render a relation as `subject verb preposition object`.
    pub fn term(&self) -> Term {
        use Predicate::*;
        match self {
            Near => Term::new("is", "near", "close by"),
            Far => Term::new("is", "far from", "distant"),
            Left => Term::new("is", "left of", ""),
            Right => Term::new("is", "right of", ""),
            Ahead => Term::new("is", "ahead of", "in front of"),
            Behind => Term::new("is", "behind", "in back of"),
            Above => Term::new("is", "above", "over"),
            Below => Term::new("is", "below", "under"),
            LeftSide => Term::new("is at the", "left side of", ""),
            RightSide => Term::new("is at the", "right side of", ""),
            FrontSide => Term::new("is at the", "front side of", ""),
            BackSide => Term::new("is at the", "back side of", ""),
            UpperSide => Term::new("is at the", "upper side of", ""),
            LowerSide => Term::new("is at the", "lower side of", ""),
            Ontop => Term::new("is", "on top of", ""),
            Beneath => Term::new("is", "beneath", "underneath"),
            Touching => Term::new("is", "touching", ""),
            Meeting => Term::new("is", "meeting", ""),
            Beside => Term::new("is", "beside", "next to"),
            Aligned => Term::new("is", "aligned with", ""),
            FrontAligned => Term::new("is", "front-aligned with", ""),
            BackAligned => Term::new("is", "back-aligned with", ""),
            LeftAligned => Term::new("is", "left-aligned with", ""),
            RightAligned => Term::new("is", "right-aligned with", ""),
            Opposite => Term::new("is", "opposite to", ""),
            Orthogonal => Term::new("is", "orthogonal to", "perpendicular to"),
            Inside => Term::new("is", "inside", "within"),
            Containing => Term::new("is", "containing", ""),
            Overlapping => Term::new("is", "overlapping", ""),
            Crossing => Term::new("is", "crossing", ""),
            Disjoint => Term::new("is", "disjoint from", "separate from"),
            On => Term::new("is", "on", ""),
            In => Term::new("is", "in", ""),
            By => Term::new("is", "by", ""),
            At => Term::new("is", "at", ""),
            Bigger => Term::new("is", "bigger than", "larger than"),
            Smaller => Term::new("is", "smaller than", ""),
            Taller => Term::new("is", "taller than", ""),
            Shorter => Term::new("is", "shorter than", ""),
            Longer => Term::new("is", "longer than", ""),
            Wider => Term::new("is", "wider than", ""),
            Thinner => Term::new("is", "thinner than", "narrower than"),
            Fitting => Term::new("is", "fitting into", ""),
            Exceeding => Term::new("is", "exceeding", ""),
            SameCenter => Term::new("has the", "same center as", ""),
            SamePosition => Term::new("has the", "same position as", ""),
            SameWidth => Term::new("has the", "same width as", ""),
            SameHeight => Term::new("has the", "same height as", ""),
            SameDepth => Term::new("has the", "same depth as", ""),
            SameLength => Term::new("has the", "same length as", ""),
            SamePerimeter => Term::new("has the", "same perimeter as", ""),
            SameFootprint => Term::new("has the", "same footprint as", ""),
            SameFront => Term::new("has the", "same front face as", ""),
            SameSide => Term::new("has the", "same side face as", ""),
            SameSurface => Term::new("has the", "same surface as", ""),
            SameVolume => Term::new("has the", "same volume as", ""),
            SameCuboid => Term::new("has the", "same cuboid as", "equally sized as"),
            Congruent => Term::new("is", "congruent with", ""),
            SameShape => Term::new("has the", "same shape as", ""),
            EightOClock => Term::new("is at", "8 o'clock of", ""),
            NineOClock => Term::new("is at", "9 o'clock of", ""),
            TenOClock => Term::new("is at", "10 o'clock of", ""),
            ElevenOClock => Term::new("is at", "11 o'clock of", ""),
            TwelveOClock => Term::new("is at", "12 o'clock of", ""),
            OneOClock => Term::new("is at", "1 o'clock of", ""),
            TwoOClock => Term::new("is at", "2 o'clock of", ""),
            ThreeOClock => Term::new("is at", "3 o'clock of", ""),
            FourOClock => Term::new("is at", "4 o'clock of", ""),
            Tangible => Term::new("is", "within reach of", "tangible for"),
            Sector(_) => Term::new("is in sector", "of", ""),
            North => Term::new("is", "north of", ""),
            South => Term::new("is", "south of", ""),
            East => Term::new("is", "east of", ""),
            West => Term::new("is", "west of", ""),
            NorthEast => Term::new("is", "north-east of", ""),
            NorthWest => Term::new("is", "north-west of", ""),
            SouthEast => Term::new("is", "south-east of", ""),
            SouthWest => Term::new("is", "south-west of", ""),
            Undefined => Term::new("relates", "to", ""),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Term table
// ────────────────────────────────────────────────────────────────────────────

/// The words used to render a predicate for a human reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub verb: &'static str,
    pub preposition: &'static str,
    /// Alternative wording; empty when none exists.
    pub synonym: &'static str,
}

impl Term {
    const fn new(verb: &'static str, preposition: &'static str, synonym: &'static str) -> Self {
        Self {
            verb,
            preposition,
            synonym,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parsing ─────────────────────────────────────────────────────────────

    #[test]
    fn parse_and_name_roundtrip() {
        for name in [
            "near", "ontop", "leftside", "samecuboid", "nineoclock", "disjoint", "fitting",
        ] {
            let pred = Predicate::parse(name);
            assert_ne!(pred, Predicate::Undefined, "{name} should be known");
            assert_eq!(pred.name(), name);
        }
    }

    #[test]
    fn parse_sector_labels() {
        assert!(matches!(Predicate::parse("alo"), Predicate::Sector(_)));
        assert!(matches!(Predicate::parse("i"), Predicate::Sector(_)));
        assert_eq!(Predicate::parse("alo").name(), "alo");
    }

    #[test]
    fn unknown_name_is_undefined() {
        assert_eq!(Predicate::parse("hovering"), Predicate::Undefined);
        assert_eq!(Predicate::parse(""), Predicate::Undefined);
    }

    // ── converse & symmetry ─────────────────────────────────────────────────

    #[test]
    fn converse_pairs() {
        assert_eq!(Predicate::Left.converse(), Predicate::Right);
        assert_eq!(Predicate::Ontop.converse(), Predicate::Beneath);
        assert_eq!(Predicate::Inside.converse(), Predicate::Containing);
        assert_eq!(Predicate::Bigger.converse(), Predicate::Smaller);
    }

    #[test]
    fn symmetric_predicates_are_their_own_converse() {
        for pred in [
            Predicate::Near,
            Predicate::Touching,
            Predicate::Aligned,
            Predicate::Disjoint,
            Predicate::SameVolume,
            Predicate::Congruent,
            Predicate::By,
        ] {
            assert!(pred.is_symmetric(), "{pred} should be symmetric");
        }
        assert!(!Predicate::Left.is_symmetric());
        assert!(!Predicate::Containing.is_symmetric());
    }

    #[test]
    fn sector_converse_is_opposite_cell() {
        let pred = Predicate::parse("alo");
        assert_eq!(pred.converse().name(), "bru");
    }

    // ── categories ──────────────────────────────────────────────────────────

    #[test]
    fn category_assignment() {
        assert_eq!(Predicate::Near.category(), PredicateCategory::Proximity);
        assert_eq!(Predicate::Ontop.category(), PredicateCategory::Adjacency);
        assert_eq!(Predicate::On.category(), PredicateCategory::Connectivity);
        assert_eq!(Predicate::Inside.category(), PredicateCategory::Topology);
        assert_eq!(Predicate::SameShape.category(), PredicateCategory::Similarity);
        assert_eq!(Predicate::Tangible.category(), PredicateCategory::Visibility);
        assert_eq!(Predicate::parse("al").category(), PredicateCategory::Sectoriality);
        assert_eq!(Predicate::North.category(), PredicateCategory::Geography);
    }

    // ── term table ──────────────────────────────────────────────────────────

    #[test]
    fn every_predicate_has_a_term() {
        for name in ["near", "ontop", "congruent", "tangible", "north"] {
            let term = Predicate::parse(name).term();
            assert!(!term.verb.is_empty());
            assert!(!term.preposition.is_empty());
        }
    }
}
