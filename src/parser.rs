use bare_metal_modulo::{MNum, ModNumC};
use enum_iterator::{all, Sequence};

use crate::error::EngineError;
use crate::notes::USIZE_NOTES_PER_OCTAVE;

/// A note name independent of octave, 0 = C through 11 = B.
pub type PitchClass = ModNumC<usize, USIZE_NOTES_PER_OCTAVE>;

/// Canonical (sharp) spelling for each pitch class, used when rendering a
/// chord symbol back to text.
pub const PITCH_CLASS_NAMES: [&str; USIZE_NOTES_PER_OCTAVE] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// Two-character spellings first so that the longest root name wins:
// "C#m7-5" must consume "C#", not "C".
const ROOT_NAMES: [(&str, usize); 17] = [
    ("C#", 1),
    ("Db", 1),
    ("D#", 3),
    ("Eb", 3),
    ("F#", 6),
    ("Gb", 6),
    ("G#", 8),
    ("Ab", 8),
    ("A#", 10),
    ("Bb", 10),
    ("C", 0),
    ("D", 2),
    ("E", 4),
    ("F", 5),
    ("G", 7),
    ("A", 9),
    ("B", 11),
];

/// The closed set of chord structures the accompaniment understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Sequence)]
pub enum ChordQuality {
    Major,
    Sixth,
    Dominant7,
    Major7,
    Minor,
    Minor6,
    Minor7,
    HalfDiminished7,
    Diminished,
    Suspended,
    Augmented,
}

impl ChordQuality {
    /// The symbol suffix that selects this quality after the root name.
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Sixth => "6",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "M7",
            ChordQuality::Minor => "m",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Minor7 => "m7",
            ChordQuality::HalfDiminished7 => "m7-5",
            ChordQuality::Diminished => "dim",
            ChordQuality::Suspended => "sus",
            ChordQuality::Augmented => "aug",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        all::<ChordQuality>().find(|q| q.suffix() == suffix)
    }
}

/// Parse a chord symbol like "Am7" or "F#m7-5" into its root pitch class and
/// quality. The root name is matched longest-first; whatever remains must be
/// one of the known quality suffixes.
pub fn parse(symbol: &str) -> Result<(PitchClass, ChordQuality), EngineError> {
    for (name, pc) in ROOT_NAMES.iter() {
        if let Some(suffix) = symbol.strip_prefix(name) {
            return match ChordQuality::from_suffix(suffix) {
                Some(quality) => Ok((ModNumC::new(*pc), quality)),
                None => Err(EngineError::UnknownChordStructure(suffix.to_string())),
            };
        }
    }
    Err(EngineError::UnknownChordSymbol(symbol.to_string()))
}

/// Render a (root, quality) pair back into the symbol `parse` accepts for it.
pub fn render(root: PitchClass, quality: ChordQuality) -> String {
    format!("{}{}", PITCH_CLASS_NAMES[root.a()], quality.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for pc in 0..USIZE_NOTES_PER_OCTAVE {
            for quality in all::<ChordQuality>() {
                let root = ModNumC::new(pc);
                let symbol = render(root, quality);
                assert_eq!(parse(&symbol).unwrap(), (root, quality));
            }
        }
    }

    #[test]
    fn test_parse_half_diminished() {
        let (root, quality) = parse("F#m7-5").unwrap();
        assert_eq!(root.a(), 6);
        assert_eq!(quality, ChordQuality::HalfDiminished7);
    }

    #[test]
    fn test_flat_spellings() {
        assert_eq!(parse("Db").unwrap(), parse("C#").unwrap());
        assert_eq!(parse("Bbm7").unwrap(), parse("A#m7").unwrap());
        let (root, quality) = parse("Ebdim").unwrap();
        assert_eq!(root.a(), 3);
        assert_eq!(quality, ChordQuality::Diminished);
    }

    #[test]
    fn test_longest_root_wins() {
        let (root, quality) = parse("C#").unwrap();
        assert_eq!(root.a(), 1);
        assert_eq!(quality, ChordQuality::Major);
        let (root, quality) = parse("Cm").unwrap();
        assert_eq!(root.a(), 0);
        assert_eq!(quality, ChordQuality::Minor);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse("H7"),
            Err(EngineError::UnknownChordSymbol("H7".to_string()))
        );
        assert_eq!(
            parse("Cmaj9"),
            Err(EngineError::UnknownChordStructure("maj9".to_string()))
        );
    }
}
