use bare_metal_modulo::MNum;

use crate::error::EngineError;
use crate::notes::{MidiByte, MAX_MIDI_VALUE};
use crate::parser::{ChordQuality, PitchClass};

/// Roots are anchored in the middle-C octave; only the intervals between the
/// voices matter to the rest of the engine.
pub const ROOT_BASE_PITCH: MidiByte = 60;

/// The bass doubles the root two octaves down.
pub const BASS_OCTAVE_DROP: MidiByte = 24;

impl ChordQuality {
    /// Semitone offsets of each voice from the root, in ascending order.
    pub fn intervals(&self) -> &'static [MidiByte] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Sixth => &[0, 4, 7, 9],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Suspended => &[0, 5, 7],
            ChordQuality::Augmented => &[0, 4, 8],
        }
    }

    /// 3 for triads, 4 for sixth and seventh chords.
    pub fn chord_size(&self) -> usize {
        self.intervals().len()
    }
}

pub fn root_pitch(root: PitchClass) -> MidiByte {
    ROOT_BASE_PITCH + root.a() as MidiByte
}

/// Reject any pitch a transposition or inversion pushed off the keyboard.
pub fn checked_pitch(pitch: MidiByte) -> Result<MidiByte, EngineError> {
    if (0..=MAX_MIDI_VALUE).contains(&pitch) {
        Ok(pitch)
    } else {
        Err(EngineError::PitchOutOfRange { pitch })
    }
}

/// Expand (root, quality) into the chord's constituent pitches, root first.
pub fn build_elements(
    root: PitchClass,
    quality: ChordQuality,
) -> Result<Vec<MidiByte>, EngineError> {
    let root_pitch = root_pitch(root);
    quality
        .intervals()
        .iter()
        .map(|interval| checked_pitch(root_pitch + interval))
        .collect()
}

/// The bass pitch that accompanies the chord, independent of its elements.
pub fn bass_pitch(root: PitchClass) -> Result<MidiByte, EngineError> {
    checked_pitch(root_pitch(root) - BASS_OCTAVE_DROP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bare_metal_modulo::ModNumC;
    use enum_iterator::all;

    #[test]
    fn test_c_major_elements() {
        let elements = build_elements(ModNumC::new(0), ChordQuality::Major).unwrap();
        assert_eq!(elements, vec![60, 64, 67]);
        assert_eq!(bass_pitch(ModNumC::new(0)).unwrap(), 36);
    }

    #[test]
    fn test_minor_family_has_minor_third() {
        for quality in [
            ChordQuality::Minor,
            ChordQuality::Minor6,
            ChordQuality::Minor7,
            ChordQuality::HalfDiminished7,
            ChordQuality::Diminished,
        ] {
            assert_eq!(quality.intervals()[1], 3);
        }
    }

    #[test]
    fn test_cardinality() {
        for quality in all::<ChordQuality>() {
            let expected = match quality {
                ChordQuality::Major
                | ChordQuality::Minor
                | ChordQuality::Diminished
                | ChordQuality::Suspended
                | ChordQuality::Augmented => 3,
                _ => 4,
            };
            assert_eq!(quality.chord_size(), expected);
            for pc in 0..12 {
                let elements = build_elements(ModNumC::new(pc), quality).unwrap();
                assert_eq!(elements.len(), expected);
                assert_eq!(elements[0], 60 + pc as MidiByte);
            }
        }
    }

    #[test]
    fn test_checked_pitch_bounds() {
        assert_eq!(checked_pitch(0), Ok(0));
        assert_eq!(checked_pitch(127), Ok(127));
        assert_eq!(
            checked_pitch(128),
            Err(EngineError::PitchOutOfRange { pitch: 128 })
        );
        assert_eq!(
            checked_pitch(-1),
            Err(EngineError::PitchOutOfRange { pitch: -1 })
        );
    }
}
