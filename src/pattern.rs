use enum_iterator::Sequence;

use crate::notes::{MidiByte, Note, Ticks, DEFAULT_VELOCITY, MEASURE_TICKS, QUARTER_TICKS};

/// Echo notes in Delay mode start half a measure late, quieter and shorter.
pub const DELAY_ECHO_OFFSET: Ticks = MEASURE_TICKS / 2;
pub const DELAY_ECHO_VELOCITY: MidiByte = 40;

/// The rhythmic texture a chord's elements are expanded into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Sequence)]
pub enum PlayMode {
    Sustained,
    Quarter,
    Arpeggio,
    Delay,
    Free,
}

impl PlayMode {
    /// How many times the element set is laid out within one measure. The
    /// tonality nudge writes through the elements, so each repetition picks
    /// the change up automatically.
    pub fn repetitions(&self) -> usize {
        match self {
            PlayMode::Quarter => 4,
            PlayMode::Delay => 2,
            PlayMode::Sustained | PlayMode::Arpeggio | PlayMode::Free => 1,
        }
    }
}

/// A generated rhythm: the notes, which element each note came from, and the
/// measure length the chord occupies. `sources[i]` is the index into the
/// chord's element list that produced `notes[i]`; the inversion and nudge
/// operators use it to keep every copy of a voice in step.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Pattern {
    pub notes: Vec<Note>,
    pub sources: Vec<usize>,
    pub total_duration: Ticks,
}

/// Expand a chord's elements into the note pattern for `mode`, starting at
/// `start` ticks from the beginning of the progression. Stateless: the same
/// elements and mode always produce the same pattern.
pub fn generate(elements: &[MidiByte], start: Ticks, mode: PlayMode) -> Pattern {
    assert!(
        elements.len() == 3 || elements.len() == 4,
        "voicing must have 3 or 4 elements, got {}",
        elements.len()
    );
    let mut notes = Vec::new();
    let mut sources = Vec::new();
    match mode {
        PlayMode::Sustained => {
            for (i, pitch) in elements.iter().enumerate() {
                notes.push(Note::new(*pitch, start, MEASURE_TICKS, DEFAULT_VELOCITY));
                sources.push(i);
            }
        }
        PlayMode::Quarter => {
            for beat in 0..4 {
                let tick = start + beat as Ticks * QUARTER_TICKS;
                for (i, pitch) in elements.iter().enumerate() {
                    notes.push(Note::new(*pitch, tick, QUARTER_TICKS, DEFAULT_VELOCITY));
                    sources.push(i);
                }
            }
        }
        PlayMode::Arpeggio => {
            // Always four notes: the first three voices in order, then the
            // seventh if there is one, otherwise the root again.
            let last = if elements.len() == 4 { 3 } else { 0 };
            for (beat, i) in [0, 1, 2, last].into_iter().enumerate() {
                let tick = start + beat as Ticks * QUARTER_TICKS;
                notes.push(Note::new(elements[i], tick, QUARTER_TICKS, DEFAULT_VELOCITY));
                sources.push(i);
            }
        }
        PlayMode::Delay => {
            for (i, pitch) in elements.iter().enumerate() {
                notes.push(Note::new(*pitch, start, MEASURE_TICKS, DEFAULT_VELOCITY));
                sources.push(i);
            }
            for (i, pitch) in elements.iter().enumerate() {
                notes.push(Note::new(
                    *pitch,
                    start + DELAY_ECHO_OFFSET,
                    MEASURE_TICKS - DELAY_ECHO_OFFSET,
                    DELAY_ECHO_VELOCITY,
                ));
                sources.push(i);
            }
        }
        PlayMode::Free => {
            // Same layout as Sustained but silent; set_on_note is the only
            // way these become audible.
            for (i, pitch) in elements.iter().enumerate() {
                notes.push(Note::new(*pitch, start, MEASURE_TICKS, 0));
                sources.push(i);
            }
        }
    }
    Pattern {
        notes,
        sources,
        total_duration: MEASURE_TICKS,
    }
}
