use ordered_float::OrderedFloat;

use crate::error::EngineError;
use crate::notes::{
    MidiByte, Note, Ticks, DEFAULT_SPEED, DEFAULT_VELOCITY, MEASURE_TICKS, NOTES_PER_OCTAVE,
    QUARTER_TICKS,
};
use crate::parser::{ChordQuality, PitchClass};
use crate::pattern::{generate, PlayMode};
use crate::voicing::{bass_pitch, build_elements, checked_pitch};

/// The 0-127 pitch space is bucketed into 32 bands of 4 semitones; the band
/// holding a chord's average pitch is what the performer steers.
pub const NUM_PIVOT_BANDS: i32 = 32;
pub const PIVOT_BAND_WIDTH: f64 = 4.0;

/// One chord of the progression: the canonical voicing (`elements`), the bass
/// note, and the note pattern generated from the voicing for one play mode.
/// The elements are the single source of truth: inversions and tonality
/// nudges land there first and are written through to the pattern, so a mode
/// switch can regenerate the pattern without losing them.
#[derive(Debug, Clone)]
pub struct Chord {
    root: PitchClass,
    quality: ChordQuality,
    elements: Vec<MidiByte>,
    bass: Note,
    start: Ticks,
    duration: Ticks,
    pivot: OrderedFloat<f64>,
    pivot_band: i32,
    inversions: i32,
    mode: PlayMode,
    notes: Vec<Note>,
    sources: Vec<usize>,
}

fn band_for(pivot: f64) -> i32 {
    ((pivot / PIVOT_BAND_WIDTH).floor() as i32).clamp(0, NUM_PIVOT_BANDS - 1)
}

impl Chord {
    pub fn new(
        root: PitchClass,
        quality: ChordQuality,
        start: Ticks,
        mode: PlayMode,
    ) -> Result<Self, EngineError> {
        let elements = build_elements(root, quality)?;
        let bass = Note::new(bass_pitch(root)?, start, MEASURE_TICKS, DEFAULT_VELOCITY);
        let pattern = generate(&elements, start, mode);
        let pivot = elements.iter().map(|p| *p as f64).sum::<f64>() / elements.len() as f64;
        Ok(Chord {
            root,
            quality,
            elements,
            bass,
            start,
            duration: pattern.total_duration,
            pivot: OrderedFloat(pivot),
            pivot_band: band_for(pivot),
            inversions: 0,
            mode,
            notes: pattern.notes,
            sources: pattern.sources,
        })
    }

    pub fn root(&self) -> PitchClass {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn elements(&self) -> &[MidiByte] {
        &self.elements
    }

    pub fn bass(&self) -> &Note {
        &self.bass
    }

    pub fn start(&self) -> Ticks {
        self.start
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    pub fn pivot(&self) -> f64 {
        self.pivot.into_inner()
    }

    pub fn pivot_band(&self) -> i32 {
        self.pivot_band
    }

    pub fn inversions(&self) -> i32 {
        self.inversions
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Throw away the current pattern and regenerate it from the elements.
    /// Any inversions or nudges live in the elements and carry over; any
    /// pending free-tap timing does not.
    pub fn set_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
        let pattern = generate(&self.elements, self.start, mode);
        self.notes = pattern.notes;
        self.sources = pattern.sources;
        self.duration = pattern.total_duration;
        self.check_cardinality();
    }

    /// Invert the voicing in place: `times > 0` raises the lowest voice an
    /// octave per step, `times < 0` drops the highest voice. Ties go to the
    /// first occurrence, and every pattern note generated from the moved
    /// voice shifts with it. Atomic: if any step would leave the keyboard,
    /// nothing changes.
    pub fn turn(&mut self, times: i32) -> Result<(), EngineError> {
        if times == 0 {
            return Ok(());
        }
        let mut turned = self.elements.clone();
        for _ in 0..times.abs() {
            let target = if times > 0 {
                extremum_index(&turned, |a, b| a < b)
            } else {
                extremum_index(&turned, |a, b| a > b)
            };
            let shift = if times > 0 {
                NOTES_PER_OCTAVE
            } else {
                -NOTES_PER_OCTAVE
            };
            turned[target] = checked_pitch(turned[target] + shift)?;
        }
        self.elements = turned;
        self.write_through();
        // Running update, never a recomputed mean; exact for triads,
        // slightly high for four-note chords.
        self.pivot += times as f64 * PIVOT_BAND_WIDTH;
        self.pivot_band = band_for(self.pivot.into_inner());
        self.inversions += times;
        self.check_cardinality();
        Ok(())
    }

    /// Move one voice by `delta` semitones (the tonality flip's ±1), in the
    /// elements and in every pattern note that voice produced.
    pub fn nudge_voice(&mut self, voice: usize, delta: MidiByte) -> Result<(), EngineError> {
        let nudged = checked_pitch(self.elements[voice] + delta)?;
        self.elements[voice] = nudged;
        self.write_through();
        self.pivot += delta as f64 / self.elements.len() as f64;
        self.pivot_band = band_for(self.pivot.into_inner());
        self.check_cardinality();
        Ok(())
    }

    /// Rewrite the pattern for a live tap: every note restarts just after the
    /// given tick within this chord's measure, audible, a quarter long.
    pub fn set_on_note(&mut self, tick_in_measure: Ticks) {
        for note in self.notes.iter_mut() {
            note.set_tick(self.start + tick_in_measure + 1);
            note.set_velocity(DEFAULT_VELOCITY);
            note.set_duration(QUARTER_TICKS);
            note.set_speed(DEFAULT_SPEED);
        }
    }

    fn write_through(&mut self) {
        for (note, source) in self.notes.iter_mut().zip(self.sources.iter()) {
            note.set_pitch(self.elements[*source]);
        }
    }

    fn check_cardinality(&self) {
        assert_eq!(
            self.elements.len(),
            self.quality.chord_size(),
            "voicing lost a voice: {:?}",
            self.elements
        );
    }
}

fn extremum_index(pitches: &[MidiByte], better: impl Fn(MidiByte, MidiByte) -> bool) -> usize {
    let mut best = 0;
    for (i, pitch) in pitches.iter().enumerate().skip(1) {
        if better(*pitch, pitches[best]) {
            best = i;
        }
    }
    best
}
