use std::array;

use bare_metal_modulo::{MNum, ModNumC};
use enum_iterator::all;
use log::{debug, warn};

use crate::chord::Chord;
use crate::error::EngineError;
use crate::notes::{MidiByte, MusicTime, Note, Ticks, USIZE_NOTES_PER_OCTAVE};
use crate::parser::{parse, PitchClass};
use crate::pattern::PlayMode;

pub const NUM_MODES: usize = 5;

/// Scale degrees I-VII as semitone offsets from the key note.
const DIATONIC_OFFSETS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Which voice the tonality flip moves for a chord rooted `offset` semitones
/// above the key note. Degrees I and IV move their second voice, II and VI
/// their third; III, V, VII and non-diatonic roots are left alone.
fn flip_voice_for(offset: usize) -> Option<usize> {
    match DIATONIC_OFFSETS.iter().position(|d| *d == offset)? {
        0 | 3 => Some(1),
        1 | 5 => Some(2),
        _ => None,
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tonality {
    Major,
    Minor,
}

/// Everything the engine needs up front, built explicitly by the caller; the
/// engine keeps no process-wide state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chord_symbols: Vec<String>,
    pub key_note: PitchClass,
    pub tonality: Tonality,
}

impl EngineConfig {
    pub fn new(chord_symbols: &[&str], key_note: usize) -> Self {
        EngineConfig {
            chord_symbols: chord_symbols.iter().map(|s| s.to_string()).collect(),
            key_note: ModNumC::new(key_note),
            tonality: Tonality::Major,
        }
    }
}

/// The progression: one chord track per play mode, all derived from the same
/// symbol sequence, mutated in place for the lifetime of a session. The
/// engine owns every chord; schedulers get owned snapshots, never references
/// into the tracks.
#[derive(Debug)]
pub struct ProgressionEngine {
    tracks: [Vec<Chord>; NUM_MODES],
    key_note: PitchClass,
    tonality: Tonality,
    active_mode: PlayMode,
    length: usize,
}

impl ProgressionEngine {
    /// Build every mode's track from the symbol sequence. Aborts on the
    /// first symbol that fails to parse; callers that prefer to skip bad
    /// entries can filter with `parser::parse` beforehand.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut tracks: [Vec<Chord>; NUM_MODES] = array::from_fn(|_| Vec::new());
        for mode in all::<PlayMode>() {
            let mut start: Ticks = 0;
            for symbol in config.chord_symbols.iter() {
                let (root, quality) = parse(symbol)?;
                let chord = Chord::new(root, quality, start, mode)?;
                start += chord.duration();
                tracks[mode as usize].push(chord);
            }
        }
        Ok(ProgressionEngine {
            tracks,
            key_note: config.key_note,
            tonality: config.tonality,
            active_mode: PlayMode::Sustained,
            length: config.chord_symbols.len(),
        })
    }

    /// Number of measures in the progression.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn tonality(&self) -> Tonality {
        self.tonality
    }

    pub fn active_mode(&self) -> PlayMode {
        self.active_mode
    }

    pub fn chords(&self, mode: PlayMode) -> &[Chord] {
        &self.tracks[mode as usize]
    }

    /// Steer every chord from `from_measure` onward into the target pivot
    /// band by turning it the difference. Chords already played stay put.
    pub fn set_range(
        &mut self,
        target_band: i32,
        from_measure: usize,
        mode: PlayMode,
    ) -> Result<(), EngineError> {
        if !self.guard_measure(from_measure, "set_range") {
            return Ok(());
        }
        for chord in self.tracks[mode as usize][from_measure..].iter_mut() {
            chord.turn(target_band - chord.pivot_band())?;
        }
        Ok(())
    }

    /// Recolor the progression toward major from `from_measure` onward, in
    /// every mode's track. A no-op unless the tonality actually changes.
    pub fn turn_major(&mut self, from_measure: usize) -> Result<(), EngineError> {
        self.flip(Tonality::Major, from_measure)
    }

    /// Recolor the progression toward minor from `from_measure` onward.
    pub fn turn_minor(&mut self, from_measure: usize) -> Result<(), EngineError> {
        self.flip(Tonality::Minor, from_measure)
    }

    fn flip(&mut self, target: Tonality, from_measure: usize) -> Result<(), EngineError> {
        if self.tonality == target {
            debug!("tonality is already {target:?}, ignoring flip");
            return Ok(());
        }
        if !self.guard_measure(from_measure, "tonality flip") {
            return Ok(());
        }
        let delta: MidiByte = match target {
            Tonality::Major => 1,
            Tonality::Minor => -1,
        };
        let key = self.key_note.a();
        for track in self.tracks.iter_mut() {
            for chord in track[from_measure..].iter_mut() {
                let offset =
                    (chord.root().a() + USIZE_NOTES_PER_OCTAVE - key) % USIZE_NOTES_PER_OCTAVE;
                if let Some(voice) = flip_voice_for(offset) {
                    chord.nudge_voice(voice, delta)?;
                }
            }
        }
        self.tonality = target;
        Ok(())
    }

    /// Sound the Free-mode chord under the current playback position once:
    /// its silent pattern is rewritten to start right after the tap.
    pub fn set_on_note(&mut self, position: MusicTime) -> Result<(), EngineError> {
        if !self.guard_measure(position.measure, "set_on_note") {
            return Ok(());
        }
        self.tracks[PlayMode::Free as usize][position.measure].set_on_note(position.tick);
        Ok(())
    }

    /// Hand the scheduler a different mode's track. Pure handoff; no chord
    /// data changes.
    pub fn exchange_track(&mut self, mode: PlayMode) {
        self.active_mode = mode;
    }

    /// A time-ordered copy of one mode's full track, bass notes included.
    /// Copy-on-read is the concurrency discipline here: a scheduler thread
    /// never sees a note list the engine is mutating.
    pub fn snapshot(&self, mode: PlayMode) -> Vec<Note> {
        let mut notes = Vec::new();
        for chord in self.tracks[mode as usize].iter() {
            notes.push(*chord.bass());
            notes.extend(chord.notes().iter().copied());
        }
        notes.sort_by_key(|n| n.tick());
        notes
    }

    pub fn active_snapshot(&self) -> Vec<Note> {
        self.snapshot(self.active_mode)
    }

    fn guard_measure(&self, measure: usize, op: &str) -> bool {
        if measure < self.length {
            true
        } else {
            warn!(
                "{op} ignored: {}",
                EngineError::MeasureOutOfRange {
                    measure,
                    length: self.length
                }
            );
            false
        }
    }
}
