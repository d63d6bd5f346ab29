use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

pub type MidiByte = i16;
pub type Ticks = i32;

pub const MAX_MIDI_VALUE: MidiByte = 127;
pub const NOTES_PER_OCTAVE: MidiByte = 12;
pub const USIZE_NOTES_PER_OCTAVE: usize = NOTES_PER_OCTAVE as usize;

/// One measure of accompaniment, in the engine's tick unit.
pub const MEASURE_TICKS: Ticks = 960;
pub const QUARTER_TICKS: Ticks = MEASURE_TICKS / 4;

pub const DEFAULT_VELOCITY: MidiByte = 80;
pub const DEFAULT_SPEED: MidiByte = 120;

/// A single scheduled note: absolute pitch, start tick measured from the
/// beginning of the progression, duration in ticks, velocity, and the playback
/// speed the scheduler should apply to it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Note {
    pitch: MidiByte,
    tick: Ticks,
    duration: Ticks,
    velocity: MidiByte,
    speed: MidiByte,
}

impl Note {
    pub fn new(pitch: MidiByte, tick: Ticks, duration: Ticks, velocity: MidiByte) -> Self {
        // The MIDI conversions truncate to u8; reject bad pitches here
        // rather than aliasing them to the wrong note.
        debug_assert!(
            (0..=MAX_MIDI_VALUE).contains(&pitch),
            "pitch {pitch} is not a MIDI pitch"
        );
        Note {
            pitch,
            tick,
            duration,
            velocity,
            speed: DEFAULT_SPEED,
        }
    }

    pub fn pitch(&self) -> MidiByte {
        self.pitch
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    pub fn velocity(&self) -> MidiByte {
        self.velocity
    }

    pub fn speed(&self) -> MidiByte {
        self.speed
    }

    /// Silent notes are scheduled but inaudible; Free mode uses them as
    /// placeholders until a tap rewrites them.
    pub fn is_silent(&self) -> bool {
        self.velocity == 0
    }

    pub fn end_tick(&self) -> Ticks {
        self.tick + self.duration
    }

    pub(crate) fn set_pitch(&mut self, pitch: MidiByte) {
        self.pitch = pitch;
    }

    pub(crate) fn set_tick(&mut self, tick: Ticks) {
        self.tick = tick;
    }

    pub(crate) fn set_duration(&mut self, duration: Ticks) {
        self.duration = duration;
    }

    pub(crate) fn set_velocity(&mut self, velocity: MidiByte) {
        self.velocity = velocity;
    }

    pub(crate) fn set_speed(&mut self, speed: MidiByte) {
        self.speed = speed;
    }

    pub fn to_midi_on(&self) -> MidiMsg {
        MidiMsg::ChannelVoice {
            channel: Channel::Ch1,
            msg: ChannelVoiceMsg::NoteOn {
                note: self.pitch as u8,
                velocity: self.velocity as u8,
            },
        }
    }

    pub fn to_midi_off(&self) -> MidiMsg {
        MidiMsg::ChannelVoice {
            channel: Channel::Ch1,
            msg: ChannelVoiceMsg::NoteOff {
                note: self.pitch as u8,
                velocity: 0,
            },
        }
    }
}

/// A playback position: which measure is sounding and how far into it we are.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MusicTime {
    pub measure: usize,
    pub tick: Ticks,
}

impl MusicTime {
    pub fn new(measure: usize, tick: Ticks) -> Self {
        MusicTime { measure, tick }
    }

    pub fn start() -> Self {
        MusicTime {
            measure: 0,
            tick: 0,
        }
    }

    pub fn from_ticks(total: Ticks) -> Self {
        MusicTime {
            measure: (total / MEASURE_TICKS) as usize,
            tick: total % MEASURE_TICKS,
        }
    }

    pub fn to_ticks(&self) -> Ticks {
        self.measure as Ticks * MEASURE_TICKS + self.tick
    }
}
