use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_queue::SegQueue;
use crossbeam_utils::atomic::AtomicCell;
use midi_msg::MidiMsg;

use crate::notes::{MusicTime, Note, Ticks, QUARTER_TICKS};

pub const DEFAULT_BPM: f64 = 120.0;

/// A note-on or note-off queued for a tick.
#[derive(Clone, Debug)]
struct TimedMsg {
    tick: Ticks,
    on: bool,
    msg: MidiMsg,
}

impl PartialEq for TimedMsg {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick && self.on == other.on
    }
}

impl Eq for TimedMsg {}

impl PartialOrd for TimedMsg {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedMsg {
    /// Reversed so that a max-heap pops the earliest tick first; at equal
    /// ticks, note-offs come out before note-ons so retriggered pitches
    /// release cleanly.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .tick
            .cmp(&self.tick)
            .then(other.on.cmp(&self.on))
    }
}

fn events_for(notes: &[Note]) -> BinaryHeap<TimedMsg> {
    let mut pending = BinaryHeap::new();
    for note in notes.iter().filter(|n| !n.is_silent()) {
        pending.push(TimedMsg {
            tick: note.tick(),
            on: true,
            msg: note.to_midi_on(),
        });
        pending.push(TimedMsg {
            tick: note.end_tick(),
            on: false,
            msg: note.to_midi_off(),
        });
    }
    pending
}

/// Plays a snapshot of a track on its own thread, pushing MIDI messages into
/// a queue for whatever output the surrounding application owns. The engine
/// polls `position()` when servicing live edits.
pub struct TrackPlayer {
    output: Arc<SegQueue<MidiMsg>>,
    position: Arc<AtomicCell<MusicTime>>,
    playing: Arc<AtomicCell<bool>>,
    bpm: f64,
}

impl TrackPlayer {
    pub fn new(output: Arc<SegQueue<MidiMsg>>) -> Self {
        TrackPlayer {
            output,
            position: Arc::new(AtomicCell::new(MusicTime::start())),
            playing: Arc::new(AtomicCell::new(false)),
            bpm: DEFAULT_BPM,
        }
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        assert!(bpm > 0.0);
        self.bpm = bpm;
    }

    pub fn position(&self) -> MusicTime {
        self.position.load()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load()
    }

    pub fn stop(&self) {
        self.playing.store(false);
    }

    /// Schedule a snapshot for playback. Returns immediately; the playback
    /// thread owns the snapshot until it finishes or `stop` is called. With
    /// `looping` the snapshot restarts from tick 0 when it runs out.
    pub fn play(&self, notes: Vec<Note>, looping: bool) {
        if notes.is_empty() {
            return;
        }
        let seconds_per_tick = 60.0 / (self.bpm * QUARTER_TICKS as f64);
        let output = self.output.clone();
        let position = self.position.clone();
        let playing = self.playing.clone();
        playing.store(true);
        thread::spawn(move || {
            loop {
                let mut pending = events_for(&notes);
                let mut at: Ticks = 0;
                position.store(MusicTime::start());
                while let Some(event) = pending.pop() {
                    if !playing.load() {
                        return;
                    }
                    if event.tick > at {
                        let wait = (event.tick - at) as f64 * seconds_per_tick;
                        thread::sleep(Duration::from_secs_f64(wait));
                        at = event.tick;
                        position.store(MusicTime::from_ticks(at));
                    }
                    output.push(event.msg);
                }
                if !looping || !playing.load() {
                    break;
                }
            }
            playing.store(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{DEFAULT_VELOCITY, MEASURE_TICKS};
    use std::time::Instant;

    #[test]
    fn test_event_order() {
        let notes = vec![
            Note::new(64, 0, QUARTER_TICKS, DEFAULT_VELOCITY),
            Note::new(60, 0, MEASURE_TICKS, DEFAULT_VELOCITY),
            Note::new(67, QUARTER_TICKS, QUARTER_TICKS, DEFAULT_VELOCITY),
            Note::new(72, 0, MEASURE_TICKS, 0),
        ];
        let mut pending = events_for(&notes);
        // The silent note contributes nothing.
        assert_eq!(pending.len(), 6);
        let mut last = (Ticks::MIN, false);
        while let Some(event) = pending.pop() {
            assert!(event.tick >= last.0);
            if event.tick == last.0 {
                // Offs drain before ons at the same tick.
                assert!(event.on >= last.1 || !event.on);
            }
            last = (event.tick, event.on);
        }
    }

    #[test]
    fn test_off_before_on_at_same_tick() {
        let notes = vec![
            Note::new(60, 0, QUARTER_TICKS, DEFAULT_VELOCITY),
            Note::new(60, QUARTER_TICKS, QUARTER_TICKS, DEFAULT_VELOCITY),
        ];
        let mut pending = events_for(&notes);
        pending.pop(); // on @ 0
        let second = pending.pop().unwrap();
        assert_eq!(second.tick, QUARTER_TICKS);
        assert!(!second.on);
    }

    #[test]
    fn test_play_drains_to_queue() {
        let output = Arc::new(SegQueue::new());
        let mut player = TrackPlayer::new(output.clone());
        player.set_bpm(960_000.0);
        player.play(vec![Note::new(60, 0, QUARTER_TICKS, DEFAULT_VELOCITY)], false);
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut received = Vec::new();
        while received.len() < 2 && Instant::now() < deadline {
            if let Some(msg) = output.pop() {
                received.push(msg);
            }
        }
        assert_eq!(received.len(), 2);
        let note = Note::new(60, 0, QUARTER_TICKS, DEFAULT_VELOCITY);
        assert_eq!(received[0], note.to_midi_on());
        assert_eq!(received[1], note.to_midi_off());
    }
}
