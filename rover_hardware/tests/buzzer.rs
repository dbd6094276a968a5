use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rover_hardware::buzzer::{BuzzerSounder, ToneOutput};
use rover_hardware::error::Result;
use rover_traits::{Melody, Note, Pitch, PlayMode, Sounder};

#[derive(Clone, Default)]
struct RecordingTone(Arc<Mutex<Vec<Option<Pitch>>>>);

impl ToneOutput for RecordingTone {
    fn sound(&mut self, pitch: Option<Pitch>) -> Result<()> {
        self.0.lock().unwrap().push(pitch);
        Ok(())
    }
}

fn pitch(s: &str) -> Option<Pitch> {
    s.parse::<Note>().unwrap().pitch
}

// 6000 bpm: 10 ms per beat.
const FAST: u32 = 6000;

#[test]
fn once_plays_every_note_then_goes_quiet() {
    let tone = RecordingTone::default();
    let mut s = BuzzerSounder::spawn(tone.clone(), FAST).unwrap();
    let m: Melody = "C5:1 E5:1".parse().unwrap();
    s.play(&m, PlayMode::Once).unwrap();
    thread::sleep(Duration::from_millis(150));
    drop(s);

    let got = tone.0.lock().unwrap().clone();
    assert_eq!(got, vec![pitch("C5"), pitch("E5"), None]);
}

#[test]
fn stop_interrupts_a_loop() {
    let tone = RecordingTone::default();
    let mut s = BuzzerSounder::spawn(tone.clone(), FAST).unwrap();
    let m: Melody = "C6:50 R:50".parse().unwrap();
    s.play(&m, PlayMode::Loop).unwrap();
    thread::sleep(Duration::from_millis(30));
    s.stop().unwrap();
    thread::sleep(Duration::from_millis(30));
    let len_after_stop = tone.0.lock().unwrap().len();
    thread::sleep(Duration::from_millis(100));
    drop(s);

    let got = tone.0.lock().unwrap().clone();
    assert_eq!(got.first(), Some(&pitch("C6")));
    assert_eq!(got.last(), Some(&None));
    assert_eq!(got.len(), len_after_stop, "nothing plays after stop");
}

#[test]
fn new_cue_replaces_the_running_one() {
    let tone = RecordingTone::default();
    let mut s = BuzzerSounder::spawn(tone.clone(), FAST).unwrap();
    s.play(&"C3:100".parse().unwrap(), PlayMode::Loop).unwrap();
    thread::sleep(Duration::from_millis(20));
    s.play(&"G5:1".parse().unwrap(), PlayMode::Once).unwrap();
    thread::sleep(Duration::from_millis(80));
    drop(s);

    let got = tone.0.lock().unwrap().clone();
    assert_eq!(got, vec![pitch("C3"), None, pitch("G5"), None]);
}
