//! Background cue playback.
//!
//! A worker thread owns the tone output and plays note lists sent over a
//! channel, so the control loop never blocks on audio. A new `play` or a
//! `stop` interrupts whatever is sounding at the next note boundary or
//! sooner, since the worker waits on the channel for each note's length.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use rover_traits::{HalResult, Melody, Pitch, PlayMode, Sounder};

use crate::error::{HwError, Result};

/// Something that can hold a single tone (or silence).
pub trait ToneOutput: Send + 'static {
    /// Start sounding `pitch`, or go quiet on `None`.
    fn sound(&mut self, pitch: Option<Pitch>) -> Result<()>;
}

/// Tone output for the simulator: every note goes to the log.
#[derive(Debug, Default)]
pub struct LogTone;

impl ToneOutput for LogTone {
    fn sound(&mut self, pitch: Option<Pitch>) -> Result<()> {
        match pitch {
            Some(p) => tracing::debug!(note = %p, hz = p.frequency_hz(), "tone"),
            None => tracing::trace!("tone off"),
        }
        Ok(())
    }
}

enum Msg {
    Play {
        notes: Vec<(Option<Pitch>, Duration)>,
        looped: bool,
    },
    Stop,
}

/// [`Sounder`] backed by a buzzer worker thread.
///
/// Dropping it closes the channel, silences the output and joins the
/// worker.
pub struct BuzzerSounder {
    tx: Option<Sender<Msg>>,
    handle: Option<JoinHandle<()>>,
    tempo_bpm: u32,
}

impl BuzzerSounder {
    pub fn spawn(out: impl ToneOutput, tempo_bpm: u32) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("buzzer".into())
            .spawn(move || run_worker(out, &rx))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            tempo_bpm,
        })
    }

    fn send(&self, msg: Msg) -> Result<()> {
        self.tx
            .as_ref()
            .ok_or(HwError::WorkerGone)?
            .send(msg)
            .map_err(|_| HwError::WorkerGone)
    }
}

impl Sounder for BuzzerSounder {
    fn play(&mut self, melody: &Melody, mode: PlayMode) -> HalResult<()> {
        let notes: Vec<_> = melody
            .notes()
            .iter()
            .map(|n| (n.pitch, n.duration(self.tempo_bpm)))
            .collect();
        // A loop with no audible length would spin the worker.
        let looped = mode == PlayMode::Loop && melody.duration(self.tempo_bpm) > Duration::ZERO;
        self.send(Msg::Play { notes, looped })?;
        Ok(())
    }

    fn stop(&mut self) -> HalResult<()> {
        self.send(Msg::Stop)?;
        Ok(())
    }
}

impl Drop for BuzzerSounder {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(h) = self.handle.take()
            && h.join().is_err()
        {
            tracing::warn!("buzzer worker panicked");
        }
    }
}

fn quiet(out: &mut impl ToneOutput) {
    if let Err(e) = out.sound(None) {
        tracing::warn!(error = %e, "tone off failed");
    }
}

/// Outcome of playing one pass of a note list.
enum Pass {
    Finished,
    Interrupted(Msg),
    Closed,
}

fn play_pass(out: &mut impl ToneOutput, notes: &[(Option<Pitch>, Duration)], rx: &Receiver<Msg>) -> Pass {
    for &(pitch, len) in notes {
        if let Err(e) = out.sound(pitch) {
            tracing::warn!(error = %e, "tone failed");
        }
        match rx.recv_timeout(len) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(msg) => return Pass::Interrupted(msg),
            Err(RecvTimeoutError::Disconnected) => return Pass::Closed,
        }
    }
    Pass::Finished
}

fn run_worker(mut out: impl ToneOutput, rx: &Receiver<Msg>) {
    let mut next = None;
    loop {
        let msg = match next.take() {
            Some(m) => m,
            None => match rx.recv() {
                Ok(m) => m,
                Err(_) => break,
            },
        };
        let Msg::Play { notes, looped } = msg else {
            quiet(&mut out);
            continue;
        };
        loop {
            match play_pass(&mut out, &notes, rx) {
                Pass::Finished if looped => continue,
                Pass::Finished => break,
                Pass::Interrupted(m) => {
                    next = Some(m);
                    break;
                }
                Pass::Closed => {
                    quiet(&mut out);
                    return;
                }
            }
        }
        quiet(&mut out);
    }
    tracing::debug!("buzzer worker exiting");
}
