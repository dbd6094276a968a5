//! Audio cue notation shared by the controller and the sounder backends.
//!
//! Melodies use a compact whitespace-separated notation: `C6:3` is the note
//! C in octave 6 held for three beats, `R:1` is a one-beat rest. Sharps and
//! flats are written `C#4` / `Db4`. The beat count defaults to 1 when the
//! `:beats` suffix is omitted.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MelodyParseError {
    #[error("melody is empty")]
    Empty,
    #[error("invalid note `{0}`")]
    BadNote(String),
    #[error("invalid beat count in `{0}`")]
    BadBeats(String),
}

/// How a melody is played by a [`crate::Sounder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Play the notes once, in the background.
    Once,
    /// Repeat in the background until stopped.
    Loop,
}

/// Twelve-tone pitch (semitone within the octave, octave number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    semitone: u8,
    octave: u8,
}

impl Pitch {
    /// Equal-temperament frequency with A4 = 440 Hz.
    pub fn frequency_hz(self) -> f32 {
        let midi = 12 * (i32::from(self.octave) + 1) + i32::from(self.semitone);
        440.0 * 2f32.powf((midi - 69) as f32 / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[usize::from(self.semitone)], self.octave)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// `None` is a rest.
    pub pitch: Option<Pitch>,
    pub beats: u8,
}

impl Note {
    /// How long this note lasts at `tempo_bpm` beats per minute.
    pub fn duration(&self, tempo_bpm: u32) -> Duration {
        let beat_ms = 60_000 / u64::from(tempo_bpm.max(1));
        Duration::from_millis(beat_ms * u64::from(self.beats))
    }
}

impl FromStr for Note {
    type Err = MelodyParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (name, beats) = match token.split_once(':') {
            Some((n, b)) => {
                let beats = b
                    .parse::<u8>()
                    .ok()
                    .filter(|b| *b > 0)
                    .ok_or_else(|| MelodyParseError::BadBeats(token.to_string()))?;
                (n, beats)
            }
            None => (token, 1),
        };
        let bad = || MelodyParseError::BadNote(token.to_string());

        if name.eq_ignore_ascii_case("r") {
            return Ok(Note { pitch: None, beats });
        }

        let mut chars = name.chars();
        let base: i8 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(bad()),
        };
        let rest = chars.as_str();
        let (accidental, octave_str) = if let Some(o) = rest.strip_prefix('#') {
            (1, o)
        } else if let Some(o) = rest.strip_prefix('b') {
            (-1, o)
        } else {
            (0, rest)
        };
        let octave = octave_str
            .parse::<u8>()
            .ok()
            .filter(|o| *o <= 8)
            .ok_or_else(bad)?;

        // Cb and B# wrap into the neighbouring octave, which must stay in 0..=8.
        let semitone = base + accidental;
        let (semitone, octave) = match semitone {
            -1 => (11, octave.checked_sub(1).ok_or_else(bad)?),
            12 => (0, Some(octave + 1).filter(|o| *o <= 8).ok_or_else(bad)?),
            s => (s as u8, octave),
        };
        Ok(Note {
            pitch: Some(Pitch { semitone, octave }),
            beats,
        })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pitch {
            Some(p) => write!(f, "{p}:{}", self.beats),
            None => write!(f, "R:{}", self.beats),
        }
    }
}

/// An ordered list of notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Melody {
    notes: Vec<Note>,
}

impl Melody {
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Total length of one pass at `tempo_bpm`.
    pub fn duration(&self, tempo_bpm: u32) -> Duration {
        self.notes.iter().map(|n| n.duration(tempo_bpm)).sum()
    }
}

impl FromStr for Melody {
    type Err = MelodyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notes = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Note>, _>>()?;
        if notes.is_empty() {
            return Err(MelodyParseError::Empty);
        }
        Ok(Self { notes })
    }
}

impl fmt::Display for Melody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.notes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{n}")?;
        }
        Ok(())
    }
}
