use super::Handle;
use crate::command::Response;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Volume {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tempo {
    Slow,
    Medium,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Piano,
    Flute,
    Guitar,
    Drums,
}

/// Built-in audio clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audio {
    PianoLoop1,
    PianoLoop2,
    DrumLoop,
    Applause,
    Siren,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioLoop {
    Once,
    Forever,
}

/// MIDI note number in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note(u8);

impl Note {
    pub fn new(number: u8) -> Result<Self> {
        if number <= 127 {
            Ok(Note(number))
        } else {
            Err(Error::InvalidValue(format!("{} is not a MIDI note", number)))
        }
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicCommand {
    SetVolume(Volume),
    /// Plays the clip to the end before answering
    PlayAudio(Audio),
    /// Answers as soon as playback has started
    PlayAudioAndContinue {
        audio: Audio,
        repeat: AudioLoop,
    },
    Stop,
    StartBuzzing,
    StopBuzzing,
    PlayNote {
        note: Note,
        beats: u8,
    },
    SetInstrument(Instrument),
    SetTempo(Tempo),
    GetInstrument,
    GetTempo,
    GetVolume,
}

/// Music element.
#[derive(Clone)]
pub struct Music(pub(super) Handle);

impl Music {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub async fn set_volume(&self, volume: Volume) -> Result<()> {
        self.0.ack(MusicCommand::SetVolume(volume)).await
    }

    pub async fn play_audio(&self, audio: Audio) -> Result<()> {
        self.0.ack(MusicCommand::PlayAudio(audio)).await
    }

    pub async fn play_audio_and_continue(&self, audio: Audio, repeat: AudioLoop) -> Result<()> {
        self.0
            .ack(MusicCommand::PlayAudioAndContinue { audio, repeat })
            .await
    }

    pub async fn stop(&self) -> Result<()> {
        self.0.ack(MusicCommand::Stop).await
    }

    pub async fn start_buzzing(&self) -> Result<()> {
        self.0.ack(MusicCommand::StartBuzzing).await
    }

    pub async fn stop_buzzing(&self) -> Result<()> {
        self.0.ack(MusicCommand::StopBuzzing).await
    }

    pub async fn play_note(&self, note: Note, beats: u8) -> Result<()> {
        self.0.ack(MusicCommand::PlayNote { note, beats }).await
    }

    pub async fn set_instrument(&self, instrument: Instrument) -> Result<()> {
        self.0.ack(MusicCommand::SetInstrument(instrument)).await
    }

    pub async fn set_tempo(&self, tempo: Tempo) -> Result<()> {
        self.0.ack(MusicCommand::SetTempo(tempo)).await
    }

    pub async fn get_instrument(&self) -> Result<Instrument> {
        match self.0.command(MusicCommand::GetInstrument).await? {
            Response::Instrument(instrument) => Ok(instrument),
            other => Err(other.unexpected("Instrument")),
        }
    }

    pub async fn get_tempo(&self) -> Result<Tempo> {
        match self.0.command(MusicCommand::GetTempo).await? {
            Response::Tempo(tempo) => Ok(tempo),
            other => Err(other.unexpected("Tempo")),
        }
    }

    pub async fn get_volume(&self) -> Result<Volume> {
        match self.0.command(MusicCommand::GetVolume).await? {
            Response::Volume(volume) => Ok(volume),
            other => Err(other.unexpected("Volume")),
        }
    }
}
