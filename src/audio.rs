//! Audio system for background music and sound effects
//!
//! The core has no awareness of sound; the driver maps drained game
//! events onto cues here. Audio is optional - the game runs fine when no
//! output device is available.

use crate::event::GameEvent;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    Move,
    Rotate,
    HardDrop,
    LineClear,
    ComboEnd,
    BossAppear,
    BossDefeated,
    BossBoost,
    HideNext,
    GameOver,
}

impl Sfx {
    fn filename(&self) -> &'static str {
        match self {
            Sfx::Move => "move.wav",
            Sfx::Rotate => "rotate.wav",
            Sfx::HardDrop => "drop.wav",
            Sfx::LineClear => "line_clear.wav",
            Sfx::ComboEnd => "combo_end.wav",
            Sfx::BossAppear => "boss_appear.wav",
            Sfx::BossDefeated => "boss_defeated.wav",
            Sfx::BossBoost => "boss_boost.wav",
            Sfx::HideNext => "hide_next.wav",
            Sfx::GameOver => "game_over.wav",
        }
    }

    /// The cue for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::PieceMoved => Some(Sfx::Move),
            GameEvent::PieceRotated => Some(Sfx::Rotate),
            GameEvent::HardDropped { .. } => Some(Sfx::HardDrop),
            GameEvent::LinesCleared { .. } => Some(Sfx::LineClear),
            GameEvent::ComboEnded => Some(Sfx::ComboEnd),
            GameEvent::BossAppeared { .. } => Some(Sfx::BossAppear),
            GameEvent::BossDefeated { .. } => Some(Sfx::BossDefeated),
            GameEvent::BossBoosted => Some(Sfx::BossBoost),
            GameEvent::NextPieceHidden => Some(Sfx::HideNext),
            GameEvent::GameOver => Some(Sfx::GameOver),
            _ => None,
        }
    }
}

/// Audio manager handles all sound playback
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    bgm_sink: Option<Sink>,
    assets_path: PathBuf,
    bgm_volume: f32,
    sfx_volume: f32,
    bgm_playing: bool,
}

impl AudioManager {
    /// Create a new audio manager
    pub fn new() -> Option<Self> {
        let (stream, stream_handle) = OutputStream::try_default().ok()?;
        let assets_path = Self::find_assets_path()?;

        Some(Self {
            _stream: stream,
            stream_handle,
            bgm_sink: None,
            assets_path,
            bgm_volume: 0.25,
            sfx_volume: 0.5,
            bgm_playing: false,
        })
    }

    fn find_assets_path() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("assets"),
            PathBuf::from("./assets"),
            std::env::current_exe().ok()?.parent()?.join("assets"),
        ];

        paths.iter().find(|p| p.exists()).cloned()
    }

    /// Set BGM volume (0.0 to 1.0)
    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.bgm_sink {
            sink.set_volume(self.bgm_volume);
        }
    }

    /// Set SFX volume (0.0 to 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    /// Play background music (loops indefinitely)
    pub fn play_bgm(&mut self) {
        if self.bgm_playing {
            return;
        }

        let path = self.assets_path.join("bgm").join("background.wav");
        let Ok(file) = File::open(&path) else { return };
        let Ok(sink) = Sink::try_new(&self.stream_handle) else {
            return;
        };
        let Ok(decoder) = Decoder::new(BufReader::new(file)) else {
            return;
        };

        sink.set_volume(self.bgm_volume);
        sink.append(decoder.repeat_infinite());
        self.bgm_sink = Some(sink);
        self.bgm_playing = true;
    }

    /// Stop background music
    pub fn stop_bgm(&mut self) {
        if let Some(sink) = self.bgm_sink.take() {
            sink.stop();
        }
        self.bgm_playing = false;
    }

    /// Pause background music
    pub fn pause_bgm(&mut self) {
        if let Some(sink) = &self.bgm_sink {
            sink.pause();
        }
    }

    /// Resume background music
    pub fn resume_bgm(&mut self) {
        if let Some(sink) = &self.bgm_sink {
            sink.play();
        }
    }

    /// Play a sound effect
    pub fn play_sfx(&mut self, sfx: Sfx) {
        if self.sfx_volume <= 0.0 {
            return;
        }

        let path = self.assets_path.join("sfx").join(sfx.filename());

        if let Ok(file) = File::open(&path) {
            if let Ok(decoder) = Decoder::new(BufReader::new(file)) {
                if let Ok(sink) = Sink::try_new(&self.stream_handle) {
                    sink.set_volume(self.sfx_volume);
                    sink.append(decoder);
                    sink.detach(); // Let it play and clean up automatically
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_cue_mapping() {
        assert_eq!(
            Sfx::for_event(&GameEvent::PieceMoved),
            Some(Sfx::Move)
        );
        assert_eq!(
            Sfx::for_event(&GameEvent::HardDropped { distance: 5 }),
            Some(Sfx::HardDrop)
        );
        assert_eq!(
            Sfx::for_event(&GameEvent::BossDefeated { index: 2 }),
            Some(Sfx::BossDefeated)
        );
        // Silent events stay silent
        assert_eq!(Sfx::for_event(&GameEvent::PieceLocked), None);
        assert_eq!(
            Sfx::for_event(&GameEvent::ComboStarted { count: 1 }),
            None
        );
    }
}
