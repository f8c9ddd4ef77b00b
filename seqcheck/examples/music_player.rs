//! Model-based testing of a little music player, with the metrics report
//! printed after the batch.
//!
//! Run with: cargo run --example music_player

use seqcheck::*;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Default)]
struct MusicPlayer {
    tracks: Vec<String>,
    playing: bool,
    playing_idx: usize,
}

impl MusicPlayer {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn track_name(&self) -> Option<String> {
        self.tracks.get(self.playing_idx).cloned()
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn add_track(&mut self, name: &str, position: usize) {
        self.tracks.insert(position, name.to_string());
        if self.tracks.len() != 1 && self.playing_idx >= position {
            self.playing_idx += 1;
        }
    }

    fn next(&mut self) {
        self.playing_idx += 1;
        if self.playing_idx >= self.tracks.len() {
            self.playing_idx = 0;
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PlayerModel {
    is_playing: bool,
    num_tracks: usize,
    tracks_seen: BTreeSet<String>,
}

struct Play;

impl Command<MusicPlayer, PlayerModel> for Play {
    fn check(&self, model: &PlayerModel) -> Result<bool, CommandError> {
        Ok(model.num_tracks > 0)
    }

    fn run(&self, player: &mut MusicPlayer, model: &mut PlayerModel) -> Result<bool, CommandError> {
        model.is_playing = true;
        player.play();
        Ok(player.is_playing())
    }
}

struct Pause;

impl Command<MusicPlayer, PlayerModel> for Pause {
    fn check(&self, _model: &PlayerModel) -> Result<bool, CommandError> {
        Ok(true)
    }

    fn run(&self, player: &mut MusicPlayer, model: &mut PlayerModel) -> Result<bool, CommandError> {
        model.is_playing = false;
        player.pause();
        Ok(!player.is_playing())
    }
}

struct Next;

impl Command<MusicPlayer, PlayerModel> for Next {
    fn check(&self, _model: &PlayerModel) -> Result<bool, CommandError> {
        Ok(true)
    }

    fn run(&self, player: &mut MusicPlayer, model: &mut PlayerModel) -> Result<bool, CommandError> {
        let track_before = player.track_name();
        player.next();
        if model.is_playing != player.is_playing() {
            return Ok(false);
        }
        if model.num_tracks <= 1 {
            Ok(track_before == player.track_name())
        } else {
            Ok(track_before != player.track_name())
        }
    }
}

struct AddTrack {
    name: String,
    position: u32,
}

impl Command<MusicPlayer, PlayerModel> for AddTrack {
    fn check(&self, model: &PlayerModel) -> Result<bool, CommandError> {
        Ok(!model.tracks_seen.contains(&self.name))
    }

    fn run(&self, player: &mut MusicPlayer, model: &mut PlayerModel) -> Result<bool, CommandError> {
        model.num_tracks += 1;
        model.tracks_seen.insert(self.name.clone());

        let track_before = player.track_name();
        player.add_track(&self.name, self.position as usize % model.num_tracks);
        if model.is_playing != player.is_playing() {
            return Ok(false);
        }
        if model.num_tracks == 1 {
            Ok(player.track_name().as_deref() == Some(self.name.as_str()))
        } else {
            Ok(track_before == player.track_name())
        }
    }
}

fn main() {
    let sequence_arb = commands(vec![
        Rc::new(command("Play", (), |_: &()| {
            Rc::new(Play) as Rc<dyn Command<MusicPlayer, PlayerModel>>
        })),
        Rc::new(command("Pause", (), |_: &()| {
            Rc::new(Pause) as Rc<dyn Command<MusicPlayer, PlayerModel>>
        })),
        Rc::new(command("Next", (), |_: &()| {
            Rc::new(Next) as Rc<dyn Command<MusicPlayer, PlayerModel>>
        })),
        Rc::new(command(
            "AddTrack",
            (ascii_string(), nat()),
            |(name, position): &(String, u32)| {
                Rc::new(AddTrack {
                    name: name.clone(),
                    position: *position,
                }) as Rc<dyn Command<MusicPlayer, PlayerModel>>
            },
        )),
    ]);

    let result = forall(sequence_arb)
        .with_settings(Settings {
            metrics: true,
            verbose: true,
            ..Settings::default()
        })
        .check(&Config::default());

    println!("{result}");
}
