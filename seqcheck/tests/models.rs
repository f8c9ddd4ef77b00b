//! Model-based tests of small real subjects: a growable array, a circular
//! queue and a music player. Each command mutates the real subject and its
//! model in lockstep and reports any divergence.

use seqcheck::*;
use std::collections::BTreeSet;
use std::rc::Rc;

mod growable_array {
    use super::*;

    #[derive(Debug, Default, Clone)]
    struct Tally {
        entries: usize,
    }

    struct Push {
        value: u32,
    }

    impl Command<Vec<u32>, Tally> for Push {
        fn check(&self, _model: &Tally) -> Result<bool, CommandError> {
            Ok(true)
        }

        fn run(&self, state: &mut Vec<u32>, model: &mut Tally) -> Result<bool, CommandError> {
            state.push(self.value);
            model.entries += 1;
            Ok(state.len() == model.entries)
        }
    }

    struct Pop;

    impl Command<Vec<u32>, Tally> for Pop {
        fn check(&self, model: &Tally) -> Result<bool, CommandError> {
            Ok(model.entries > 0)
        }

        fn run(&self, state: &mut Vec<u32>, model: &mut Tally) -> Result<bool, CommandError> {
            state.pop();
            model.entries -= 1;
            Ok(state.len() == model.entries)
        }
    }

    #[test]
    fn follows_the_model() {
        let sequence_arb = commands(vec![
            Rc::new(command("Push", nat(), |&value: &u32| {
                Rc::new(Push { value }) as Rc<dyn Command<Vec<u32>, Tally>>
            })),
            Rc::new(command("Pop", (), |_: &()| {
                Rc::new(Pop) as Rc<dyn Command<Vec<u32>, Tally>>
            })),
        ]);

        let result = forall(sequence_arb).check(&Config::default());
        assert!(result.is_pass(), "{result}");
    }
}

mod circular_queue {
    use super::*;

    /// Fixed-capacity ring buffer, the real subject under test.
    struct Circular {
        data: Vec<Option<u32>>,
        start: usize,
        end: usize,
    }

    impl Circular {
        fn new(capacity: usize) -> Self {
            Circular {
                data: vec![None; capacity],
                start: 0,
                end: 0,
            }
        }

        fn is_empty(&self) -> bool {
            self.start == self.end && self.data[self.start].is_none()
        }

        fn is_full(&self) -> bool {
            self.start == self.end && self.data[self.start].is_some()
        }

        fn push(&mut self, value: u32) {
            self.data[self.end] = Some(value);
            self.end = (self.end + 1) % self.data.len();
        }

        fn pop(&mut self) -> Option<u32> {
            let popped = self.data[self.start].take();
            self.start = (self.start + 1) % self.data.len();
            popped
        }

        fn size(&self) -> usize {
            if self.is_full() {
                self.data.len()
            } else if self.end >= self.start {
                self.end - self.start
            } else {
                self.data.len() - self.start + self.end
            }
        }
    }

    #[derive(Debug, Clone, Default)]
    struct QueueModel {
        entries: Vec<u32>,
        capacity: usize,
    }

    struct Push {
        value: u32,
    }

    impl Command<Circular, QueueModel> for Push {
        fn check(&self, model: &QueueModel) -> Result<bool, CommandError> {
            Ok(model.entries.len() < model.capacity)
        }

        fn run(&self, state: &mut Circular, model: &mut QueueModel) -> Result<bool, CommandError> {
            state.push(self.value);
            model.entries.push(self.value);
            Ok(true)
        }
    }

    struct Pop;

    impl Command<Circular, QueueModel> for Pop {
        fn check(&self, model: &QueueModel) -> Result<bool, CommandError> {
            Ok(!model.entries.is_empty())
        }

        fn run(&self, state: &mut Circular, model: &mut QueueModel) -> Result<bool, CommandError> {
            Ok(state.pop() == Some(model.entries.remove(0)))
        }
    }

    struct IsEmpty;

    impl Command<Circular, QueueModel> for IsEmpty {
        fn check(&self, _model: &QueueModel) -> Result<bool, CommandError> {
            Ok(true)
        }

        fn run(&self, state: &mut Circular, model: &mut QueueModel) -> Result<bool, CommandError> {
            Ok(state.is_empty() == model.entries.is_empty())
        }
    }

    struct IsFull;

    impl Command<Circular, QueueModel> for IsFull {
        fn check(&self, _model: &QueueModel) -> Result<bool, CommandError> {
            Ok(true)
        }

        fn run(&self, state: &mut Circular, model: &mut QueueModel) -> Result<bool, CommandError> {
            Ok(state.is_full() == (model.entries.len() == model.capacity))
        }
    }

    struct SizeOf;

    impl Command<Circular, QueueModel> for SizeOf {
        fn check(&self, _model: &QueueModel) -> Result<bool, CommandError> {
            Ok(true)
        }

        fn run(&self, state: &mut Circular, model: &mut QueueModel) -> Result<bool, CommandError> {
            Ok(state.size() == model.entries.len())
        }
    }

    #[test]
    fn follows_the_model_for_any_capacity() {
        let sequence_arb = commands(vec![
            Rc::new(command("Push", nat(), |&value: &u32| {
                Rc::new(Push { value }) as Rc<dyn Command<Circular, QueueModel>>
            })),
            Rc::new(command("Pop", (), |_: &()| {
                Rc::new(Pop) as Rc<dyn Command<Circular, QueueModel>>
            })),
            Rc::new(command("IsEmpty", (), |_: &()| {
                Rc::new(IsEmpty) as Rc<dyn Command<Circular, QueueModel>>
            })),
            Rc::new(command("IsFull", (), |_: &()| {
                Rc::new(IsFull) as Rc<dyn Command<Circular, QueueModel>>
            })),
            Rc::new(command("Size", (), |_: &()| {
                Rc::new(SizeOf) as Rc<dyn Command<Circular, QueueModel>>
            })),
        ]);

        // the warmup seed picks the capacity
        let result = forall_seeded(int_range(1, 64), sequence_arb, |&capacity: &i32| {
            Ok(RunContext::new(
                Circular::new(capacity as usize),
                QueueModel {
                    entries: Vec::new(),
                    capacity: capacity as usize,
                },
            ))
        })
        .check(&Config::default());
        assert!(result.is_pass(), "{result}");
    }
}

mod music_player {
    use super::*;

    /// The real subject: a little playlist player.
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

        fn run(
            &self,
            player: &mut MusicPlayer,
            model: &mut PlayerModel,
        ) -> Result<bool, CommandError> {
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

        fn run(
            &self,
            player: &mut MusicPlayer,
            model: &mut PlayerModel,
        ) -> Result<bool, CommandError> {
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

        fn run(
            &self,
            player: &mut MusicPlayer,
            model: &mut PlayerModel,
        ) -> Result<bool, CommandError> {
            let track_before = player.track_name();
            player.next();
            if model.is_playing != player.is_playing() {
                return Ok(false);
            }
            if model.num_tracks <= 1 {
                // keep playing the same track
                Ok(track_before == player.track_name())
            } else {
                // move to another track
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

        fn run(
            &self,
            player: &mut MusicPlayer,
            model: &mut PlayerModel,
        ) -> Result<bool, CommandError> {
            model.num_tracks += 1;
            model.tracks_seen.insert(self.name.clone());

            let track_before = player.track_name();
            player.add_track(&self.name, self.position as usize % model.num_tracks);
            if model.is_playing != player.is_playing() {
                // adding a track must not change the playing status
                return Ok(false);
            }
            if model.num_tracks == 1 {
                Ok(player.track_name().as_deref() == Some(self.name.as_str()))
            } else {
                Ok(track_before == player.track_name())
            }
        }
    }

    fn player_commands() -> SequenceArbitrary<MusicPlayer, PlayerModel> {
        commands(vec![
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
        ])
    }

    #[test]
    fn follows_the_model() {
        let result = forall(player_commands()).check(&Config::default());
        assert!(result.is_pass(), "{result}");
    }

    #[test]
    fn metrics_cover_every_kind_generated() {
        let driver = forall(player_commands()).with_settings(Settings {
            metrics: true,
            ..Settings::default()
        });
        let table = driver.metrics_output().unwrap();
        let result = driver.check(&Config::default().with_tests(50));
        assert!(result.is_pass(), "{result}");

        let table = table.borrow();
        let generated: u64 = table.values().map(|r| r.generated).sum();
        let checked: u64 = table
            .values()
            .map(|r| r.check.success + r.check.failed + r.check.exception)
            .sum();
        assert!(generated > 0);
        assert!(checked > 0);
        // precondition-guarded kinds record both accepted and skipped checks
        if let Some(play) = table.get("Play") {
            assert_eq!(play.check.exception, 0);
        }
    }
}
