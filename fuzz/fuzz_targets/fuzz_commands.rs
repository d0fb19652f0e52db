#![no_main]

//! Command parsing and dispatch fuzzer.
//!
//! Feeds arbitrary command names and string arguments through the
//! registry. Every request must produce a response, and a refused
//! command must leave the game unchanged.

use arbitrary::Arbitrary;
use battlenode::game::{GenerationConfig, check_invariants};
use battlenode::session::{CommandArgs, GameRegistry, PROTOCOL_VERSION, Request, Response};
use libfuzzer_sys::fuzz_target;

/// A fuzzer-generated raw command.
#[derive(Arbitrary, Debug)]
struct RawCommand {
    /// Index into the player list.
    player: bool,
    /// Command name, sometimes a known one.
    name: Name,
    /// Loose string arguments.
    args: Vec<(Key, String)>,
    /// Whether to send a wrong protocol version.
    bad_version: bool,
}

#[derive(Arbitrary, Debug)]
enum Name {
    Link,
    Spec,
    Hide,
    Done,
    Other(String),
}

#[derive(Arbitrary, Debug)]
enum Key {
    X,
    Y,
    TargetX,
    TargetY,
    Power,
    Type,
    Other(String),
}

fuzz_target!(|input: (u64, Vec<RawCommand>)| {
    let (seed, commands) = input;
    let registry = GameRegistry::new();
    let config = GenerationConfig {
        nonode_prob: 0.1,
        ..GenerationConfig::default()
    };
    let Ok(handle) = registry.create("fuzz", 8, 8, &config, seed) else {
        return;
    };
    for name in ["red", "blue"] {
        if handle.join(name).is_err() {
            return;
        }
    }

    for raw in commands.into_iter().take(64) {
        let command = match raw.name {
            Name::Link => "link".to_string(),
            Name::Spec => "spec".to_string(),
            Name::Hide => "hide".to_string(),
            Name::Done => "done".to_string(),
            Name::Other(name) => name,
        };
        let args: CommandArgs = raw
            .args
            .into_iter()
            .take(8)
            .map(|(key, value)| {
                let key = match key {
                    Key::X => "x".to_string(),
                    Key::Y => "y".to_string(),
                    Key::TargetX => "targetx".to_string(),
                    Key::TargetY => "targety".to_string(),
                    Key::Power => "power".to_string(),
                    Key::Type => "type".to_string(),
                    Key::Other(key) => key,
                };
                (key, value)
            })
            .collect();

        let before = handle.lock().clone();
        let response = registry.dispatch(Request::Command {
            game: "fuzz".into(),
            version: if raw.bad_version { "9.9".into() } else { PROTOCOL_VERSION.into() },
            player: if raw.player { "red" } else { "blue" }.into(),
            command,
            args,
        });

        let game = handle.lock();
        if !matches!(response, Response::Command { .. }) {
            assert_eq!(game.tick(), before.tick());
            assert_eq!(game.grid.link_count(), before.grid.link_count());
            assert_eq!(game.players, before.players);
        }
        let violations = check_invariants(&game);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
