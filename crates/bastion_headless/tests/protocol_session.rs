//! Full protocol sessions through the runner's line loop.

use bastion_headless::protocol::{Command, Response};
use bastion_headless::runner::{HeadlessConfig, HeadlessRunner};
use bastion_headless::scenario::Scenario;

fn session(input: &str) -> (HeadlessRunner, Vec<Response>) {
    let mut runner = HeadlessRunner::new(&Scenario::default(), HeadlessConfig::default()).unwrap();
    let mut output = Vec::new();
    runner.run(input.as_bytes(), &mut output).unwrap();
    let responses = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (runner, responses)
}

#[test]
fn test_session_opens_and_closes() {
    let (_, responses) = session("");
    assert_eq!(
        responses,
        vec![
            Response::Ready {
                version: "1.0".to_string(),
                tick: 0
            },
            Response::Bye
        ]
    );
}

#[test]
fn test_crafting_session() {
    let input = [
        r#"{"cmd":"conquer","poi":"P2"}"#,
        r#"{"cmd":"enqueue","recipe":"RCP3"}"#,
        r#"{"cmd":"tick","count":30}"#,
        r#"{"cmd":"query"}"#,
        r#"{"cmd":"quit"}"#,
    ]
    .join("\n");
    let (runner, responses) = session(&input);

    assert_eq!(responses[1], Response::ack("conquer"));
    assert_eq!(responses[2], Response::ack("enqueue"));
    assert_eq!(responses[3], Response::ack("tick"));
    let Response::State(state) = &responses[4] else {
        panic!("expected state, got {:?}", responses[4]);
    };
    assert_eq!(state.tick, 30);
    assert_eq!(state.forge_ticks, 30);
    assert!(state.conquered.iter().any(|poi| poi.as_str() == "P2"));
    // 100 starting fuel plus the RCP3 reward.
    assert_eq!(state.resources[&bastion_core::resources::ResourceKind::Fuel], 120);
    assert!(state.log.iter().any(|line| line == "FORGE COMPLETE: Fuel x20"));
    assert_eq!(state.hash, runner.simulation().state_hash());
    assert_eq!(responses.last(), Some(&Response::Bye));
}

#[test]
fn test_bad_lines_do_not_end_the_session() {
    let input = [
        "not json",
        r#"{"cmd":"teleport"}"#,
        r#"{"cmd":"level_up","hero":"nobody"}"#,
        r#"{"cmd":"infuse","primary":"GOLD","secondary":"GOLD"}"#,
        r#"{"cmd":"hash"}"#,
    ]
    .join("\n");
    let (runner, responses) = session(&input);

    assert!(matches!(&responses[1], Response::Error { cmd: None, .. }));
    assert!(matches!(&responses[2], Response::Error { cmd: None, .. }));
    assert!(matches!(
        &responses[3],
        Response::Error { cmd: Some(cmd), .. } if cmd == "level_up"
    ));
    assert!(matches!(
        &responses[4],
        Response::Rejected { reason, .. } if reason == "identical_selection"
    ));
    assert_eq!(
        responses[5],
        Response::StateHash {
            tick: 0,
            hash: runner.simulation().state_hash()
        }
    );
}

#[test]
fn test_recorded_session_replays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.replay");
    let config = HeadlessConfig {
        replay_path: Some(path.clone()),
        ..HeadlessConfig::default()
    };
    let mut runner = HeadlessRunner::new(&Scenario::default(), config).unwrap();
    let input = [
        r#"{"cmd":"conquer","poi":"P1"}"#,
        r#"{"cmd":"enqueue","recipe":"RCP1"}"#,
        r#"{"cmd":"world_tick","count":100}"#,
        r#"{"cmd":"forge_tick","count":3}"#,
        r#"{"cmd":"travel","region":"R2"}"#,
    ]
    .join("\n");
    runner.run(input.as_bytes(), std::io::sink()).unwrap();

    let replay = bastion_core::replay::Replay::load(&path).unwrap();
    assert_eq!(replay.command_count(), 3);
    assert_eq!(replay.final_hash, runner.simulation().state_hash());
    replay.verify().unwrap();
}

#[test]
fn test_every_command_name_parses_back() {
    let commands = [
        r#"{"cmd":"world_tick"}"#,
        r#"{"cmd":"forge_tick","count":2}"#,
        r#"{"cmd":"cancel_queued","index":0}"#,
        r#"{"cmd":"upgrade","recipe":"RCP1"}"#,
        r#"{"cmd":"prestige"}"#,
        r#"{"cmd":"stats","recipe":"RCP1"}"#,
    ];
    for json in commands {
        let cmd = Command::from_json(json).unwrap();
        assert!(json.contains(cmd.name()), "{json}");
    }
}
