//! Behavioral properties of the line parser over realistic server logs.

use chrono::{DateTime, Utc};
use valmon_core::{LineParser, ServerState, ServerStatus, should_forward};

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// A trimmed startup and session log of a real dedicated server.
const SESSION_LOG: &[&str] = &[
    "Initialize engine version: 2019.4.20f1 (6dd1c08eedfa)",
    "(Filename: ./Runtime/Export/Debug/Debug.bindings.h Line: 35)",
    "03/02/2021 19:47:40: Render threading mode:SingleThreaded",
    "03/02/2021 19:47:40: Get create world Sigfrej",
    "03/02/2021 19:47:40: Server ID 90071992547409920",
    "03/02/2021 19:47:40: Steam game server initialized",
    "03/02/2021 19:47:41: Initializing world generator seed:WTwHcgt9uL ( -2014396962 )   menu:False  worldgen version:1",
    "03/02/2021 19:47:41: Zonesystem Awake 374",
    "03/02/2021 19:47:41: Found 556 mountain points",
    "03/02/2021 19:47:44: Placed 1883 streams",
    "03/02/2021 19:47:45: Loaded 7115 locations",
    "03/02/2021 19:47:49: Game server connected",
    "03/02/2021 19:49:33: Got connection SteamID 76561198000887816",
    "03/02/2021 19:49:33: Got handshake from client 76561198000887816",
    "03/02/2021 19:49:36: VERSION check their:0.147.3  mine:0.147.3",
    "03/02/2021 19:50:56: Got character ZDOID from Proud : 229722225:1",
    "03/02/2021 20:07:50: World saved ( 597,4449ms )",
    "03/07/2021 23:03:42: Time 392275,57418574, day:217    nextm:392670,000010729  skipspeed:32,8688187490528",
];

fn run(lines: &[&str]) -> ServerState {
    let parser = LineParser::with_clock(epoch);
    let mut state = ServerState::default();
    for raw in lines {
        if let Some(line) = should_forward(raw) {
            parser.apply(&mut state, line).expect("log lines parse");
        }
    }
    state
}

#[test]
fn parsing_is_deterministic() {
    let first = run(SESSION_LOG);
    let second = run(SESSION_LOG);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn status_transitions_once_and_never_regresses() {
    let parser = LineParser::with_clock(epoch);
    let mut state = ServerState::default();

    let connected_at = SESSION_LOG
        .iter()
        .position(|l| l.contains("Game server connected"))
        .unwrap();

    for (index, line) in SESSION_LOG.iter().enumerate() {
        if let Some(line) = should_forward(line) {
            parser.apply(&mut state, line).unwrap();
        }
        let expected = if index < connected_at {
            ServerStatus::Starting
        } else {
            ServerStatus::Running
        };
        assert_eq!(state.server_status, expected, "after line {index}");
    }

    // Restart-like noise afterwards does not bring it back to Starting.
    parser
        .apply(&mut state, "Initialize engine version: 2020.1.1f1 (abc)")
        .unwrap();
    assert_eq!(state.server_status, ServerStatus::Running);
}

#[test]
fn connect_then_close_leaves_no_players() {
    let state = run(&[
        "Got connection SteamID 76561198000887816",
        "Closing socket 76561198000887816",
    ]);
    assert!(state.players.is_empty());
}

#[test]
fn close_only_removes_matching_account() {
    let state = run(&[
        "Got connection SteamID 1",
        "Got connection SteamID 2",
        "Closing socket 1",
    ]);
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].steam_id, "2");
}

#[test]
fn parenthesized_lines_never_mutate() {
    let state = run(&[
        "(Game server connected)",
        "(Zonesystem Awake 374)",
        "  (Got connection SteamID 1)  ",
    ]);
    assert_eq!(state, ServerState::default());
}

#[test]
fn counters_hold_last_value_not_sum() {
    let cases: &[(&str, &str, fn(&ServerState) -> u32)] = &[
        ("Zonesystem Awake 10", "Zonesystem Awake 3", |s| s.zone_system),
        ("DungeonDB Awake 10", "DungeonDB Awake 3", |s| s.dungeon_db),
        (
            "Using mountain distance: 10",
            "Using mountain distance: 3",
            |s| s.mountain_distance,
        ),
        ("Found 10 mountain points", "Found 3 mountain points", |s| {
            s.mountain_points
        }),
        ("Remaining mountains:10", "Remaining mountains:3", |s| {
            s.remaining_mountains
        }),
        ("Found 10 lake points", "Found 3 lake points", |s| s.lake_points),
        ("Remaining lakes:10", "Remaining lakes:3", |s| s.remaining_lakes),
        ("Rivers:10", "Rivers:3", |s| s.rivers),
        ("River buckets 10", "River buckets 3", |s| s.river_buckets),
        ("Placed 10 streams", "Placed 3 streams", |s| s.streams_placed),
        ("Loaded 10 locations", "Loaded 3 locations", |s| {
            s.locations_loaded
        }),
        ("Time 1,0, day:10 nextm:1", "Time 2,0, day:3 nextm:2", |s| s.day),
    ];

    for &(first, second, read) in cases {
        let state = run(&[first, second]);
        assert_eq!(read(&state), 3, "{first} then {second}");
    }
}

#[test]
fn remaining_mountains_does_not_touch_lakes() {
    let state = run(&["Remaining mountains:67"]);
    assert_eq!(state.remaining_mountains, 67);
    assert_eq!(state.remaining_lakes, 0);
}

#[test]
fn full_session_snapshot() {
    let state = run(SESSION_LOG);
    assert_eq!(state.engine_version.as_deref(), Some("2019.4.20f1"));
    assert_eq!(state.world, "Sigfrej");
    assert_eq!(state.zone_system, 374);
    assert_eq!(state.last_game_save, Some(epoch()));
    assert_eq!(state.day, 217);
    assert_eq!(state.players.len(), 1);
    assert_eq!(state.players[0].name.as_deref(), Some("Proud"));
    assert_eq!(state.players[0].game_version.as_deref(), Some("0.147.3"));
}
