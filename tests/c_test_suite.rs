//! Regression suite for tactical reading (`fix_atari` and ladder detection),
//! ported from a reference engine's GTP test transcripts.
//!
//! Large-pattern-file regression tests are not ported: gamma values here
//! come from the heuristic table in `playout::policy`, not a trained
//! pattern/probability file pair, so there is nothing to load.

use moyo::constants::N;
use moyo::position::{fix_atari, fix_atari_ext, parse_coord, pass_move, play_move, str_coord, Position};

/// Set up stones by direct alternating play: Black, White, Black, White, ...
/// "pass"/"PASS" skips a turn.
fn setpos(moves: &[&str]) -> Position {
    let mut pos = Position::new();
    for mv in moves {
        let pt = parse_coord(mv);
        if pt == moyo::constants::PASS_MOVE {
            pass_move(&mut pos);
        } else {
            play_move(&mut pos, pt).unwrap_or_else(|e| panic!("illegal move {} in setpos: {}", mv, e));
        }
    }
    pos
}

fn format_moves(moves: &[usize]) -> String {
    moves.iter().map(|&m| str_coord(m)).collect::<Vec<_>>().join(" ")
}

#[test]
fn test_fix_atari_10_escape() {
    // setpos C8 C9 E9 B8 F9 D8; fix_atari C8 -> [1 C7]
    let pos = setpos(&["C8", "C9", "E9", "B8", "F9", "D8"]);
    let c8 = parse_coord("C8");
    let moves = fix_atari(&pos, c8, false);

    let c7 = parse_coord("C7");
    assert!(moves.contains(&c7), "Test 10: Expected C7 in escape moves, got: [{}]", format_moves(&moves));
}

#[test]
fn test_fix_atari_20_escape_corner() {
    // setpos C1 G7 B2 B1; fix_atari B1 -> [1 A1]
    let pos = setpos(&["C1", "G7", "B2", "B1"]);
    let b1 = parse_coord("B1");
    let moves = fix_atari(&pos, b1, false);

    let a1 = parse_coord("A1");
    assert!(moves.contains(&a1), "Test 20: Expected A1 in escape moves, got: [{}]", format_moves(&moves));
}

#[test]
fn test_fix_atari_30_unaffected_by_unrelated_move() {
    // Continue from test 20, play B E5; B1's status is unaffected.
    let mut pos = setpos(&["C1", "G7", "B2", "B1"]);
    play_move(&mut pos, parse_coord("E5")).unwrap();

    let b1 = parse_coord("B1");
    let moves = fix_atari(&pos, b1, false);

    let a1 = parse_coord("A1");
    assert!(moves.contains(&a1), "Test 30: E5 should not affect B1's escape, got: [{}]", format_moves(&moves));
}

#[test]
fn test_fix_atari_110_counter_capture() {
    // setpos A1 E5 B2 A2; fix_atari A1 -> [1 A3 B1]
    let pos = setpos(&["A1", "E5", "B2", "A2"]);
    let a1 = parse_coord("A1");
    let moves = fix_atari(&pos, a1, false);

    let a3 = parse_coord("A3");
    let b1 = parse_coord("B1");
    assert!(
        moves.contains(&a3) || moves.contains(&b1),
        "Test 110: Expected A3 or B1 as counter-capture, got: [{}]",
        format_moves(&moves)
    );
}

#[test]
fn test_fix_atari_210_ladder_simple() {
    // setpos A1 A2; fix_atari A1 -> [1] (corner ladder, no escape)
    let pos = setpos(&["A1", "A2"]);
    let a1 = parse_coord("A1");
    let moves = fix_atari(&pos, a1, false);

    assert!(moves.is_empty(), "Test 210: Ladder should work, no escape expected, got: [{}]", format_moves(&moves));
}

#[test]
fn test_fix_atari_220_ladder_broken() {
    // Continue from 210, add G1 as a ladder breaker.
    let pos = setpos(&["A1", "A2", "G1"]);
    let a1 = parse_coord("A1");
    let moves = fix_atari(&pos, a1, false);

    let b1 = parse_coord("B1");
    assert!(
        moves.contains(&b1),
        "Test 220: Ladder should be broken by G1, B1 expected, got: [{}]",
        format_moves(&moves)
    );
}

#[test]
fn test_fix_atari_230_ladder_blocked() {
    // Continue from 220, add D2 as White - blocks the escape path again.
    let pos = setpos(&["A1", "A2", "G1", "D2"]);
    let a1 = parse_coord("A1");
    let moves = fix_atari(&pos, a1, false);

    let b1 = parse_coord("B1");
    assert!(
        !moves.contains(&b1),
        "Test 230: Ladder should work (D2 blocks), no B1 expected, got: [{}]",
        format_moves(&moves)
    );
}

#[test]
fn test_fix_atari_240_twolib_ladder_attack() {
    // setpos G5 F5 A1 G4 A2 H4 A3 G6 H5; G5 has 2 liberties but is ladder-caught.
    let pos = setpos(&["G5", "F5", "A1", "G4", "A2", "H4", "A3", "G6", "H5"]);
    let g5 = parse_coord("G5");

    let moves = fix_atari_ext(&pos, g5, false, true, false);

    let h6 = parse_coord("H6");
    let j5 = parse_coord("J5");
    assert!(
        moves.contains(&h6) || moves.contains(&j5),
        "Test 240: Expected ladder attack moves (H6/J5), got: [{}]",
        format_moves(&moves)
    );
}

#[test]
fn test_fix_atari_250_twolib_edge() {
    // setpos E5 D5 A1 E4 A2 F4 A3 E6 F5; E5 can be attacked at G5.
    let pos = setpos(&["E5", "D5", "A1", "E4", "A2", "F4", "A3", "E6", "F5"]);
    let e5 = parse_coord("E5");

    let moves = fix_atari_ext(&pos, e5, false, true, false);

    let g5 = parse_coord("G5");
    assert!(moves.contains(&g5), "Test 250: Expected G5 as attack, got: [{}]", format_moves(&moves));
}

#[test]
fn test_fix_atari_260_in_atari_no_escape() {
    // setpos D3 F3 E3 G3 F2 E2 G2 H2 D2; E2 is in atari with no escape.
    let pos = setpos(&["D3", "F3", "E3", "G3", "F2", "E2", "G2", "H2", "D2"]);
    let e2 = parse_coord("E2");

    let moves = fix_atari(&pos, e2, false);

    assert!(moves.is_empty(), "Test 260: In atari with no escape, expected empty, got: [{}]", format_moves(&moves));
}

#[test]
fn test_board_size_matches_feature() {
    assert!(N == 9 || N == 13);
}
