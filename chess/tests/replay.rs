//! Property tests for timeline navigation.

use chess::{CozyRules, GameTimeline, RulesEngine};
use proptest::prelude::*;

/// Play a random legal game, picking each move by index modulo the number of
/// legal moves. Stops early if the game ends.
fn random_game(choices: &[usize]) -> GameTimeline {
    let mut timeline = GameTimeline::new();
    for choice in choices {
        let legal = CozyRules.legal_moves(timeline.current_position());
        if legal.is_empty() {
            break;
        }
        timeline
            .apply_move(legal[choice % legal.len()])
            .expect("generated move must be legal");
    }
    timeline
}

fn fingerprints_by_stepping(timeline: &mut GameTimeline) -> Vec<String> {
    timeline.jump_to_start();
    let mut seen = vec![timeline.current_position().fingerprint().to_string()];
    while timeline.step_forward() {
        seen.push(timeline.current_position().fingerprint().to_string());
    }
    seen
}

proptest! {
    #[test]
    fn jumping_reproduces_stepping(choices in prop::collection::vec(0usize..64, 0..40)) {
        let mut timeline = random_game(&choices);
        let stepped = fingerprints_by_stepping(&mut timeline);

        for (i, expected) in stepped.iter().enumerate() {
            timeline.jump_to(i as isize - 1);
            prop_assert_eq!(timeline.current_position().fingerprint(), expected.as_str());
        }
    }

    #[test]
    fn back_and_forth_is_stable(
        choices in prop::collection::vec(0usize..64, 1..30),
        back in 0usize..30,
    ) {
        let mut timeline = random_game(&choices);
        timeline.jump_to_end();
        let end = timeline.current_position().clone();
        let cursor = timeline.cursor();

        for _ in 0..back {
            timeline.step_backward();
        }
        let mid_cursor = timeline.cursor();
        let mid = timeline.current_position().clone();
        timeline.jump_to(mid_cursor);
        prop_assert_eq!(timeline.current_position(), &mid);

        while timeline.step_forward() {}
        prop_assert_eq!(timeline.cursor(), cursor);
        prop_assert_eq!(timeline.current_position(), &end);
    }

    #[test]
    fn apply_after_jump_truncates(
        choices in prop::collection::vec(0usize..64, 2..30),
        k in 0usize..30,
    ) {
        let mut timeline = random_game(&choices);
        let len = timeline.len();
        prop_assume!(len >= 2);
        let k = (k % (len - 1)) as isize;

        timeline.jump_to(k);
        let kept: Vec<String> = timeline.moves()[..=k as usize]
            .iter()
            .map(|m| m.uci.clone())
            .collect();

        let legal = CozyRules.legal_moves(timeline.current_position());
        prop_assume!(!legal.is_empty());
        timeline.apply_move(legal[0]).unwrap();

        prop_assert_eq!(timeline.len(), k as usize + 2);
        prop_assert_eq!(timeline.cursor(), k + 1);
        let prefix: Vec<String> = timeline.moves()[..=k as usize]
            .iter()
            .map(|m| m.uci.clone())
            .collect();
        prop_assert_eq!(prefix, kept);
    }
}
