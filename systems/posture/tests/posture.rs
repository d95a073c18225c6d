use lane_defence_core::{Posture, Side};
use lane_defence_system_assessor::FlankHealth;
use lane_defence_system_posture::{commit_side, PostureInputs, PostureSelector, RULES};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

proptest! {
    #[test]
    fn opening_turns_always_start_defending(
        turn in 0u32..3,
        enemy_health in 0.0f32..40.0,
        projected_mobile in 0.0f32..120.0,
        affordable_scouts in 0u32..200,
        enemy_structure_health in 0.0f32..5000.0,
        seed in any::<u64>(),
    ) {
        let inputs = PostureInputs {
            turn,
            enemy_health,
            projected_mobile,
            affordable_scouts,
            enemy_structure_health,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let decision = PostureSelector::default().select(&inputs, FlankHealth::default(), &mut rng);
        prop_assert_eq!(decision.posture, Posture::StartingDefense);
        prop_assert_eq!(decision.commit, None);
    }

    #[test]
    fn commit_turn_always_commits(
        enemy_health in 0.0f32..40.0,
        affordable_scouts in 0u32..200,
        left in 0.0f32..3000.0,
        right in 0.0f32..3000.0,
    ) {
        let inputs = PostureInputs {
            turn: 3,
            enemy_health,
            affordable_scouts,
            ..PostureInputs::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let decision = PostureSelector::default().select(&inputs, FlankHealth { left, right }, &mut rng);
        prop_assert_eq!(decision.posture, Posture::InitialCommit);
        prop_assert!(decision.commit.is_some());
    }
}

#[test]
fn tied_flanks_split_evenly_over_seeded_trials() {
    let trials = 2_000;
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let lefts = (0..trials)
        .filter(|_| commit_side(FlankHealth::default(), &mut rng) == Side::Left)
        .count();

    let share = lefts as f64 / trials as f64;
    assert!((0.45..=0.55).contains(&share), "left share {share}");
}

#[test]
fn same_seed_breaks_ties_identically() {
    let mut first = ChaCha8Rng::seed_from_u64(99);
    let mut second = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..16 {
        assert_eq!(
            commit_side(FlankHealth::default(), &mut first),
            commit_side(FlankHealth::default(), &mut second)
        );
    }
}

#[test]
fn rule_table_ends_with_an_unconditional_stall() {
    let last = RULES.last().expect("non-empty table");
    assert_eq!(last.posture, Posture::InterceptorStall);
    assert!(last.matches(&PostureInputs::default(), &PostureSelector::default()));
    assert_eq!(RULES.len(), 7);
}
