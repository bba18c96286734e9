use supportdeck::cards::resolve;
use supportdeck::data::{CardDataset, ScenarioTable};
use supportdeck::deck::Deck;
use supportdeck::sim::{simulate, simulate_detailed, SimulationParams};
use supportdeck::DeckError;

fn sample() -> CardDataset {
    CardDataset::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data/cards.sample.json"))
        .expect("sample dataset should load")
}

fn deck(dataset: &CardDataset, cards: &[(u32, u8)]) -> Deck {
    let mut deck = Deck::new();
    for (id, level) in cards {
        deck.add_card(resolve(*id, *level, dataset).expect("card resolves"));
    }
    deck
}

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-6
}

#[test]
fn sample_deck_improves_its_specialties() {
    let dataset = sample();
    let scenarios = ScenarioTable::builtin();
    let params = SimulationParams::default();

    let empty = simulate(&Deck::new(), &scenarios, &params).expect("empty deck");
    let built = simulate(&deck(&dataset, &[(30028, 4), (30016, 4)]), &scenarios, &params)
        .expect("sample deck");

    assert!(built.to_array().iter().all(|value| value.is_finite()));
    assert!(built.speed > empty.speed);
    assert!(built.stamina > empty.stamina);
    let delta = built.delta(&empty);
    assert!(approx_eq(delta.speed, built.speed - empty.speed));
}

#[test]
fn simulation_is_deterministic() {
    let dataset = sample();
    let scenarios = ScenarioTable::builtin();
    let params = SimulationParams {
        optional_races: 3,
        ..SimulationParams::default()
    };
    let deck = deck(&dataset, &[(30028, 4), (30016, 2), (20012, 0), (30021, 4)]);
    let first = simulate_detailed(&deck, &scenarios, &params).expect("first run");
    let second = simulate_detailed(&deck, &scenarios, &params).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn event_recovery_boosts_net_energy() {
    let dataset = sample();
    let scenarios = ScenarioTable::builtin();
    let params = SimulationParams::default();

    let empty = simulate_detailed(&Deck::new(), &scenarios, &params).expect("empty");
    let tazuna = simulate_detailed(&deck(&dataset, &[(30021, 4)]), &scenarios, &params)
        .expect("tazuna");
    // 10 expected event energy scaled by 40% event recovery
    assert!(approx_eq(tazuna.net_energy - empty.net_energy, 14.0));
    assert_eq!(tazuna.distribution, empty.distribution);
}

#[test]
fn scenario_exclusive_cards_are_dropped() {
    let dataset = sample();
    let scenarios = ScenarioTable::builtin();
    let unity = SimulationParams {
        scenario: "Unity".to_string(),
        ..SimulationParams::default()
    };
    let with_tazuna = deck(&dataset, &[(30028, 4), (30021, 4)]);
    let without = deck(&dataset, &[(30028, 4)]);

    let outcome = simulate_detailed(&with_tazuna, &scenarios, &unity).expect("unity");
    assert_eq!(outcome.excluded_cards, vec![30021]);
    let baseline = simulate_detailed(&without, &scenarios, &unity).expect("unity");
    assert_eq!(outcome.stats, baseline.stats);
}

#[test]
fn optional_races_trade_turns_for_race_rewards() {
    let scenarios = ScenarioTable::builtin();
    let none = simulate_detailed(&Deck::new(), &scenarios, &SimulationParams::default())
        .expect("no races");
    let five = simulate_detailed(
        &Deck::new(),
        &scenarios,
        &SimulationParams {
            optional_races: 5,
            ..SimulationParams::default()
        },
    )
    .expect("five races");
    assert!(approx_eq(none.total_turns - five.total_turns, 5.0));
    assert!(five.net_energy != none.net_energy);
}

#[test]
fn manual_distribution_overrides_card_weights() {
    let dataset = sample();
    let scenarios = ScenarioTable::builtin();
    let mut deck = deck(&dataset, &[(30028, 4)]);
    deck.set_manual_distribution([0.0, 0.0, 0.0, 0.0, 1.0])
        .expect("valid shares");
    let outcome =
        simulate_detailed(&deck, &scenarios, &SimulationParams::default()).expect("manual");
    let shares = outcome.distribution.shares();
    assert!(approx_eq(shares[4], 0.5));
    assert!(approx_eq(shares[0], 0.125));

    assert!(matches!(
        deck.set_manual_distribution([f64::NAN, 1.0, 1.0, 1.0, 1.0]),
        Err(DeckError::InvalidDistribution(_))
    ));
}

#[test]
fn unknown_scenario_is_rejected() {
    let params = SimulationParams {
        scenario: "Grand Live".to_string(),
        ..SimulationParams::default()
    };
    let err = simulate(&Deck::new(), &ScenarioTable::builtin(), &params).expect_err("unknown");
    assert!(matches!(err, DeckError::UnknownScenario(name) if name == "Grand Live"));
}
