use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::Deserialize;
use serde_json::json;

use crate::cards::resolve;
use crate::data::dataset::{CardDataset, DEFAULT_DATASET_PATH};
use crate::data::scenario::ScenarioTable;
use crate::data::validate::{validate_card_dataset, ValidationSeverity};
use crate::deck::Deck;
use crate::optimizer::export::write_tierlist_csv;
use crate::optimizer::scoring::{PenaltyConfig, ScoreWeights};
use crate::optimizer::{rank, LimitBreakFilter, RankingRequest};
use crate::parallel::WorkerPool;
use crate::sim::{simulate_detailed, SimulationParams};
use crate::skills::evaluator::{DISTANCE_LABELS, RUNNING_STYLE_LABELS};
use crate::skills::{card_hint_summary, deck_hint_summary, hint_types, RaceContext};

pub const WORKERS_ENV: &str = "SUPPORTDECK_WORKERS";
pub const DATASET_ENV: &str = "SUPPORTDECK_DATASET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Hints,
    Rank,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("hints") => Some(Command::Hints),
        Some("rank") => Some(Command::Rank),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Hints) => handle_hints(args),
        Some(Command::Rank) => handle_rank(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: supportdeck <simulate|hints|rank|validate>");
            2
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct DeckCardRef {
    id: u32,
    #[serde(default = "max_limit_break")]
    limit_break: u8,
}

fn max_limit_break() -> u8 {
    crate::data::card::MAX_LIMIT_BREAK
}

/// Deck description read from JSON or YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeckFile {
    scenario: Option<String>,
    mood: Option<f64>,
    optional_races: u32,
    cards: Vec<DeckCardRef>,
    distribution: Option<[f64; 5]>,
    race_types: Option<Vec<String>>,
    running_styles: Option<Vec<String>>,
    limit_break_filter: Option<LimitBreakFilter>,
    penalties: Option<PenaltyConfig>,
    /// Extra scenario YAML applied over the built-in table.
    scenario_overlay: Option<String>,
}

struct Inputs {
    dataset: CardDataset,
    scenarios: ScenarioTable,
    deck: Deck,
    request: RankingRequest,
}

fn load_deck_file(path: &str) -> Result<DeckFile, String> {
    let raw = fs::read_to_string(path).map_err(|err| format!("unable to read '{path}': {err}"))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(|err| format!("unable to parse deck '{path}': {err}"))
    } else {
        serde_yaml::from_str(&raw).map_err(|err| format!("unable to parse deck '{path}': {err}"))
    }
}

fn flags(labels: &[&str; 4], selected: &[String], kind: &str) -> Result<[bool; 4], String> {
    let mut flags = [false; 4];
    for name in selected {
        let index = labels
            .iter()
            .position(|label| label.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| format!("unknown {kind} '{name}', expected one of {labels:?}"))?;
        flags[index] = true;
    }
    Ok(flags)
}

fn load_inputs(dataset_path: &str, deck_path: &str) -> Result<Inputs, String> {
    let dataset = CardDataset::load(dataset_path).map_err(|err| err.to_string())?;
    let file = load_deck_file(deck_path)?;

    let mut scenarios = ScenarioTable::builtin();
    if let Some(overlay) = &file.scenario_overlay {
        let overlay_path = Path::new(deck_path)
            .parent()
            .map(|dir| dir.join(overlay))
            .unwrap_or_else(|| overlay.into());
        scenarios
            .load_overlay(&overlay_path)
            .map_err(|err| err.to_string())?;
    }

    let mut deck = Deck::new();
    for card in &file.cards {
        let resolved = resolve(card.id, card.limit_break, &dataset).map_err(|err| err.to_string())?;
        deck.add_card(resolved);
    }
    if let Some(shares) = file.distribution {
        deck.set_manual_distribution(shares)
            .map_err(|err| err.to_string())?;
    }

    let mut request = RankingRequest::default();
    if let Some(races) = &file.race_types {
        request.context.distances = flags(&DISTANCE_LABELS, races, "race type")?;
    }
    if let Some(styles) = &file.running_styles {
        request.context.running_styles = flags(&RUNNING_STYLE_LABELS, styles, "running style")?;
    }
    let defaults = SimulationParams::default();
    request.params = SimulationParams {
        scenario: file.scenario.unwrap_or(defaults.scenario),
        average_mood_bonus: file.mood.unwrap_or(defaults.average_mood_bonus),
        optional_races: file.optional_races,
    };
    if let Some(filter) = file.limit_break_filter {
        request.limit_break_filter = filter;
    }
    if let Some(penalties) = file.penalties {
        request.penalties = penalties;
    }

    Ok(Inputs {
        dataset,
        scenarios,
        deck,
        request,
    })
}

/// Reads `<dataset> <deck>` positional arguments after the command.
fn inputs_from_args(args: &[String], command: &str) -> Result<Inputs, i32> {
    let positional: Vec<&String> = args
        .iter()
        .skip(2)
        .take_while(|arg| !arg.starts_with("--"))
        .collect();
    let (Some(dataset_path), Some(deck_path)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: supportdeck {command} <dataset.json> <deck.yaml>");
        return Err(2);
    };
    load_inputs(dataset_path, deck_path).map_err(|err| {
        eprintln!("{command} failed: {err}");
        1
    })
}

fn print_json(payload: &impl serde::Serialize, what: &str) -> i32 {
    match serde_json::to_string_pretty(payload) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String]) -> i32 {
    let inputs = match inputs_from_args(args, "simulate") {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };
    match simulate_detailed(&inputs.deck, &inputs.scenarios, &inputs.request.params) {
        Ok(outcome) => print_json(&outcome, "simulation result"),
        Err(err) => {
            eprintln!("simulate failed: {err}");
            1
        }
    }
}

fn handle_hints(args: &[String]) -> i32 {
    let inputs = match inputs_from_args(args, "hints") {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };
    let params = &inputs.request.params;
    let context: RaceContext = inputs.request.context;
    let stats = match simulate_detailed(&inputs.deck, &inputs.scenarios, params) {
        Ok(outcome) => outcome.stats,
        Err(err) => {
            eprintln!("hints failed: {err}");
            return 1;
        }
    };
    let weights = ScoreWeights::for_context(&context).stats;
    let cards: Vec<serde_json::Value> = inputs
        .deck
        .cards()
        .iter()
        .map(|card| {
            json!({
                "id": card.id,
                "limit_break": card.limit_break,
                "card_name": card.name,
                "hints": card_hint_summary(card, &stats, &context, &weights, params.optional_races),
                "hint_types": hint_types(card),
            })
        })
        .collect();
    let deck = deck_hint_summary(
        inputs.deck.cards(),
        &stats,
        &context,
        &weights,
        params.optional_races,
    );
    print_json(&json!({ "deck": deck, "cards": cards }), "hint summary")
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RankFlags {
    csv_path: Option<String>,
    sequential: bool,
}

/// Reads rank options; only arguments after `rank <dataset> <deck>` count.
fn parse_rank_flags(args: &[String]) -> Result<RankFlags, String> {
    let mut parsed = RankFlags::default();
    let mut rest = args.iter().skip(4);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--csv" => match rest.next() {
                Some(path) => parsed.csv_path = Some(path.clone()),
                None => return Err("--csv needs a path".to_string()),
            },
            "--sequential" => parsed.sequential = true,
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }
    Ok(parsed)
}

fn handle_rank(args: &[String]) -> i32 {
    let mut inputs = match inputs_from_args(args, "rank") {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };
    let rank_flags = match parse_rank_flags(args) {
        Ok(rank_flags) => rank_flags,
        Err(message) => {
            eprintln!("{message}");
            eprintln!(
                "usage: supportdeck rank <dataset.json> <deck.yaml> [--csv <path>] [--sequential]"
            );
            return 2;
        }
    };
    if rank_flags.sequential {
        inputs.request.options.parallel = false;
    }

    let pool = WorkerPool::from_env(WORKERS_ENV);
    let tierlist = match pool.install(|| {
        rank(
            &inputs.deck,
            &inputs.dataset,
            &inputs.scenarios,
            &inputs.request,
        )
    }) {
        Ok(tierlist) => tierlist,
        Err(err) => {
            eprintln!("rank failed: {err}");
            return 1;
        }
    };

    if let Some(path) = rank_flags.csv_path {
        let written = File::create(&path)
            .map_err(csv::Error::from)
            .and_then(|file| write_tierlist_csv(&tierlist, BufWriter::new(file)));
        if let Err(err) = written {
            eprintln!("failed to write csv '{path}': {err}");
            return 1;
        }
        log::info!("wrote {} ranked entries to {path}", tierlist.entry_count());
    }

    print_json(
        &json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "scenario": inputs.request.params.scenario,
            "tierlist": tierlist,
        }),
        "ranking",
    )
}

fn handle_validate(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .cloned()
        .or_else(|| env::var(DATASET_ENV).ok())
        .unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string());

    let report = match validate_card_dataset(&path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diag in &report.diagnostics {
        eprintln!("[{}] {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s), {} warning(s)",
            report.count(ValidationSeverity::Error),
            report.count(ValidationSeverity::Warning)
        );
        1
    } else {
        println!(
            "validation passed: {path} ({} warning(s))",
            report.count(ValidationSeverity::Warning)
        );
        0
    }
}
