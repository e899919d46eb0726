use draftboard_ocr::config::BoardConfig;
use draftboard_ocr::ocr::ExtractedFields;
use draftboard_ocr::ocr::extract::parse_whole_tokens;
use draftboard_ocr::pipeline::reconcile_observations;
use draftboard_ocr::reconcile::scorer::TEAM_BONUS;
use draftboard_ocr::reconcile::{AssignmentRules, CellObservation, CellResult, ExtractionVariant, Scorer, assign_board};
use draftboard_ocr::roster::{Position, Roster, load_players_from_reader};
use std::collections::HashSet;

const ROSTER: &str = "PLAYER NAME,TEAM,POS,BYE WEEK
Josh Allen,BUF,QB,7
Keenan Allen,CHI,WR,7
Justin Jefferson,MIN,WR,6
Baltimore Ravens,BAL,DST,14
Brandon Allen,SF,QB,9
Christian McCaffrey,SF,RB,9
Travis Kelce,KC,TE,10
Free Agent Kicker,FA,K,-
";

fn roster() -> Roster {
    Roster::new(load_players_from_reader(ROSTER.as_bytes()).unwrap()).unwrap()
}

fn cell(row: u32, col: u32, fields: ExtractedFields) -> CellObservation {
    CellObservation {
        row,
        col,
        roi: fields,
        whole: ExtractedFields::default(),
    }
}

fn reading(last: &str, pos_text: &str, color: Option<Position>) -> ExtractedFields {
    ExtractedFields {
        last_name: last.to_string(),
        pos_text: pos_text.to_string(),
        color_pos: color,
        ..ExtractedFields::default()
    }
}

fn run(cells: &[CellObservation]) -> Vec<CellResult> {
    let roster = roster();
    assign_board(Scorer::new(&roster), AssignmentRules::default(), 10, cells)
}

#[test]
fn exact_color_and_text_first_pick() {
    let results = run(&[cell(0, 0, reading("ALLEN", "QB", Some(Position::QB)))]);
    let first = &results[0];

    assert!(first.use_match);
    assert_eq!(first.pick, 1);
    assert_eq!(first.full_name(), "JOSH ALLEN");
    assert!(first.match_score >= 85.0, "score {}", first.match_score);
}

#[test]
fn wrong_color_excludes_strong_text_match() {
    let results = run(&[cell(0, 2, reading("JEFFERSON", "", Some(Position::RB)))]);
    let result = &results[0];

    let best = result.best_candidate.as_ref().unwrap();
    assert_eq!(best.player.pos, Position::RB);
    assert!(result.suggestions.iter().all(|m| m.player.pos == Position::RB));
    if result.use_match {
        assert_eq!(result.pos, Some(Position::RB));
    } else {
        assert_eq!(result.last, "JEFFERSON");
    }
}

#[test]
fn repeated_name_falls_back_to_next_candidate() {
    let results = run(&[
        cell(0, 0, reading("ALLEN", "", Some(Position::QB))),
        cell(0, 1, reading("ALLEN", "", Some(Position::QB))),
    ]);

    assert_eq!(results[0].full_name(), "JOSH ALLEN");
    assert!(results[1].use_match);
    assert_eq!(results[1].full_name(), "BRANDON ALLEN");
}

#[test]
fn exhausted_identity_is_not_reused() {
    let results = run(&[
        cell(0, 0, reading("KELCE", "TE", Some(Position::TE))),
        cell(0, 1, reading("KELCE", "TE", Some(Position::TE))),
    ]);

    assert!(results[0].use_match);
    assert_eq!(results[0].full_name(), "TRAVIS KELCE");
    // The only TE is taken; the second cell keeps its raw reading
    assert!(!results[1].use_match);
    assert_eq!(results[1].last, "KELCE");
    assert!(results[1].best_candidate.is_none());
    assert!(results[1].suggestions.iter().any(|m| m.is_used));
}

#[test]
fn defense_matches_by_team_name() {
    let fields = ExtractedFields {
        team_text: "BAL".to_string(),
        ..reading("Baltimore Ravens", "D/ST", Some(Position::DST))
    };
    let results = run(&[cell(0, 3, fields)]);
    let result = &results[0];

    assert!(result.use_match);
    assert!(result.is_team_defense);
    assert_eq!(result.first, "");
    assert_eq!(result.last, "BALTIMORE RAVENS");
    assert_eq!(result.team.as_deref(), Some("BAL"));
}

#[test]
fn earlier_cell_claims_contested_player() {
    let a = cell(0, 0, reading("ALLEN", "QB", None));
    let b = cell(0, 1, reading("ALLEN", "QB", None));

    let forward = run(&[a.clone(), b.clone()]);
    assert_eq!(forward[0].full_name(), "JOSH ALLEN");
    assert_ne!(forward[1].full_name(), "JOSH ALLEN");

    let reversed = run(&[b, a]);
    assert_eq!(reversed[0].full_name(), "JOSH ALLEN");
    assert_eq!((reversed[0].row, reversed[0].col), (0, 1));
    // Cell (0, 0) now gets a different player than in the forward pass
    assert_ne!(reversed[1].full_name(), forward[0].full_name());
}

#[test]
fn accepted_identities_are_unique() {
    let names = ["ALLEN", "ALLEN", "ALLEN", "JEFFERSON", "JEFFERS0N", "KELCE", "MCCAFFREY", "RAVENS"];
    let config = BoardConfig {
        rows: 1,
        cols: names.len() as u32,
        ..BoardConfig::default()
    };
    let cells: Vec<CellObservation> = names
        .iter()
        .enumerate()
        .map(|(col, last)| cell(0, col as u32, reading(last, "", None)))
        .collect();

    let roster = roster();
    let report = reconcile_observations(&cells, &roster, &config);
    let mut seen = HashSet::new();
    for result in report.cells.iter().filter(|c| c.use_match) {
        let key = (result.first.clone(), result.last.clone(), result.team.clone(), result.pos, result.bye);
        assert!(seen.insert(key), "{} assigned twice", result.full_name());
    }
    assert!(report.summary.accepted >= 4);
}

#[test]
fn scores_are_bounded() {
    let readings = [
        ExtractedFields {
            first_name: "JOSH".to_string(),
            team_text: "Bills".to_string(),
            bye: Some(7),
            ..reading("ALLEN", "QB", Some(Position::QB))
        },
        reading("", "", None),
        reading("Q", "K", Some(Position::K)),
        reading("ZZZZZZZZZZZZ", "XX", None),
        ExtractedFields {
            bye: Some(99),
            ..reading("RAVENS BALTIMORE", "DST", Some(Position::DST))
        },
    ];
    let cells: Vec<CellObservation> = (0..16)
        .flat_map(|row| (0..10).map(move |col| (row, col)))
        .zip(readings.iter().cycle())
        .map(|((row, col), fields)| CellObservation {
            row,
            col,
            roi: fields.clone(),
            whole: fields.swapped(),
        })
        .collect();

    for result in run(&cells) {
        assert!((0.0..=100.0).contains(&result.match_score));
        for variant in &result.variant_scores {
            assert!((0.0..=100.0).contains(&variant.score));
        }
        for m in result.suggestions.iter().chain(result.best_candidate.iter()) {
            assert!((0.0..=100.0).contains(&m.score));
        }
    }
}

#[test]
fn mascot_on_whole_card_earns_team_bonus() {
    let words: Vec<String> = ["DST", "RAVENS", "BYE", "14"].iter().map(|w| w.to_string()).collect();
    let whole = parse_whole_tokens(&words).unwrap().with_color(Some(Position::DST));
    assert_eq!(whole.team_text, "BAL");

    let results = run(&[CellObservation {
        row: 0,
        col: 3,
        roi: ExtractedFields::default(),
        whole,
    }]);
    let result = &results[0];

    assert_eq!(result.variant, ExtractionVariant::WholeCell);
    assert!(result.use_match);
    assert_eq!(result.last, "BALTIMORE RAVENS");
    assert!(result.is_team_defense);
    let best = result.best_candidate.as_ref().unwrap();
    assert_eq!(best.breakdown.team, TEAM_BONUS);
}

#[test]
fn stronger_reading_wins_when_both_reach_the_cap() {
    let roi = ExtractedFields {
        team_text: "SF".to_string(),
        bye: Some(9),
        ..reading("ALLEN", "QB", Some(Position::QB))
    };
    let whole = ExtractedFields {
        first_name: "JOSH".to_string(),
        team_text: "BUF".to_string(),
        bye: Some(7),
        ..reading("ALLEN", "QB", Some(Position::QB))
    };

    // Two neighbouring QBs sharing a last name
    let csv = "PLAYER NAME,TEAM,POS,BYE WEEK
Josh Allen,BUF,QB,7
Brandon Allen,SF,QB,9
";
    let roster = Roster::new(load_players_from_reader(csv.as_bytes()).unwrap()).unwrap();
    let cells = [CellObservation {
        row: 0,
        col: 0,
        roi,
        whole,
    }];
    let results = assign_board(Scorer::new(&roster), AssignmentRules::default(), 10, &cells);
    let result = &results[0];

    assert!(result.variant_scores.iter().take(2).all(|v| v.score == 100.0));
    assert_eq!(result.variant, ExtractionVariant::WholeCell);
    assert_eq!(result.full_name(), "JOSH ALLEN");
    assert_eq!(result.team.as_deref(), Some("BUF"));
}
