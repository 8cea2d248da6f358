//! Run pipeline
//!
//! `ModelBuilder` owns everything one run accumulates. Feed it one batch of
//! raw events per game file, then consume it with [`ModelBuilder::build`].
//!
//! Malformed records never stop ingestion; they are collected into the
//! `RunReport` so they can be reviewed together. Whether they fail the run
//! is decided at build time (`allow_malformed`).

use serde::Serialize;

use crate::chain::{
    AbsorptionResult, CountMatrix, InitialStateDistribution, StateKey, TransitionGraph,
    TransitionMatrix,
};
use crate::config::{ModelConfig, ZeroRowPolicy};
use crate::drive::segment;
use crate::error::{MalformedPlayError, ModelError, Result};
use crate::play::{PlayClassifier, RawEvent};

/// Per-run bookkeeping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Event batches (game files) ingested
    pub sources: usize,
    pub events: usize,
    /// Events dropped by the filter precondition
    pub filtered: usize,
    /// Plays of the drives kept in the model
    pub plays: usize,
    pub drives: usize,
    /// Rejected records, for offline review
    #[serde(skip)]
    pub malformed: Vec<MalformedPlayError>,
    /// Dangling states removed under `ZeroRowPolicy::Exclude`
    pub pruned_states: Vec<StateKey>,
}

impl RunReport {
    pub fn malformed_count(&self) -> usize {
        self.malformed.len()
    }
}

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct DriveModel {
    pub counts: CountMatrix,
    pub transition: TransitionMatrix,
    pub initial: InitialStateDistribution,
    pub absorption: AbsorptionResult,
    pub report: RunReport,
}

pub struct ModelBuilder {
    config: ModelConfig,
    classifier: PlayClassifier,
    graph: TransitionGraph,
    initial: InitialStateDistribution,
    report: RunReport,
}

impl ModelBuilder {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            classifier: PlayClassifier::new(&config),
            config,
            graph: TransitionGraph::new(),
            initial: InitialStateDistribution::new(),
            report: RunReport::default(),
        }
    }

    pub fn classifier(&self) -> &PlayClassifier {
        &self.classifier
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Ingest the ordered events of one game. Drives never span batches.
    pub fn add_events(&mut self, events: &[RawEvent]) {
        let mut plays = Vec::with_capacity(events.len());
        let mut filtered = 0;

        for event in events {
            if !self.classifier.is_countable(event) {
                filtered += 1;
                continue;
            }
            match self.classifier.classify(event) {
                Ok(play) => plays.push(play),
                Err(err) => {
                    log::warn!("{}", err);
                    self.report.malformed.push(err);
                }
            }
        }

        let mut drives = segment(plays);
        if let Some(team) = &self.config.offense {
            drives.retain(|d| d.offense() == team.as_str());
        }
        let play_count: usize = drives.iter().map(|d| d.len()).sum();
        for drive in &drives {
            self.initial.record_drive_start(drive);
            self.graph.add_drive(drive);
        }

        log::debug!(
            "Batch {}: {} events, {} filtered, {} plays, {} drives",
            self.report.sources + 1,
            events.len(),
            filtered,
            play_count,
            drives.len()
        );

        self.report.sources += 1;
        self.report.events += events.len();
        self.report.filtered += filtered;
        self.report.plays += play_count;
        self.report.drives += drives.len();
    }

    /// Finalize the graph, build both matrices and solve for absorption.
    pub fn build(self) -> Result<DriveModel> {
        let ModelBuilder {
            config,
            graph,
            initial,
            mut report,
            ..
        } = self;

        let malformed = report.malformed_count();
        if malformed > 0 {
            if !config.allow_malformed {
                return Err(ModelError::Malformed { count: malformed });
            }
            log::warn!("{} malformed play(s) excluded from the model", malformed);
        }

        let graph = graph.finalize();
        let mut counts = CountMatrix::from_graph(&graph);

        if config.zero_row_policy == ZeroRowPolicy::Exclude {
            let (pruned_counts, pruned) = counts.prune_dangling();
            for key in &pruned {
                log::warn!("State {} has no outgoing transitions; excluded", key);
            }
            counts = pruned_counts;
            report.pruned_states = pruned;
        }

        let transition = TransitionMatrix::normalize(&counts);
        transition.ensure_stochastic()?;
        let absorption = AbsorptionResult::solve(&transition)?;

        log::info!(
            "Model built: {} drives, {} plays, {} states",
            report.drives,
            report.plays,
            counts.len()
        );

        Ok(DriveModel {
            counts,
            transition,
            initial,
            absorption,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::Outcome;

    fn event(row: usize, off: &str, down: &str, togo: &str, ydline: &str, desc: &str) -> RawEvent {
        RawEvent::from_pairs(
            "game.csv",
            row,
            &[
                ("off", off),
                ("down", down),
                ("togo", togo),
                ("ydline", ydline),
                ("description", desc),
            ],
        )
    }

    /// BAL fails on 4th down, DEN scores a touchdown, BAL punts.
    fn game() -> Vec<RawEvent> {
        vec![
            event(1, "DEN", "0", "0", "35", "M.Prater kicks 65 yards from DEN 35 to end zone, Touchback."),
            event(2, "BAL", "1", "10", "80", "R.Rice left end to BAL 24 for 4 yards."),
            event(3, "BAL", "2", "6", "76", "J.Flacco pass short left to T.Smith for 6 yards."),
            event(4, "BAL", "1", "10", "70", "R.Rice up the middle for 2 yards."),
            event(5, "BAL", "2", "8", "68", "J.Flacco pass incomplete."),
            event(6, "BAL", "3", "8", "68", "J.Flacco pass short right for 7 yards."),
            event(7, "BAL", "4", "1", "61", "R.Rice up the middle for no gain."),
            event(8, "DEN", "1", "10", "39", "K.Moreno right guard for 9 yards."),
            event(9, "DEN", "2", "1", "30", "P.Manning pass deep left to D.Thomas for 30 yards, TOUCHDOWN."),
            event(10, "DEN", "0", "0", "2", "M.Prater extra point is GOOD."),
            event(11, "DEN", "0", "0", "35", "M.Prater kicks 65 yards, Touchback."),
            event(12, "BAL", "1", "10", "80", "J.Flacco pass short right to R.Rice for 5 yards."),
            event(13, "BAL", "2", "5", "75", "R.Rice left tackle for 2 yards."),
            event(14, "BAL", "3", "3", "73", "J.Flacco sacked at BAL 20 for -7 yards."),
            event(15, "BAL", "4", "10", "80", "S.Koch punts 50 yards to DEN 30."),
        ]
    }

    #[test]
    fn test_end_to_end() {
        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&game());

        let report = builder.report();
        assert_eq!(report.events, 15);
        assert_eq!(report.filtered, 3);
        assert_eq!(report.plays, 12);
        assert_eq!(report.drives, 3);

        let model = builder.build().unwrap();
        assert_eq!(&model.counts.keys()[..5], &StateKey::absorbing_keys());

        // The failed 4th-and-1 became a turnover after 3rd-and-8
        let third_down = StateKey::Situation { yard: 3, togo: 7, down: 3 };
        let turnover = StateKey::Absorbing(Outcome::Turnover);
        assert_eq!(model.counts.get(&third_down, &turnover), 1);
        assert!(model.counts.index(&StateKey::Situation { yard: 3, togo: 1, down: 4 }).is_none());

        // 1st-and-10 at the own 20: one drive punted, one turned it over
        let start = StateKey::Situation { yard: 2, togo: 7, down: 1 };
        let td = model.absorption.probability(&start, Outcome::Touchdown).unwrap();
        assert!((td - 0.0).abs() < 1e-9);
        let punt = model.absorption.probability(&start, Outcome::Punt).unwrap();
        assert!((punt - 0.5).abs() < 1e-9, "punt = {}", punt);
        let lost = model.absorption.probability(&start, Outcome::Turnover).unwrap();
        assert!((lost - 0.5).abs() < 1e-9, "turnover = {}", lost);

        assert_eq!(model.initial.total(), 3);
    }

    #[test]
    fn test_malformed_rejected_by_default() {
        let mut events = game();
        events.push(event(16, "DEN", "1", "ten", "70", "K.Moreno up the middle for 3 yards."));

        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&events);
        assert_eq!(builder.report().malformed_count(), 1);
        assert_eq!(builder.report().malformed[0].event.row, 16);

        match builder.build() {
            Err(ModelError::Malformed { count }) => assert_eq!(count, 1),
            other => panic!("expected Malformed, got {:?}", other.map(|m| m.report)),
        }
    }

    #[test]
    fn test_zero_row_policies() {
        // Last drive ends on a regular 2nd down (end of half): dangling state.
        let mut events = game();
        events.push(event(16, "DEN", "1", "10", "20", "K.Moreno up the middle for 3 yards."));
        events.push(event(17, "DEN", "2", "12", "22", "P.Manning kneels to DEN 22 for -2 yards."));

        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&events);
        assert!(matches!(builder.build(), Err(ModelError::ZeroOutgoingMass { .. })));

        let config = ModelConfig {
            zero_row_policy: ZeroRowPolicy::Exclude,
            ..ModelConfig::default()
        };
        let mut builder = ModelBuilder::new(config);
        builder.add_events(&events);
        let model = builder.build().unwrap();
        assert_eq!(
            model.report.pruned_states,
            vec![
                StateKey::Situation { yard: 7, togo: 10, down: 2 },
                StateKey::Situation { yard: 8, togo: 7, down: 1 },
            ]
        );
        assert!(model.transition.zero_rows().is_empty());
    }

    /// NYG fails on 4th down, CHI punts, NYG punts.
    fn possessions() -> Vec<RawEvent> {
        vec![
            event(1, "NYG", "3", "2", "40", "D.Wilson up the middle for no gain."),
            event(2, "NYG", "4", "2", "40", "D.Wilson left tackle for no gain."),
            event(3, "CHI", "1", "10", "60", "M.Forte right end for 4 yards."),
            event(4, "CHI", "2", "6", "56", "A.Podlesh punts 45 yards."),
            event(5, "NYG", "1", "10", "80", "E.Manning pass incomplete."),
            event(6, "NYG", "2", "10", "80", "S.Weatherford punts 50 yards."),
        ]
    }

    #[test]
    fn test_offense_filter_keeps_drive_boundaries() {
        let third = StateKey::Situation { yard: 6, togo: 1, down: 3 };

        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&possessions());
        assert_eq!(builder.report().drives, 3);
        let all = builder.build().unwrap();
        let p = all.absorption.probability(&third, Outcome::Turnover).unwrap();
        assert!((p - 1.0).abs() < 1e-9);

        let config = ModelConfig {
            offense: Some("NYG".to_string()),
            ..ModelConfig::default()
        };
        let mut builder = ModelBuilder::new(config);
        builder.add_events(&possessions());
        assert_eq!(builder.report().drives, 2);
        assert_eq!(builder.report().plays, 4);
        assert_eq!(builder.report().events, 6);
        let nyg = builder.build().unwrap();
        let p = nyg.absorption.probability(&third, Outcome::Turnover).unwrap();
        assert!((p - 1.0).abs() < 1e-9, "turnover = {}", p);
        let punt = nyg.absorption.probability(&third, Outcome::Punt).unwrap();
        assert!(punt.abs() < 1e-9);
        let chi = StateKey::Situation { yard: 4, togo: 7, down: 1 };
        assert!(nyg.counts.index(&chi).is_none());
    }

    #[test]
    fn test_filtered_kickoff_does_not_split_drive() {
        // NYG ends the half on a run, then receives the second-half kickoff.
        let events = vec![
            event(1, "NYG", "1", "10", "80", "A.Bradshaw up the middle for 3 yards."),
            event(2, "CHI", "0", "0", "35", "R.Gould kicks 65 yards, Touchback."),
            event(3, "NYG", "1", "10", "80", "E.Manning pass short left for 6 yards."),
            event(4, "NYG", "2", "4", "74", "S.Weatherford punts 48 yards."),
        ];
        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&events);
        assert_eq!(builder.report().filtered, 1);
        assert_eq!(builder.report().drives, 1);

        let model = builder.build().unwrap();
        let opener = StateKey::Situation { yard: 2, togo: 7, down: 1 };
        assert_eq!(model.counts.get(&opener, &opener), 1);
        assert_eq!(model.initial.total(), 1);
    }

    #[test]
    fn test_batches_share_one_graph() {
        let mut builder = ModelBuilder::new(ModelConfig::default());
        builder.add_events(&game());
        builder.add_events(&game());
        assert_eq!(builder.report().sources, 2);
        assert_eq!(builder.report().drives, 6);

        let model = builder.build().unwrap();
        let punt = StateKey::Absorbing(Outcome::Punt);
        // One punt per game
        assert_eq!(model.counts.get(&punt, &punt), 2);
    }
}
