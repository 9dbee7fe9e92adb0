//! Bounded backtracking solver for number pyramids.
//!
//! The solver first repairs everything that can be deduced. If that does not
//! finish the pyramid, it guesses values for the bottom layer from left to
//! right, repairing after every guess and pruning branches where a child
//! already exceeds its parent. Each branch works on its own copy of the
//! pyramid; only the solution list is shared.

use std::ops::RangeInclusive;
use std::time::Instant;

use log::{debug, info, trace};

use crate::error::PyramidError;
use crate::pruning::{is_feasible, max_value};
use crate::pyramid::{Cell, Pyramid, Value};
use crate::repair::{repair, repaired};

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Stop searching once this many solutions have been found
    pub max_solutions: usize,
    /// Guessing bound for bottom cells with no known value above them.
    /// Solutions that need a larger value are never found.
    pub global_max_value: Value,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_solutions: 10,
            global_max_value: 10_000,
        }
    }
}

/// Result of the solver search
#[derive(Debug, Clone, Default)]
pub struct SolverResult {
    /// Solved pyramids in the order the search reached them
    pub solutions: Vec<Pyramid>,
    /// False when the solution cap cut the search short
    pub search_exhausted: bool,
    /// Number of guessed values placed in the bottom layer
    pub candidates_tried: usize,
    /// Guesses rejected because a child exceeded its parent
    pub branches_pruned: usize,
    /// Guesses for the last bottom cell that repair could not finish
    pub dead_ends: usize,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

/// Mutable state shared by all branches of one search.
struct Search<'a> {
    config: &'a SolverConfig,
    /// Index of the bottom layer
    bottom: usize,
    solutions: Vec<Pyramid>,
    stopped: bool,
    candidates_tried: usize,
    branches_pruned: usize,
    dead_ends: usize,
}

impl<'a> Search<'a> {
    fn new(config: &'a SolverConfig, pyramid: &Pyramid) -> Self {
        Self {
            config,
            bottom: pyramid.height().saturating_sub(1),
            solutions: Vec::new(),
            stopped: false,
            candidates_tried: 0,
            branches_pruned: 0,
            dead_ends: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.solutions.len() >= self.config.max_solutions
    }

    fn record(&mut self, solution: Pyramid) {
        if self.is_full() {
            self.stopped = true;
            return;
        }
        debug!("solution #{} found", self.solutions.len() + 1);
        self.solutions.push(solution);
    }

    /// Values worth trying for a bottom cell: its own value when known,
    /// otherwise `0` up to (but excluding) its upper bound.
    fn candidates(&self, pyramid: &Pyramid, brick: usize) -> RangeInclusive<Value> {
        match pyramid.get(self.bottom, brick) {
            Some(value) => value..=value,
            None => {
                let bound = max_value(pyramid, self.bottom, brick, self.config.global_max_value);
                0..=bound.saturating_sub(1)
            }
        }
    }

    /// Try every candidate for bottom cell `brick`, recursing to the right.
    fn guess(&mut self, pyramid: &Pyramid, brick: usize) {
        if self.is_full() {
            self.stopped = true;
            return;
        }

        let candidates = self.candidates(pyramid, brick);
        trace!("guess: brick {} in {:?}", brick, candidates);

        for value in candidates {
            if self.is_full() {
                debug!("solution cap of {} reached", self.config.max_solutions);
                self.stopped = true;
                return;
            }
            self.candidates_tried += 1;

            let mut candidate = pyramid.with_value(self.bottom, brick, value);
            if !is_feasible(&candidate) {
                trace!("guess: brick {} = {} is infeasible", brick, value);
                self.branches_pruned += 1;
                continue;
            }

            repair(&mut candidate);
            if candidate.is_solved() {
                self.record(candidate);
            } else if brick < self.bottom {
                self.guess(&candidate, brick + 1);
            } else {
                self.dead_ends += 1;
            }
        }
    }
}

/// Search for solutions of `pyramid`, collecting statistics along the way.
///
/// Returns at most `config.max_solutions` solved pyramids. Equal solutions
/// reached through different guesses are all kept.
pub fn search(pyramid: &Pyramid, config: &SolverConfig) -> SolverResult {
    let start_time = Instant::now();
    info!(
        "solving pyramid with {} layers, {} unknown cells",
        pyramid.height(),
        pyramid.unknown_count()
    );

    let mut search = Search::new(config, pyramid);

    let repaired = repaired(pyramid.clone());
    if repaired.is_solved() {
        debug!("solved by repair alone");
        search.record(repaired);
    } else {
        search.guess(&repaired, 0);
    }

    let result = SolverResult {
        solutions: search.solutions,
        search_exhausted: !search.stopped,
        candidates_tried: search.candidates_tried,
        branches_pruned: search.branches_pruned,
        dead_ends: search.dead_ends,
        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
    };

    info!(
        "found {} solution(s) after {} candidates ({} pruned, {} dead ends) in {} ms",
        result.solutions.len(),
        result.candidates_tried,
        result.branches_pruned,
        result.dead_ends,
        result.time_elapsed_ms
    );
    result
}

/// Find up to `config.max_solutions` solutions of `pyramid`.
pub fn solve(pyramid: &Pyramid, config: &SolverConfig) -> Vec<Pyramid> {
    search(pyramid, config).solutions
}

/// Validate raw layers, then solve them.
///
/// Fails with [`PyramidError::InvalidShape`] before any solving work when the
/// layers do not form a pyramid.
pub fn solve_layers(
    layers: Vec<Vec<Cell>>,
    config: &SolverConfig,
) -> Result<Vec<Pyramid>, PyramidError> {
    let pyramid = Pyramid::new(layers)?;
    Ok(solve(&pyramid, config))
}
