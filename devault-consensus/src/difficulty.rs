//! Block difficulty adjustment calculations for contextual validation.
//!
//! DeVault uses Zawy's linearly weighted moving average (LWMA) of the last
//! `N` solve times. Recent solve times get a higher weight, so the target
//! reacts quickly to hash rate changes, without oscillating like a simple
//! moving average.

use chrono::{DateTime, Duration, Utc};

use devault_chain::{
    block::{self, ConsensusHeader},
    chain_view::ChainView,
    parameters::ChainParameters,
    work::difficulty::{CompactDifficulty, ExpandedDifficulty, U512},
};

use crate::error::ContextError;


/// The factor applied to the target spacing to get the longest solve time
/// used by the LWMA, when solve times are limited.
pub const MAX_SOLVETIME_SPACING_FACTOR: i64 = 6;

/// The factor applied to the target spacing to get the gap after which a
/// test network block can use the minimum difficulty.
pub const MIN_DIFFICULTY_GAP_SPACING_FACTOR: i64 = 2;

/// Contains the context needed to calculate the adjusted difficulty for a
/// candidate block.
#[derive(Clone, Debug)]
pub struct AdjustedDifficulty<'p> {
    /// The consensus parameters of the candidate block's network.
    params: &'p ChainParameters,

    /// The `header.time` field from the candidate block.
    candidate_time: DateTime<Utc>,

    /// The height of the tip the candidate block builds on.
    tip_height: block::Height,

    /// The `header.time`s of the window, in height order, ending at the tip.
    ///
    /// Contains up to `N + 1` times, so there are up to `N` solve times.
    relevant_times: Vec<DateTime<Utc>>,

    /// The expanded `header.difficulty_threshold`s of the window, in height
    /// order, ending at the tip.
    ///
    /// Has the same length as `relevant_times`, except on networks without
    /// retargeting, where it is empty. The first header starts the first
    /// solve time, so its threshold is not part of the average.
    relevant_difficulty_thresholds: Vec<ExpandedDifficulty>,
}

impl<'p> AdjustedDifficulty<'p> {
    /// Initialise and return a new [`AdjustedDifficulty`] using `params`, the
    /// `candidate_time`, and a `window` of headers.
    ///
    /// The `window` contains headers in ascending height order, ending at the
    /// tip the candidate block builds on. If it has more than `N + 1` headers,
    /// only the last `N + 1` are used. It can only be shorter if it starts at
    /// the genesis block.
    ///
    /// Note that the `time`s in the window might not be in chronological
    /// order, because block times are supplied by miners.
    pub fn new_from_window(
        params: &'p ChainParameters,
        candidate_time: DateTime<Utc>,
        window: &[ConsensusHeader],
    ) -> Result<AdjustedDifficulty<'p>, ContextError> {
        let averaging_window = params.zawy_lwma_averaging_window() as usize;
        let required = averaging_window + 1;

        let window = &window[window.len().saturating_sub(required)..];
        let first = window.first().ok_or(ContextError::EmptyWindow)?;

        for (previous, header) in window.iter().zip(window.iter().skip(1)) {
            let expected = (previous.height + 1).ok_or(ContextError::NonContiguous {
                expected: block::Height::MAX,
                actual: header.height,
            })?;

            if header.height != expected {
                return Err(ContextError::NonContiguous {
                    expected,
                    actual: header.height,
                });
            }
        }

        // A short window is only valid if there aren't any more blocks to read.
        if window.len() < required && first.height != block::Height::MIN {
            return Err(ContextError::InsufficientContext {
                required,
                available: window.len(),
            });
        }

        // Networks without retargeting never read the window's thresholds.
        let relevant_difficulty_thresholds = if params.pow_no_retargeting() {
            Vec::new()
        } else {
            window
                .iter()
                .map(|header| {
                    header
                        .difficulty_threshold
                        .to_expanded()
                        .ok_or(ContextError::InvalidDifficultyThreshold {
                            height: header.height,
                            threshold: header.difficulty_threshold,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let relevant_times = window.iter().map(|header| header.time).collect();

        let tip_height = window
            .last()
            .expect("already checked the window is not empty")
            .height;

        Ok(AdjustedDifficulty {
            params,
            candidate_time,
            tip_height,
            relevant_times,
            relevant_difficulty_thresholds,
        })
    }

    /// Initialise and return a new [`AdjustedDifficulty`] for a candidate
    /// block built on the tip of `view`.
    ///
    /// Reads the last `N + 1` headers from `view`, or every header back to
    /// genesis on a short chain.
    pub fn new_from_chain<V>(
        params: &'p ChainParameters,
        candidate_time: DateTime<Utc>,
        view: &V,
    ) -> Result<AdjustedDifficulty<'p>, ContextError>
    where
        V: ChainView + ?Sized,
    {
        let tip_height = view.tip_height().ok_or(ContextError::EmptyWindow)?;
        let first_height = tip_height
            .0
            .saturating_sub(params.zawy_lwma_averaging_window());

        let window = (first_height..=tip_height.0)
            .map(block::Height)
            .map(|height| view.header(height).ok_or(ContextError::MissingAncestor(height)))
            .collect::<Result<Vec<_>, _>>()?;

        AdjustedDifficulty::new_from_window(params, candidate_time, &window)
    }

    /// Returns the height of the tip the candidate block builds on.
    pub fn tip_height(&self) -> block::Height {
        self.tip_height
    }

    /// Returns the height of the candidate block, or `None` if the tip is at
    /// the maximum height.
    pub fn candidate_height(&self) -> Option<block::Height> {
        self.tip_height + 1
    }

    /// Returns the difficulty threshold the candidate block must have, in
    /// compact form.
    pub fn expected_difficulty_threshold(&self) -> CompactDifficulty {
        self.next_target().to_compact()
    }

    /// Returns the proof of work target for the candidate block.
    ///
    /// The target is never zero, and never easier than the network's proof of
    /// work limit.
    pub fn next_target(&self) -> ExpandedDifficulty {
        let pow_limit = self.params.pow_limit();

        if self.params.pow_no_retargeting() {
            return pow_limit;
        }

        if self.is_min_difficulty_block() {
            tracing::debug!(
                candidate_height = ?self.candidate_height(),
                candidate_time = ?self.candidate_time,
                "using the minimum difficulty after a long gap between blocks",
            );
            return pow_limit;
        }

        // There are no solve times before the first block.
        if self.relevant_times.len() < 2 {
            return pow_limit;
        }

        self.lwma_target()
    }

    /// Returns `true` if the candidate block is a test network block that
    /// arrived long enough after its parent to use the minimum difficulty.
    fn is_min_difficulty_block(&self) -> bool {
        if !self.params.pow_allow_min_difficulty_blocks() {
            return false;
        }

        let tip_time = *self
            .relevant_times
            .last()
            .expect("adjusted difficulty windows are never empty");
        let gap = self
            .params
            .pow_target_spacing()
            .saturating_mul(MIN_DIFFICULTY_GAP_SPACING_FACTOR);

        Duration::try_seconds(gap)
            .and_then(|gap| tip_time.checked_add_signed(gap))
            .map_or(false, |earliest| self.candidate_time > earliest)
    }

    /// Returns the solve times of the window, oldest first.
    ///
    /// If the network limits solve times, each one is clamped into
    /// `1..=6 * T`.
    fn solve_times(&self) -> impl Iterator<Item = i64> + '_ {
        let spacing = self.params.pow_target_spacing();
        let limit = self.params.zawy_lwma_solvetime_limitation();

        self.relevant_times
            .iter()
            .zip(self.relevant_times.iter().skip(1))
            .map(move |(previous, current)| {
                let solve_time = (*current - *previous).num_seconds();

                if limit {
                    solve_time.clamp(1, spacing.saturating_mul(MAX_SOLVETIME_SPACING_FACTOR))
                } else {
                    solve_time
                }
            })
    }

    /// Returns the adjusted weight `k` for a window with `intervals` solve
    /// times.
    ///
    /// A full window uses the configured `k`. Near genesis, `k` is scaled to
    /// the shorter window, so steady state blocks still keep their target.
    fn adjusted_weight(&self, intervals: u64) -> u128 {
        let averaging_window = u64::from(self.params.zawy_lwma_averaging_window());
        let k = u128::from(self.params.zawy_lwma_adjusted_weight());

        if intervals >= averaging_window {
            k
        } else {
            (k * u128::from(intervals + 1) / u128::from(averaging_window + 1)).max(1)
        }
    }

    /// Calculate the LWMA target for the window.
    ///
    /// `next = average_target * weighted_solve_times / (k * N)`, computed as
    /// `sum_targets * weighted_solve_times / (k * N * N)` in 512-bit
    /// arithmetic, so it never overflows or loses precision to an early
    /// division.
    fn lwma_target(&self) -> ExpandedDifficulty {
        let pow_limit = self.params.pow_limit();
        let min_denominator = self.params.zawy_lwma_min_denominator();

        // The tip's parent starts the first solve time, so its target isn't
        // part of the average.
        let targets = &self.relevant_difficulty_thresholds[1..];
        let intervals = targets.len() as u64;
        let k = self.adjusted_weight(intervals);

        let weighted_solve_times: i128 = self
            .solve_times()
            .zip(1i128..)
            .map(|(solve_time, weight)| i128::from(solve_time) * weight)
            .sum();

        // Keep the ratio to the target spacing at or above 1 / min_denominator.
        let k_n = k * u128::from(intervals);
        let min_weighted_solve_times = (k_n / u128::from(min_denominator)).max(1);
        let weighted_solve_times = u128::try_from(weighted_solve_times)
            .unwrap_or(0)
            .max(min_weighted_solve_times);

        let sum_targets: U512 = targets
            .iter()
            .map(|target| U512::from(target.as_u256()))
            .fold(U512::zero(), |sum, target| sum + target);
        let average_target = sum_targets / U512::from(intervals);

        let next_target = sum_targets * U512::from(weighted_solve_times)
            / (U512::from(k_n) * U512::from(intervals));

        let min_target = (average_target / U512::from(min_denominator)).max(U512::one());
        let next_target = next_target.max(min_target);

        let next_target = next_target
            .checked_to_u256()
            .map(ExpandedDifficulty::from)
            .map_or(pow_limit, |target| target.min(pow_limit));

        tracing::trace!(
            candidate_height = ?self.candidate_height(),
            intervals,
            adjusted_weight = %k,
            weighted_solve_times = %weighted_solve_times,
            ?next_target,
            "calculated LWMA target",
        );

        next_target
    }
}

/// Returns the proof of work target for a candidate block with
/// `candidate_time`, built on the last header in `window`.
///
/// `window` holds the most recent `N + 1` headers in ascending height order,
/// or every header back to genesis on a short chain.
///
/// # Correctness
///
/// Returns an error if `window` is empty, is not contiguous, or is too short
/// without starting at genesis. On networks that retarget, an invalid
/// difficulty threshold in `window` is also an error.
#[tracing::instrument(skip(params, window), fields(window_len = window.len()))]
pub fn next_target(
    params: &ChainParameters,
    candidate_time: DateTime<Utc>,
    window: &[ConsensusHeader],
) -> Result<ExpandedDifficulty, ContextError> {
    let adjusted = AdjustedDifficulty::new_from_window(params, candidate_time, window)?;
    let next_target = adjusted.next_target();

    tracing::debug!(
        candidate_height = ?adjusted.candidate_height(),
        ?next_target,
        "calculated next proof of work target",
    );

    Ok(next_target)
}

/// Returns the difficulty threshold a candidate block with `candidate_time`,
/// built on the tip of `view`, must have.
#[tracing::instrument(skip(params, view))]
pub fn expected_difficulty_threshold<V>(
    params: &ChainParameters,
    candidate_time: DateTime<Utc>,
    view: &V,
) -> Result<CompactDifficulty, ContextError>
where
    V: ChainView + ?Sized,
{
    let adjusted = AdjustedDifficulty::new_from_chain(params, candidate_time, view)?;
    let threshold = adjusted.expected_difficulty_threshold();

    tracing::debug!(
        candidate_height = ?adjusted.candidate_height(),
        ?threshold,
        "calculated expected difficulty threshold",
    );

    Ok(threshold)
}
