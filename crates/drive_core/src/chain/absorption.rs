//! # Absorption probabilities
//!
//! For a transition matrix `P` whose first `m` states are absorbing, the
//! probability `x_k[s]` that a chain started in `s` ends in absorbing state
//! `k` solves
//!
//! ```text
//! (P - I) x_k = 0      on transient rows
//!         x_k = e_k    on absorbing rows
//! ```
//!
//! Both conditions live in one matrix `A`: `P - I` with its first `m` rows
//! replaced by identity rows. `A` is factorized once and solved for each
//! right-hand side `e_k`.

use nalgebra::{DMatrix, DVector};

use super::matrix::TransitionMatrix;
use super::state_key::StateKey;
use crate::error::{ModelError, Result};
use crate::play::Outcome;

/// Transient rows whose outcome probabilities stray further than this from
/// one are logged.
pub const ABSORPTION_SUM_TOLERANCE: f64 = 1e-6;

/// Solve the absorption systems of `p` with `absorbing` leading absorbing
/// states. Returns an `n × absorbing` matrix.
pub fn solve_absorption(p: &DMatrix<f64>, absorbing: usize) -> Result<DMatrix<f64>> {
    let n = p.nrows();
    if n != p.ncols() {
        return Err(ModelError::NotSquare {
            rows: n,
            cols: p.ncols(),
        });
    }
    if absorbing > n {
        return Err(ModelError::MisalignedStates {
            expected: absorbing,
            found: Vec::new(),
        });
    }

    let mut a = p - DMatrix::<f64>::identity(n, n);
    for i in 0..absorbing {
        a.row_mut(i).fill(0.0);
        a[(i, i)] = 1.0;
    }

    let lu = a.lu();
    let mut result = DMatrix::<f64>::zeros(n, absorbing);
    for k in 0..absorbing {
        let mut e_k = DVector::<f64>::zeros(n);
        e_k[k] = 1.0;

        let x = lu
            .solve(&e_k)
            .filter(|x| x.iter().all(|v| v.is_finite()))
            .ok_or(ModelError::SingularSystem { column: k })?
            .map(unit_probability);
        result.set_column(k, &x);
    }

    Ok(result)
}

/// Clamp LU round-off into `[0, 1]`; `-0.0` becomes `0.0`.
fn unit_probability(v: f64) -> f64 {
    let v = v.clamp(0.0, 1.0);
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Absorption probabilities per state and outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsorptionResult {
    keys: Vec<StateKey>,
    /// rows = `keys`, columns = `Outcome::ALL`
    probs: DMatrix<f64>,
}

impl AbsorptionResult {
    /// Solve for all five outcomes. The first five keys of `trans` must be
    /// the absorbing keys in `Outcome::ALL` order.
    pub fn solve(trans: &TransitionMatrix) -> Result<Self> {
        let keys = trans.keys();
        let expected = StateKey::absorbing_keys();
        if keys.len() < expected.len() || keys[..expected.len()] != expected {
            return Err(ModelError::MisalignedStates {
                expected: expected.len(),
                found: keys.iter().take(expected.len()).copied().collect(),
            });
        }

        let probs = solve_absorption(trans.matrix(), Outcome::COUNT)?;

        for (i, key) in keys.iter().enumerate().skip(Outcome::COUNT) {
            let total: f64 = probs.row(i).iter().sum();
            if (total - 1.0).abs() > ABSORPTION_SUM_TOLERANCE {
                log::warn!("State {} absorbs with total probability {:.6}", key, total);
            }
        }
        log::info!("Absorption solved for {} states", keys.len());

        Ok(Self {
            keys: keys.to_vec(),
            probs,
        })
    }

    pub fn keys(&self) -> &[StateKey] {
        &self.keys
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.probs
    }

    pub fn probability(&self, state: &StateKey, outcome: Outcome) -> Option<f64> {
        let i = self.keys.iter().position(|k| k == state)?;
        Some(self.probs[(i, outcome.index())])
    }

    /// All five outcome probabilities of one state, in `Outcome::ALL` order.
    pub fn row(&self, state: &StateKey) -> Option<[f64; Outcome::COUNT]> {
        let i = self.keys.iter().position(|k| k == state)?;
        Some(std::array::from_fn(|k| self.probs[(i, k)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{CountMatrix, TransitionGraph};
    use crate::drive::segment;
    use crate::play::{CanonicalPlay, Situation};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_two_state_chain() {
        // A absorbing, T -> A with probability 1
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 0.0]);
        let x = solve_absorption(&p, 1).unwrap();
        assert_eq!(x.shape(), (2, 1));
        assert_close(x[(0, 0)], 1.0);
        assert_close(x[(1, 0)], 1.0);
    }

    #[test]
    fn test_gamblers_ruin() {
        // Fair-coin walk on 0..=3, both ends absorbing. Order: [0, 3, 1, 2]
        #[rustfmt::skip]
        let p = DMatrix::from_row_slice(4, 4, &[
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.5, 0.0, 0.0, 0.5,
            0.0, 0.5, 0.5, 0.0,
        ]);
        let x = solve_absorption(&p, 2).unwrap();
        assert_close(x[(2, 0)], 2.0 / 3.0);
        assert_close(x[(2, 1)], 1.0 / 3.0);
        assert_close(x[(3, 0)], 1.0 / 3.0);
        assert_close(x[(3, 1)], 2.0 / 3.0);
    }

    #[test]
    fn test_no_negative_zero() {
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let x = solve_absorption(&p, 1).unwrap();
        assert!(x.iter().all(|v| v.is_sign_positive() && *v <= 1.0), "{}", x);
        assert_eq!(x[(1, 0)].to_string(), "0");

        assert_eq!(unit_probability(-0.0).to_string(), "0");
        assert_eq!(unit_probability(-1e-17), 0.0);
        assert_eq!(unit_probability(1.0 + 1e-15), 1.0);
        assert_eq!(unit_probability(0.25), 0.25);
    }

    #[test]
    fn test_singular_system() {
        // A zero row of P becomes -e_i in A: still invertible, and the
        // state never absorbs.
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let x = solve_absorption(&p, 1).unwrap();
        assert_close(x[(1, 0)], 0.0);

        // A closed transient self-loop gives a zero row in A.
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            solve_absorption(&p, 1),
            Err(ModelError::SingularSystem { column: 0 })
        ));
    }

    #[test]
    fn test_not_square() {
        let p = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(solve_absorption(&p, 1), Err(ModelError::NotSquare { .. })));
    }

    #[test]
    fn test_solve_drive_chain() {
        let reg = |yard, togo, down| CanonicalPlay::regular("KC", Situation::new(down, togo, yard));
        let mut graph = TransitionGraph::new();
        let drives = vec![
            vec![reg(7, 10, 1), reg(6, 10, 1), CanonicalPlay::terminal("KC", Outcome::Touchdown)],
            vec![reg(7, 10, 1), reg(7, 10, 2), CanonicalPlay::terminal("KC", Outcome::Punt)],
            vec![reg(7, 10, 1), reg(6, 10, 1), CanonicalPlay::terminal("KC", Outcome::FieldGoal)],
        ];
        for plays in drives {
            for drive in segment(plays) {
                graph.add_drive(&drive);
            }
        }
        let trans = TransitionMatrix::normalize(&CountMatrix::from_graph(&graph.finalize()));
        trans.ensure_stochastic().unwrap();

        let result = AbsorptionResult::solve(&trans).unwrap();
        let start = StateKey::Situation { yard: 7, togo: 10, down: 1 };
        let row = result.row(&start).unwrap();
        assert_close(row[Outcome::Touchdown.index()], 1.0 / 3.0);
        assert_close(row[Outcome::FieldGoal.index()], 1.0 / 3.0);
        assert_close(row[Outcome::Punt.index()], 1.0 / 3.0);
        assert_close(row.iter().sum::<f64>(), 1.0);

        // Absorbing states are their own indicator
        for outcome in Outcome::ALL {
            let r = result.row(&StateKey::Absorbing(outcome)).unwrap();
            for other in Outcome::ALL {
                let expected = if other == outcome { 1.0 } else { 0.0 };
                assert_close(r[other.index()], expected);
            }
        }
    }

    #[test]
    fn test_misaligned_states() {
        // Unfinalized graph: absorbing block incomplete
        let trans = TransitionMatrix::from_parts(
            vec![StateKey::Absorbing(Outcome::Punt)],
            DMatrix::identity(1, 1),
        )
        .unwrap();
        assert!(matches!(
            AbsorptionResult::solve(&trans),
            Err(ModelError::MisalignedStates { expected: 5, .. })
        ));
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: with every transient row leaking some mass straight
            /// into an absorbing state, each transient row absorbs with total 1
            #[test]
            fn prop_transient_rows_absorb(weights in proptest::collection::vec(1u32..10, 4 * 6)) {
                let m = 2;
                let n = 6;
                let mut p = DMatrix::<f64>::zeros(n, n);
                for i in 0..m {
                    p[(i, i)] = 1.0;
                }
                for i in m..n {
                    let row = &weights[(i - m) * n..(i - m + 1) * n];
                    let total: u32 = row.iter().sum();
                    for j in 0..n {
                        p[(i, j)] = row[j] as f64 / total as f64;
                    }
                }
                let x = solve_absorption(&p, m).unwrap();
                for i in m..n {
                    let total: f64 = x.row(i).iter().sum();
                    prop_assert!((total - 1.0).abs() < 1e-9);
                    for k in 0..m {
                        prop_assert!((0.0..=1.0).contains(&x[(i, k)]));
                    }
                }
            }
        }
    }
}
