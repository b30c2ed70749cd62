//! Damped least squares (Levenberg-Marquardt) for two-parameter models.
//!
//! Minimizes a weighted sum of squared residuals by blending
//! Gauss-Newton with gradient descent: the damping parameter λ grows on
//! rejected steps and shrinks on accepted ones. The normal equations
//! are 2×2, solved in closed form.

/// Solver configuration.
///
/// The λ schedule follows the usual accept/reject discipline: a step
/// that lowers the cost is accepted and λ divided by `lambda_factor`
/// (floored at `min_lambda`); a step that raises it is rejected and λ
/// multiplied by `lambda_factor`, failing once `max_lambda` is
/// exceeded.
#[derive(Debug, Clone)]
pub struct LmConfig {
    /// Maximum number of accepted or rejected iterations.
    pub max_iterations: usize,
    /// Stop once the parameter step norm falls below this.
    pub convergence_threshold: f64,
    /// Initial damping λ.
    pub initial_lambda: f64,
    /// Factor to scale λ up (bad step) or down (good step).
    pub lambda_factor: f64,
    /// Floor for λ after successful steps.
    pub min_lambda: f64,
    /// Ceiling for λ; exceeding it counts as failure to converge.
    pub max_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-9,
            initial_lambda: 1e-3,
            lambda_factor: 10.0,
            min_lambda: 1e-12,
            max_lambda: 1e10,
        }
    }
}

/// Solver output. `converged` is false when the iteration budget ran
/// out, λ hit its ceiling, or the normal matrix went singular; the
/// caller decides how to surface that.
#[derive(Debug, Clone)]
pub struct LmFit {
    pub params: [f64; 2],
    /// Parameter covariance `σ²·(JᵀWJ)⁻¹` with the degrees-of-freedom
    /// corrected variance `σ² = RSS_w / (m - 2)`. `None` when the
    /// normal matrix is singular at the solution.
    pub covariance: Option<[[f64; 2]; 2]>,
    /// Weighted residual sum of squares at the solution.
    pub weighted_rss: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Solves `A x = -g` for a symmetric 2×2 `A`. Returns `None` when `A`
/// is singular.
fn solve_2x2(a: &[[f64; 2]; 2], g: &[f64; 2]) -> Option<[f64; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    if det.abs() < 1e-300 {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        -(a[1][1] * g[0] - a[0][1] * g[1]) * inv_det,
        -(a[0][0] * g[1] - a[1][0] * g[0]) * inv_det,
    ])
}

fn invert_2x2(a: &[[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    if det.abs() < 1e-300 {
        return None;
    }
    let inv_det = 1.0 / det;
    Some([
        [a[1][1] * inv_det, -a[0][1] * inv_det],
        [-a[1][0] * inv_det, a[0][0] * inv_det],
    ])
}

/// Builds the normal equations at `params`.
///
/// Returns `(H, g, wrss)` where `H = JᵀWJ`, `g = JᵀWr`, and `wrss` is
/// the weighted cost. `model` maps `(x, params)` to the predicted value
/// and its gradient with respect to the parameters.
fn build_normal_equations<F>(
    model: &F,
    xs: &[f64],
    ys: &[f64],
    weights: &[f64],
    params: [f64; 2],
) -> ([[f64; 2]; 2], [f64; 2], f64)
where
    F: Fn(f64, [f64; 2]) -> (f64, [f64; 2]),
{
    let mut h = [[0.0f64; 2]; 2];
    let mut g = [0.0f64; 2];
    let mut wrss = 0.0f64;
    for ((&x, &y), &w) in xs.iter().zip(ys).zip(weights) {
        let (value, jac) = model(x, params);
        let r = value - y;
        wrss += w * r * r;
        for i in 0..2 {
            for j in 0..2 {
                h[i][j] += w * jac[i] * jac[j];
            }
            g[i] += w * jac[i] * r;
        }
    }
    (h, g, wrss)
}

fn weighted_cost<F>(model: &F, xs: &[f64], ys: &[f64], weights: &[f64], params: [f64; 2]) -> f64
where
    F: Fn(f64, [f64; 2]) -> (f64, [f64; 2]),
{
    xs.iter()
        .zip(ys)
        .zip(weights)
        .map(|((&x, &y), &w)| {
            let (value, _) = model(x, params);
            let r = value - y;
            w * r * r
        })
        .sum()
}

/// Fits a two-parameter model to `(xs, ys)` with per-point weights.
///
/// `xs`, `ys`, and `weights` must have equal lengths of at least 3 so
/// the degrees-of-freedom correction is defined; callers validate this
/// before reaching the solver.
pub fn fit_two_param<F>(
    model: F,
    xs: &[f64],
    ys: &[f64],
    weights: &[f64],
    init: [f64; 2],
    cfg: &LmConfig,
) -> LmFit
where
    F: Fn(f64, [f64; 2]) -> (f64, [f64; 2]),
{
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert_eq!(xs.len(), weights.len());
    debug_assert!(xs.len() > 2);

    let mut params = init;
    let mut lambda = cfg.initial_lambda;
    let mut cost = weighted_cost(&model, xs, ys, weights, params);
    let mut converged = false;
    let mut iterations = 0;
    let mut final_h = [[0.0f64; 2]; 2];

    for iter in 0..cfg.max_iterations {
        iterations = iter + 1;

        let (h, g, _) = build_normal_equations(&model, xs, ys, weights, params);
        final_h = h;

        let mut h_damped = h;
        h_damped[0][0] += lambda;
        h_damped[1][1] += lambda;

        let Some(delta) = solve_2x2(&h_damped, &g) else {
            break;
        };

        let trial = [params[0] + delta[0], params[1] + delta[1]];
        let trial_cost = weighted_cost(&model, xs, ys, weights, trial);
        let step_norm_sq = delta[0] * delta[0] + delta[1] * delta[1];
        let step_is_negligible =
            step_norm_sq < cfg.convergence_threshold * cfg.convergence_threshold;

        if trial_cost < cost {
            params = trial;
            cost = trial_cost;
            lambda = (lambda / cfg.lambda_factor).max(cfg.min_lambda);
            if step_is_negligible {
                converged = true;
                break;
            }
        } else {
            // A rejected step below resolution cannot improve under more
            // damping either; the iterate is at machine precision.
            if step_is_negligible {
                converged = true;
                break;
            }
            lambda *= cfg.lambda_factor;
            if lambda > cfg.max_lambda {
                break;
            }
        }
    }

    // Covariance from the undamped normal matrix at the solution, with
    // the unbiased variance estimate σ² = RSS_w / (m - 2).
    let dof = (xs.len() as f64 - 2.0).max(1.0);
    let sigma_sq = cost / dof;
    let covariance = invert_2x2(&final_h).map(|inv| {
        [
            [sigma_sq * inv[0][0], sigma_sq * inv[0][1]],
            [sigma_sq * inv[1][0], sigma_sq * inv[1][1]],
        ]
    });
    if covariance.is_none() {
        converged = false;
    }

    LmFit {
        params,
        covariance,
        weighted_rss: cost,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solve_2x2_identity() {
        let a = [[1.0, 0.0], [0.0, 1.0]];
        let x = solve_2x2(&a, &[2.0, -3.0]).unwrap();
        assert_relative_eq!(x[0], -2.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn solve_2x2_singular_is_none() {
        let a = [[1.0, 2.0], [2.0, 4.0]];
        assert!(solve_2x2(&a, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn recovers_exponential_decay_parameters() {
        // y = a * exp(-b x), fit (a, b) from clean samples.
        let model = |x: f64, p: [f64; 2]| {
            let e = (-p[1] * x).exp();
            (p[0] * e, [e, -p[0] * x * e])
        };
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.2).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 2.5 * (-0.7 * x).exp()).collect();
        let weights = vec![1.0; xs.len()];

        let fit = fit_two_param(model, &xs, &ys, &weights, [1.0, 1.0], &LmConfig::default());
        assert!(fit.converged);
        assert_relative_eq!(fit.params[0], 2.5, epsilon = 1e-6);
        assert_relative_eq!(fit.params[1], 0.7, epsilon = 1e-6);
        assert!(fit.weighted_rss < 1e-12);
        assert!(fit.covariance.is_some());
    }

    #[test]
    fn damping_survives_poor_initial_guess() {
        let model = |x: f64, p: [f64; 2]| {
            let e = (-p[1] * x).exp();
            (p[0] * e, [e, -p[0] * x * e])
        };
        let xs: Vec<f64> = (0..30).map(|i| i as f64 * 0.1).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| 4.0 * (-1.5 * x).exp()).collect();
        let weights = vec![1.0; xs.len()];

        let cfg = LmConfig {
            max_iterations: 300,
            ..Default::default()
        };
        let fit = fit_two_param(model, &xs, &ys, &weights, [0.1, 8.0], &cfg);
        assert!(fit.converged);
        assert_relative_eq!(fit.params[0], 4.0, epsilon = 1e-4);
        assert_relative_eq!(fit.params[1], 1.5, epsilon = 1e-4);
    }
}
