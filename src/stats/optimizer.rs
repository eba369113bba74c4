//! Derivative-free minimization (Nelder-Mead simplex).

use std::cmp::Ordering;

/// Nelder-Mead settings.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    pub tolerance: f64,
    /// Offset applied along each axis to build the initial simplex.
    pub initial_step: f64,
    pub alpha: f64,
    pub gamma: f64,
    pub rho: f64,
    pub sigma: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-10,
            initial_step: 0.5,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `f` starting from `initial`. Non-finite objective values are
/// treated as `+inf`, so the simplex moves away from them.
pub fn nelder_mead<F>(f: F, initial: &[f64], config: NelderMeadConfig) -> OptimizationResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        return OptimizationResult {
            optimal_point: Vec::new(),
            optimal_value: eval(&[]),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((initial.to_vec(), eval(initial)));
    for i in 0..n {
        let mut point = initial.to_vec();
        point[i] += config.initial_step;
        let value = eval(&point);
        simplex.push((point, value));
    }

    let by_value = |a: &(Vec<f64>, f64), b: &(Vec<f64>, f64)| {
        a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal)
    };

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        simplex.sort_by(by_value);
        let best = simplex[0].1;
        let worst = simplex[n].1;

        if best.is_finite()
            && (worst - best).abs() <= config.tolerance * (best.abs() + config.tolerance)
        {
            converged = true;
            break;
        }
        iterations += 1;

        // Centroid of all points but the worst
        let mut centroid = vec![0.0; n];
        for (point, _) in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(point) {
                *c += x / n as f64;
            }
        }

        let along = |from: &[f64], coef: f64, to: &[f64]| -> Vec<f64> {
            from.iter()
                .zip(to)
                .map(|(c, x)| c + coef * (x - c))
                .collect()
        };

        let reflected = along(&centroid, -config.alpha, &simplex[n].0);
        let f_reflected = eval(&reflected);

        if f_reflected < best {
            let expanded = along(&centroid, config.gamma, &reflected);
            let f_expanded = eval(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }

        if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
            continue;
        }

        let contracted = if f_reflected < worst {
            along(&centroid, config.rho, &reflected)
        } else {
            along(&centroid, config.rho, &simplex[n].0)
        };
        let f_contracted = eval(&contracted);

        if f_contracted < f_reflected.min(worst) {
            simplex[n] = (contracted, f_contracted);
            continue;
        }

        // Shrink toward the best point
        let best_point = simplex[0].0.clone();
        for entry in simplex.iter_mut().skip(1) {
            let shrunk = along(&best_point, config.sigma, &entry.0);
            let value = eval(&shrunk);
            *entry = (shrunk, value);
        }
    }

    simplex.sort_by(by_value);
    let (optimal_point, optimal_value) = simplex.swap_remove(0);

    OptimizationResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}
