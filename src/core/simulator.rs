//! Two-compartment healthy/infected model integrated with explicit Euler.
//!
//! ```text
//! dH/dt = a*H - b*H*I + e*I
//! dI/dt = b*H*I + (c - d - e)*I
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub healthy0: f64,
    pub infected0: f64,
    pub steps: usize,
    pub dt: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            a: 0.012,
            b: 0.01,
            c: 0.0001,
            d: 0.02,
            e: 0.98,
            healthy0: 100.0,
            infected0: 60.0,
            steps: 300,
            dt: 0.1,
        }
    }
}

impl SimulationParams {
    /// Evaluates (dH/dt, dI/dt) at the given state.
    pub fn derivatives(&self, healthy: f64, infected: f64) -> (f64, f64) {
        let contact = self.b * healthy * infected;
        (
            self.a * healthy - contact + self.e * infected,
            contact + (self.c - self.d - self.e) * infected,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub time: f64,
    pub healthy: f64,
    pub infected: f64,
}

/// Integrates the model for `params.steps` fixed steps.
///
/// Entry `i` is the state at `i * dt`, entry 0 being the initial condition.
/// Both updates use the pre-step state, and each variable is clamped at zero
/// after the step. A step that produces NaN is clamped to zero as well.
pub fn simulate(params: &SimulationParams) -> Vec<SimulationState> {
    let mut states = Vec::with_capacity(params.steps);
    let mut healthy = params.healthy0;
    let mut infected = params.infected0;

    for i in 0..params.steps {
        states.push(SimulationState {
            time: i as f64 * params.dt,
            healthy,
            infected,
        });

        let (d_healthy, d_infected) = params.derivatives(healthy, infected);
        healthy += params.dt * d_healthy;
        infected += params.dt * d_infected;

        // `max` also maps NaN (e.g. inf - inf on divergence) to zero.
        healthy = healthy.max(0.0);
        infected = infected.max(0.0);
    }

    states
}
