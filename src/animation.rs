//! Tick-driven animations for the loader arc and the metric bars.
//!
//! Both are advanced by the UI loop once per tick; nothing here owns a timer.

pub const LOADER_STEP_DEGREES: u16 = 10;
pub const LOADER_ARC_EXTENT: u16 = 120;
pub const PROGRESS_STEPS: f64 = 20.0;
pub const PROGRESS_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderAnimation {
    angle: u16,
    running: bool,
}

impl LoaderAnimation {
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop spinning and return to the resting angle.
    pub fn stop(&mut self) {
        self.running = false;
        self.angle = 0;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.angle = (self.angle + LOADER_STEP_DEGREES) % 360;
        }
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Chain {
    target: f64,
    step: f64,
    generation: u64,
}

/// A bar value that walks linearly toward its target over a fixed number of ticks.
///
/// Each chain is stamped with the run generation that started it. Ticking with
/// a newer generation discards the chain, so a bar left animating by an
/// earlier run stops as soon as the next run begins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressAnimation {
    value: f64,
    chain: Option<Chain>,
}

impl ProgressAnimation {
    pub fn value(&self) -> f64 {
        self.value
    }

    #[cfg(test)]
    pub fn target(&self) -> Option<f64> {
        self.chain.map(|c| c.target)
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.chain.is_some()
    }

    /// Begin a new chain from the current value, replacing any running one.
    pub fn animate_to(&mut self, target: f64, generation: u64) {
        let target = target.clamp(0.0, PROGRESS_MAX);
        self.chain = Some(Chain {
            target,
            step: (target - self.value) / PROGRESS_STEPS,
            generation,
        });
    }

    /// Empty the bar. A chain still running is left to the generation check.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn tick(&mut self, generation: u64) {
        let Some(chain) = self.chain else {
            return;
        };

        if chain.generation != generation {
            self.chain = None;
            return;
        }

        if chain.step == 0.0 || (self.value - chain.target).abs() < chain.step.abs() {
            self.value = chain.target;
            self.chain = None;
        } else {
            self.value = (self.value + chain.step).clamp(0.0, PROGRESS_MAX);
        }
    }
}
