#[cfg(feature = "progressbar")]
use std::io::Stdout;
use std::time::Duration;

use rand::RngCore;
use rand_pcg::Pcg64Mcg;
use took::Timer;

pub mod logging;

pub type Random = Pcg64Mcg;

pub fn create_seeded_rng(seed: i128) -> Random {
    // the multiplicative generator forces the lowest state bit, keep the seed above it
    let mut rng = Pcg64Mcg::new((seed as u128) << 1);
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

pub enum TimeLimit {
    Duration(Duration),
    None,
}

impl TimeLimit {
    pub fn from_seconds(seconds: Option<f64>) -> Self {
        match seconds {
            // limits beyond what a `Duration` holds never run out
            Some(value) => Duration::try_from_secs_f64(value).map_or(Self::None, Self::Duration),
            None => Self::None,
        }
    }
    pub fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            _ => false,
        }
    }
}

pub struct Countdown {
    start: Timer,
    time_limit: TimeLimit,
}

impl Countdown {
    pub fn new(start: Timer, limit: TimeLimit) -> Self {
        Self {
            start,
            time_limit: limit,
        }
    }

    pub fn empty() -> Self {
        Self {
            start: Timer::new(),
            time_limit: TimeLimit::None,
        }
    }

    pub fn time_remaining(&self) -> Duration {
        if let TimeLimit::Duration(value) = self.time_limit {
            value.saturating_sub(self.time_elapsed())
        } else {
            Duration::MAX
        }
    }

    pub fn is_finished(&self) -> bool {
        self.time_remaining().is_zero()
    }

    pub fn is_time_remaining(&self) -> bool {
        !self.is_finished()
    }

    pub fn time_elapsed(&self) -> Duration {
        self.start.took().into_std()
    }
}

/// Observer for the search loops; values are violation counts.
pub trait SearchProgressIterationTracker {
    fn update(&mut self, best: Option<usize>, current: Option<usize>);
    fn inc(&mut self);
    fn add(&mut self, i: u64);
}

pub struct DisabledSearchTracker {}

impl DisabledSearchTracker {
    pub fn new(_total: u64) -> Self {
        Self {}
    }
}

impl SearchProgressIterationTracker for DisabledSearchTracker {
    fn update(&mut self, _: Option<usize>, _: Option<usize>) {}
    fn inc(&mut self) {}
    fn add(&mut self, _: u64) {}
}

#[cfg(feature = "progressbar")]
pub struct PBRSearchTracker {
    progressbar: pbr::ProgressBar<Stdout>,
}

#[cfg(feature = "progressbar")]
impl PBRSearchTracker {
    pub fn new(total: u64) -> Self {
        Self {
            progressbar: pbr::ProgressBar::new(total),
        }
    }
}

#[cfg(feature = "progressbar")]
impl Drop for PBRSearchTracker {
    fn drop(&mut self) {
        self.progressbar.finish_println("");
    }
}

#[cfg(feature = "progressbar")]
impl SearchProgressIterationTracker for PBRSearchTracker {
    fn update(&mut self, best: Option<usize>, current: Option<usize>) {
        self.progressbar.message(
            format!(
                "best {} | current {} | ",
                best.map(|it| it.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                current
                    .map(|it| it.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .as_str(),
        );
    }

    fn inc(&mut self) {
        self.progressbar.inc();
    }

    fn add(&mut self, i: u64) {
        self.progressbar.add(i);
    }
}

#[cfg(feature = "progressbar")]
pub type DefaultSearchTracker = PBRSearchTracker;

#[cfg(not(feature = "progressbar"))]
pub type DefaultSearchTracker = DisabledSearchTracker;
