/// Options for the windowed bust filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BustWindowOptions {
    /// Fraction of bad samples at which the window busts.
    pub percent_bad_limit: f64,
    /// Consecutive bad samples at which the window busts.
    pub max_consecutive_limit: usize,
}

impl Default for BustWindowOptions {
    fn default() -> Self {
        Self { percent_bad_limit: 0.2, max_consecutive_limit: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BustWindowResult {
    pub is_busted: bool,
    pub percent_bad: f64,
    pub max_consecutive_bad: usize,
}

/// Windowed bust policy: instead of a single worst sample, a window busts
/// when bad samples are either frequent or sustained.
pub fn bust_window<T>(
    samples: &[T],
    is_bad: impl Fn(&T) -> bool,
    opts: BustWindowOptions,
) -> BustWindowResult {
    if samples.is_empty() {
        return BustWindowResult { is_busted: false, percent_bad: 0.0, max_consecutive_bad: 0 };
    }

    let mut bad = 0usize;
    let mut consecutive = 0usize;
    let mut max_consecutive = 0usize;
    for sample in samples {
        if is_bad(sample) {
            bad += 1;
            consecutive += 1;
            max_consecutive = max_consecutive.max(consecutive);
        } else {
            consecutive = 0;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let percent_bad = bad as f64 / samples.len() as f64;
    BustWindowResult {
        is_busted: percent_bad >= opts.percent_bad_limit
            || max_consecutive >= opts.max_consecutive_limit,
        percent_bad,
        max_consecutive_bad: max_consecutive,
    }
}
