/// How far past a bust limit a deviation went, as a ratio band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Extra penalty steps contributed by this severity level.
    pub fn steps(self) -> usize {
        match self {
            Severity::None => 0,
            Severity::Mild => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }
}

/// Classifies a deviation against its bust limit.
///
/// Ratios are open upper bounds: a ratio below `mild` is no bust at all.
pub fn classify_severity(
    dev_abs: f64,
    bust_limit: f64,
    mild: f64,
    moderate: f64,
    severe: f64,
) -> Severity {
    if bust_limit == 0.0 {
        return Severity::None;
    }
    let r = dev_abs / bust_limit;
    if r < mild {
        Severity::None
    } else if r < moderate {
        Severity::Mild
    } else if r < severe {
        Severity::Moderate
    } else {
        Severity::Severe
    }
}

pub fn severity_final_altitude(alt_dev_abs: f64) -> Severity {
    classify_severity(alt_dev_abs, 100.0, 1.0, 1.5, 2.5)
}

pub fn severity_final_lateral(lateral_dev_abs_nm: f64) -> Severity {
    classify_severity(lateral_dev_abs_nm, 0.1, 1.0, 1.5, 2.5)
}

pub fn severity_final_speed(speed_dev_abs_kt: f64) -> Severity {
    classify_severity(speed_dev_abs_kt, 10.0, 1.0, 1.5, 2.5)
}

pub fn severity_final_bank(bank_abs_deg: f64) -> Severity {
    classify_severity(bank_abs_deg, 25.0, 1.0, 1.25, 1.6)
}

pub fn severity_threshold_altitude(alt_dev_abs_ft: f64) -> Severity {
    classify_severity(alt_dev_abs_ft, 50.0, 1.0, 1.4, 2.0)
}

pub fn severity_threshold_speed(speed_dev_abs_kt: f64) -> Severity {
    classify_severity(speed_dev_abs_kt, 5.0, 1.0, 1.4, 2.0)
}

pub fn severity_threshold_sink(vs_abs_fpm: f64) -> Severity {
    classify_severity(vs_abs_fpm, 300.0, 1.0, 1.3, 1.8)
}
