use super::grade::{Grade, GRADE_LADDER};
use super::skill::SkillLevel;

/// Target bank angle for a 360 degree steep turn.
pub const TARGET_BANK: f64 = 45.0;

/// Per-grade bank band: average error from 45 degrees and peak deviation
/// must both hold for the band to apply.
#[derive(Debug, Clone, Copy)]
struct BankBand {
    avg_error: f64,
    max_dev: f64,
}

struct SteepTurnScale {
    bank: [BankBand; 12],
    altitude: [f64; 12],
    airspeed: [f64; 12],
}

const fn band(avg_error: f64, max_dev: f64) -> BankBand { BankBand { avg_error, max_dev } }

static PRO: SteepTurnScale = SteepTurnScale {
    bank: [
        band(0.5, 1.0),
        band(1.0, 2.0),
        band(2.0, 3.0),
        band(3.0, 4.0),
        band(4.0, 5.0),
        band(5.0, 6.0),
        band(6.0, 7.0),
        band(7.0, 8.0),
        band(8.0, 9.0),
        band(9.0, 10.0),
        band(10.0, 12.0),
        band(12.0, 15.0),
    ],
    altitude: [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0, 120.0, 150.0, 200.0, 250.0],
    airspeed: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0, 20.0, 25.0],
};

static NOVICE: SteepTurnScale = SteepTurnScale {
    bank: [
        band(1.0, 2.0),
        band(2.0, 4.0),
        band(3.0, 6.0),
        band(5.0, 8.0),
        band(7.0, 10.0),
        band(9.0, 12.0),
        band(12.0, 15.0),
        band(15.0, 18.0),
        band(18.0, 22.0),
        band(22.0, 25.0),
        band(25.0, 30.0),
        band(30.0, 35.0),
    ],
    altitude: [20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 150.0, 180.0, 220.0, 250.0, 300.0, 350.0],
    airspeed: [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 22.0, 25.0, 30.0, 35.0],
};

static BEGINNER: SteepTurnScale = SteepTurnScale {
    bank: [
        band(2.0, 4.0),
        band(4.0, 8.0),
        band(6.0, 12.0),
        band(10.0, 15.0),
        band(15.0, 20.0),
        band(20.0, 25.0),
        band(25.0, 30.0),
        band(30.0, 35.0),
        band(35.0, 40.0),
        band(40.0, 45.0),
        band(45.0, 50.0),
        band(50.0, 55.0),
    ],
    altitude: [40.0, 80.0, 120.0, 160.0, 200.0, 240.0, 280.0, 320.0, 360.0, 400.0, 450.0, 500.0],
    airspeed: [4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0, 36.0, 40.0, 45.0, 50.0],
};

/// Dev gets the pro scale: the dev profile only loosens pass tolerances,
/// not the grade bands.
fn scale(skill: SkillLevel) -> &'static SteepTurnScale {
    match skill {
        SkillLevel::Novice => &NOVICE,
        SkillLevel::Beginner => &BEGINNER,
        SkillLevel::Pro | SkillLevel::Dev => &PRO,
    }
}

pub fn grade_bank(avg_bank_error: f64, max_bank_dev: f64, skill: SkillLevel) -> Grade {
    for (i, b) in scale(skill).bank.iter().enumerate() {
        if avg_bank_error <= b.avg_error && max_bank_dev <= b.max_dev {
            return GRADE_LADDER[i];
        }
    }
    Grade::F
}

pub fn grade_altitude(max_alt_dev: f64, skill: SkillLevel) -> Grade {
    grade_single(max_alt_dev, &scale(skill).altitude)
}

pub fn grade_airspeed(max_spd_dev: f64, skill: SkillLevel) -> Grade {
    grade_single(max_spd_dev, &scale(skill).airspeed)
}

fn grade_single(dev: f64, thresholds: &[f64; 12]) -> Grade {
    for (i, limit) in thresholds.iter().enumerate() {
        if dev <= *limit {
            return GRADE_LADDER[i];
        }
    }
    Grade::F
}

/// Categories whose pass tolerance was exceeded during the turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SteepTurnBusts {
    pub alt: bool,
    pub spd: bool,
    pub bank: bool,
}

impl SteepTurnBusts {
    pub fn count(self) -> usize {
        usize::from(self.alt) + usize::from(self.spd) + usize::from(self.bank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SteepTurnGradeResult {
    pub final_grade: Grade,
    pub bank_grade: Grade,
    pub alt_grade: Grade,
    pub spd_grade: Grade,
    pub avg_bank_error: f64,
    pub max_bank_dev: f64,
    pub max_alt_dev: f64,
    pub max_spd_dev: f64,
}

/// Grades a completed steep turn from its deviation summary.
///
/// Final grade is the worst of the three category grades, then capped by
/// bust penalties: altitude or airspeed bust caps at C-, a bank bust caps
/// at D, two or more busts force F.
pub fn grade_steep_turn(
    avg_bank: f64,
    max_bank_dev: f64,
    max_alt_dev: f64,
    max_spd_dev: f64,
    busted: SteepTurnBusts,
    skill: SkillLevel,
) -> SteepTurnGradeResult {
    let avg_bank_error = (avg_bank - TARGET_BANK).abs();
    let bank_dev_abs = max_bank_dev.abs();
    let alt_dev_abs = max_alt_dev.abs();
    let spd_dev_abs = max_spd_dev.abs();

    let bank_grade = grade_bank(avg_bank_error, bank_dev_abs, skill);
    let alt_grade = grade_altitude(alt_dev_abs, skill);
    let spd_grade = grade_airspeed(spd_dev_abs, skill);

    let mut final_grade = bank_grade.worse(alt_grade).worse(spd_grade);
    if busted.alt || busted.spd {
        final_grade = final_grade.cap(Grade::CMinus);
    }
    if busted.bank {
        final_grade = final_grade.cap(Grade::D);
    }
    if busted.count() >= 2 {
        final_grade = Grade::F;
    }

    SteepTurnGradeResult {
        final_grade,
        bank_grade,
        alt_grade,
        spd_grade,
        avg_bank_error,
        max_bank_dev: bank_dev_abs,
        max_alt_dev: alt_dev_abs,
        max_spd_dev: spd_dev_abs,
    }
}
