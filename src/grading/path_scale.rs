use super::grade::{Grade, GRADE_LADDER};
use super::skill::PathSkill;

struct PathScale {
    altitude: [f64; 12],
    lateral: [f64; 12],
    speed: [f64; 12],
    bank: [f64; 12],
    pitch: [f64; 12],
}

static ACS: PathScale = PathScale {
    altitude: [20.0, 40.0, 60.0, 80.0, 100.0, 120.0, 150.0, 180.0, 220.0, 250.0, 300.0, 350.0],
    lateral: [0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9],
    speed: [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 22.0, 25.0, 30.0, 35.0],
    bank: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 22.0],
    pitch: [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0],
};

static NOVICE: PathScale = PathScale {
    altitude: [40.0, 80.0, 120.0, 160.0, 200.0, 240.0, 280.0, 320.0, 360.0, 400.0, 450.0, 500.0],
    lateral: [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 1.0, 1.2, 1.4, 1.6],
    speed: [4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0, 36.0, 40.0, 45.0, 50.0],
    bank: [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 22.0, 25.0, 30.0, 35.0],
    pitch: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 22.0],
};

static BEGINNER: PathScale = PathScale {
    altitude: [
        150.0, 250.0, 350.0, 450.0, 550.0, 650.0, 750.0, 850.0, 1000.0, 1200.0, 1500.0, 1800.0,
    ],
    lateral: [0.3, 0.5, 0.7, 0.9, 1.2, 1.5, 1.8, 2.2, 2.6, 3.0, 3.5, 4.0],
    speed: [12.0, 18.0, 24.0, 30.0, 36.0, 42.0, 48.0, 54.0, 60.0, 70.0, 80.0, 90.0],
    bank: [6.0, 10.0, 14.0, 18.0, 22.0, 26.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0],
    pitch: [3.0, 5.0, 7.0, 9.0, 12.0, 15.0, 18.0, 22.0, 26.0, 30.0, 35.0, 40.0],
};

fn scale(skill: PathSkill) -> &'static PathScale {
    match skill {
        PathSkill::Novice => &NOVICE,
        PathSkill::Beginner => &BEGINNER,
        PathSkill::Acs => &ACS,
    }
}

fn grade_single(dev: f64, thresholds: &[f64; 12]) -> Grade {
    let dev_abs = dev.abs();
    for (i, limit) in thresholds.iter().enumerate() {
        if dev_abs <= *limit {
            return GRADE_LADDER[i];
        }
    }
    Grade::F
}

pub fn grade_altitude(max_alt_dev: f64, skill: PathSkill) -> Grade {
    grade_single(max_alt_dev, &scale(skill).altitude)
}

pub fn grade_lateral(max_lateral_dev: f64, skill: PathSkill) -> Grade {
    grade_single(max_lateral_dev, &scale(skill).lateral)
}

pub fn grade_speed(max_speed_dev: f64, skill: PathSkill) -> Grade {
    grade_single(max_speed_dev, &scale(skill).speed)
}

pub fn grade_bank(max_bank_dev: f64, skill: PathSkill) -> Grade {
    grade_single(max_bank_dev, &scale(skill).bank)
}

pub fn grade_pitch(max_pitch_dev: f64, skill: PathSkill) -> Grade {
    grade_single(max_pitch_dev, &scale(skill).pitch)
}

/// Categories whose fixed bust limit was exceeded while on the path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PathBusts {
    pub altitude: bool,
    pub lateral: bool,
    pub speed: bool,
    pub bank: bool,
    pub pitch: bool,
}

impl PathBusts {
    pub fn count(self) -> usize {
        usize::from(self.altitude)
            + usize::from(self.lateral)
            + usize::from(self.speed)
            + usize::from(self.bank)
            + usize::from(self.pitch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PathGradeResult {
    pub final_grade: Grade,
    pub altitude_grade: Grade,
    pub lateral_grade: Grade,
    pub speed_grade: Grade,
    pub bank_grade: Grade,
    pub pitch_grade: Grade,
    pub max_alt_dev: f64,
    pub max_lateral_dev: f64,
    pub max_speed_dev: f64,
    pub max_bank_dev: f64,
    pub max_pitch_dev: f64,
}

/// Grades a completed path following run from its peak deviations.
///
/// Final grade is the worst of the five category grades, then capped:
/// altitude or lateral bust caps at C-, speed, bank or pitch bust caps at D,
/// two busts cap at D-, three or more force F.
pub fn grade_path_following(
    max_alt_dev: f64,
    max_lateral_dev: f64,
    max_speed_dev: f64,
    max_bank_dev: f64,
    max_pitch_dev: f64,
    busted: PathBusts,
    skill: PathSkill,
) -> PathGradeResult {
    let altitude_grade = grade_altitude(max_alt_dev, skill);
    let lateral_grade = grade_lateral(max_lateral_dev, skill);
    let speed_grade = grade_speed(max_speed_dev, skill);
    let bank_grade = grade_bank(max_bank_dev, skill);
    let pitch_grade = grade_pitch(max_pitch_dev, skill);

    let mut final_grade = altitude_grade
        .worse(lateral_grade)
        .worse(speed_grade)
        .worse(bank_grade)
        .worse(pitch_grade);

    if busted.altitude || busted.lateral {
        final_grade = final_grade.cap(Grade::CMinus);
    }
    if busted.speed || busted.bank || busted.pitch {
        final_grade = final_grade.cap(Grade::D);
    }
    if busted.count() >= 2 {
        final_grade = final_grade.cap(Grade::DMinus);
    }
    if busted.count() >= 3 {
        final_grade = Grade::F;
    }

    PathGradeResult {
        final_grade,
        altitude_grade,
        lateral_grade,
        speed_grade,
        bank_grade,
        pitch_grade,
        max_alt_dev: max_alt_dev.abs(),
        max_lateral_dev: max_lateral_dev.abs(),
        max_speed_dev: max_speed_dev.abs(),
        max_bank_dev: max_bank_dev.abs(),
        max_pitch_dev: max_pitch_dev.abs(),
    }
}
