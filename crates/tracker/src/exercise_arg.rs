use std::str::FromStr;

/// One `--exercise` argument: `EXERCISE:REPS:WEIGHTS[:INSTRUCTIONS]`,
/// with reps and weights comma separated, one entry per set.
///
/// `tracker plan 3 2024-05-15 --exercise "Bench Press:10,10,8:50,50,55:Pause at chest"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseArg {
    pub exercise: String,
    pub reps: Vec<String>,
    pub weight: Vec<String>,
    pub instructions: String,
}

impl ExerciseArg {
    pub fn sets(&self) -> i32 {
        i32::try_from(self.reps.len()).unwrap_or(i32::MAX)
    }

    /// Exercise ids are accepted as-is; anything else is a catalogue name.
    pub fn exercise_id(&self) -> Option<i64> {
        self.exercise.trim().parse().ok()
    }
}

fn split_column(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|v| v.trim().to_string()).collect()
}

impl FromStr for ExerciseArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let exercise = parts.next().unwrap_or_default().trim();
        let (Some(reps), Some(weight)) = (parts.next(), parts.next()) else {
            return Err(format!(
                "expected EXERCISE:REPS:WEIGHTS[:INSTRUCTIONS], got '{}'",
                s
            ));
        };
        if exercise.is_empty() {
            return Err("exercise name or id is missing".to_string());
        }

        let reps = split_column(reps);
        let weight = split_column(weight);
        if reps.len() != weight.len() {
            return Err(format!(
                "{} reps for {} weights in '{}'",
                reps.len(),
                weight.len(),
                s
            ));
        }

        Ok(Self {
            exercise: exercise.to_string(),
            reps,
            weight,
            instructions: parts.next().unwrap_or_default().trim().to_string(),
        })
    }
}
