pub mod athlete;
pub mod exercise;
pub mod exercise_performance;
pub mod user;
pub mod workout_detail;
pub mod workout_session;
pub mod workout_trend;

pub use athlete::{Athlete, AthleteProfile};
pub use exercise::Exercise;
pub use exercise_performance::ExercisePerformance;
pub use user::{CLIENT_ROLE, User};
pub use workout_detail::{NewWorkoutDetail, WorkoutDetail};
pub use workout_session::{CompletionFlag, NewWorkoutSession, WorkoutSession};
pub use workout_trend::WorkoutTrend;
