pub mod aggregation;
pub mod athlete;
pub mod performance;
pub mod session_completion;
pub mod session_planning;
pub mod trend;
pub mod trend_period;

pub use athlete::{register_athlete, update_profile};
pub use performance::update_exercise_performance;
pub use session_completion::{
    CompletionOutcome, CompletionProgress, SessionCompletion, complete_session, resume_session,
};
pub use session_planning::plan_session;
pub use trend::update_workout_trend;
pub use trend_period::TrendPeriod;
