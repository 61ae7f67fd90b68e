pub mod athlete;
pub mod session;

pub use athlete::{CreateAthleteRequest, UpdateAthleteRequest, UpdateUserRequest};
pub use session::{
    CompleteSessionRequest, ExerciseInput, PlanSessionRequest, PlannedExerciseInput,
    SessionDetails, SessionExercise,
};
