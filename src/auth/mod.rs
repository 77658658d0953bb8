pub mod flow;

pub use flow::{AuthError, AuthFlow, AuthPhase};
