//! Application layer for the ACBO pilot.
//!
//! Use cases that drive the state store through the step sequencer: the
//! side-by-side comparison, the document processing pipeline, live backend
//! queries and session handling.

pub mod comparison;
pub mod processing;
pub mod remote;
pub mod session_usecase;

pub use comparison::{ComparisonOutcome, ComparisonUseCase, QueryOutcome, StepCheck};
pub use processing::{ProcessingOutcome, ProcessingUseCase, UploadRequest};
pub use remote::RemoteQueryUseCase;
pub use session_usecase::SessionUseCase;
