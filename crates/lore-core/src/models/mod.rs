mod answer;
mod candidate;
mod degradation;
mod feedback;
mod query;
mod ranked_context;
mod session_event;

pub use answer::{Answer, QueryResponse, RelatedNote};
pub use candidate::{PassageRef, RetrievalCandidate, StrategyKind};
pub use degradation::{Degradation, DegradationKind};
pub use feedback::{
    CorrectionDocument, CorrectionRecord, CorrectionStatus, ErrorDetails, FeedbackScope,
    ImplementationMethod, ImprovementMetrics, ImprovementPatch, ImprovementRecord,
    ImprovementStatus, ProblemCategory, TrainingExample, ValidationStatus,
};
pub use query::{Query, SynthesisOptions};
pub use ranked_context::RankedContext;
pub use session_event::{MessageRole, SessionEvent};
