mod domain;
mod envelope;
mod sub_agent;
mod traits;
mod window;

pub use domain::Domain;
pub use envelope::{build_response_envelope, FindingEnvelope, ENVELOPE_STATUS_SUCCESS};
pub use sub_agent::{error_value, SubAgent};
pub use traits::{Correlator, EvidenceSource};
pub use window::{TimeWindow, UNKNOWN_INCIDENT};
