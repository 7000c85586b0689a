pub mod config;
pub mod errors;
pub mod negotiation;

pub use errors::{CollaboratorError, InputError};
pub use negotiation::discount::{DiscountSchedule, SentimentTier};
pub use negotiation::engine::{decide, Decision};
pub use negotiation::service::{
    CounterofferFormatter, NegotiationService, RoundOutcome, SentimentSource, TemplateFormatter,
};
pub use negotiation::store::SessionStore;
pub use negotiation::Terms;
