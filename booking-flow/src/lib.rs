pub mod cancellation;
pub mod catalog;
pub mod collaborators;
pub mod constraints;
pub mod error;
pub mod machine;
pub mod pricing;
pub mod runner;
pub mod session;

// Re-export commonly used types
pub use cancellation::{
    CancellationRequest, FeeDecision, FeeTier, SessionKind, compute_cancellation_fee,
};
pub use catalog::{CatalogGroup, Service, ServiceCatalog, ServiceCategory};
pub use collaborators::{
    AddressVerifier, AlwaysValidAddresses, ChargeOutcome, InMemoryReservationStore,
    PenaltyCharger, RecordingPenaltyCharger, ReservationStore,
};
pub use constraints::{TimeConstraintValidator, TimeRejection, TimeRules};
pub use error::{BookingError, CountKind, Result};
pub use machine::{BookingStateMachine, FlowStatus, StepInput, StepOutcome};
pub use pricing::{Addon, AddonPrices, PriceBreakdown, PriceTable, compute_price};
pub use runner::{CancelRequest, FlowRunner};
pub use session::{
    AdditionalServices, Address, BookingSession, Customization, InMemorySessionStorage, Schedule,
    SessionStorage, Step,
};
