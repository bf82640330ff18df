// Resolution
pub mod resolution;
pub mod selection;

// Operator input
pub mod country_of_origin;
pub mod session;

// Printing
pub mod print_gateway;
pub mod printing;

// Shared runtime state
pub mod busy;

#[cfg(test)]
pub(crate) mod fixtures;

pub use busy::{BusyGuard, BusyIndicator};
pub use country_of_origin::{Country, CountryRegistry, CountryValidation};
pub use print_gateway::{AuditStore, HttpAuditStore, HttpPrintGateway, PrintGateway};
pub use printing::{LabelPrintService, PrintOutcome};
pub use resolution::{should_auto_submit, PipelineStage, ResolutionPipeline, StageTracker};
pub use session::ScanSession;
