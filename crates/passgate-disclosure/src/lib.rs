//! Passgate Disclosure: building selective-disclosure requests against an
//! external proof capability.
//!
//! - `capability`: the traits the external proof system is consumed through
//! - `events`: lifecycle events pushed by the capability after a request is finalized
//! - `resolver`: ordered synonym walk that finds the key a capability accepts
//! - `builder`: turns a verification kind into a finalized request
//! - `memory`: scripted in-memory capability for tests and demos

pub mod builder;
pub mod capability;
pub mod error;
pub mod events;
pub mod memory;
pub mod resolver;

pub use builder::{BuiltRequest, RequestBuilder};
pub use capability::{PendingRequest, ProofCapability, RequestHandle};
pub use error::DisclosureError;
pub use events::CapabilityEvent;
pub use memory::{EventEmitter, InMemoryCapability};
pub use resolver::AttributeResolver;
