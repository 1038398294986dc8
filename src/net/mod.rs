//! Network address subsystem.
//!
//! # Data Flow
//! ```text
//! Destination host or IP
//!     → classifier.rs (strict IPv4 literal? else resolve)
//!     → resolver.rs (OS resolver, or a fixed table in tests)
//!     → ranges.rs (bucket by leading characters, inclusive bound check)
//!     → External | Internal | Unknown
//! ```
//!
//! # Design Decisions
//! - Only IPv4 private ranges are recognised
//! - Resolution failure is never an error for the caller
//! - Classification results are cached per classifier, never evicted

pub mod classifier;
pub mod ranges;
pub mod resolver;

pub use classifier::{AddressClassifier, Classification};
pub use resolver::{Resolver, StaticResolver, SystemResolver};
