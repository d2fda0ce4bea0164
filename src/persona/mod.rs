//! Personas: named tool bundles, and routing of user messages to one of them.

mod detector;
mod registry;

pub use detector::{detect_persona, KeywordDetector, PersonaDetector};
pub use registry::{Persona, PersonaRegistry, BUILTIN_PERSONAS, DEFAULT_PERSONA};
