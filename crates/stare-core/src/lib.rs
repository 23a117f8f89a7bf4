pub mod config;
pub mod entities;
pub mod precedent;
pub mod schema;
pub mod section_key;
pub mod text;

pub use config::{AnalysisConfig, ConfigError};
pub use entities::{EntityCategory, EntityExtractor, EntitySet, RegexEntityExtractor};
pub use precedent::{Precedent, PrecedentError, PrecedentRecord};
pub use schema::precedents;
pub use section_key::normalize_section;
