pub mod bonus;
pub mod category;
pub mod events;
pub mod resolver;

pub use bonus::{BonusKind, BonusTable};
pub use category::{CardCategory, FACILITY_COUNT};
pub use events::{StatBundle, EARLY_TERMINATION_PENALTY};
pub use resolver::{resolve, resolve_with_options, ResolveOptions, ResolvedCard};
