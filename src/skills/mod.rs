//! Skills: the table of things the assistant can do, how it is stored,
//! and how a matched skill produces its response.

pub mod builtin;
pub mod dispatcher;
pub mod phrase;
pub mod store;
pub mod table;

pub use builtin::default_table;
pub use dispatcher::{dispatch, Dispatch, LIST_SEPARATOR};
pub use phrase::{has_leading, strip_leading, strip_leading_opt};
pub use store::SkillStore;
pub use table::{Skill, SkillBehavior, SkillKind, SkillTable};
