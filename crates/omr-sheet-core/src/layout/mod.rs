//! Pure layout arithmetic: where columns sit and how questions split across pages.
//!
//! Nothing here draws. Every function is a deterministic function of a
//! [`PageGeometry`](crate::config::PageGeometry), so the whole plan of a sheet
//! can be computed and tested without a canvas.

pub mod column;
pub mod pagination;

pub use column::{ColumnGeometry, ColumnSlot};
pub use pagination::{PageLayout, Pagination, QuestionSlot, plan_page};
