//! SeaORM entities for the newsroom schema.

pub mod author;
pub mod category;
pub mod post;
pub mod post_category;
pub mod subscription;
