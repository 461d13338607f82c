pub mod repository;
pub mod user;
pub mod user_group;
pub mod user_group_member;

pub use repository::{UserGroupRepository, UserRepository};
