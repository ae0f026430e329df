pub mod base;
pub mod catalog;
pub mod notification;
pub mod party;
pub mod user;

pub use base::BaseDao;
