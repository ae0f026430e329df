pub mod catalog;
pub mod notification;
pub mod party;
pub mod party_member;
pub mod user;

pub use catalog::*;
pub use notification::*;
pub use party::*;
pub use party_member::*;
pub use user::*;
