pub mod auth;
pub mod catalog;
pub mod coupon;
pub mod message;
pub mod notification;
pub mod party;
pub mod payment;
pub mod product;
