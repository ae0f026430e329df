pub mod auth;
pub mod coupon;
pub mod dao;
pub mod email;
pub mod paypal;
pub mod shares;

pub use auth::AuthService;
pub use dao::*;
pub use email::EmailService;
pub use paypal::PayPalService;
