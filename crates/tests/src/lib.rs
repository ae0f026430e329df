
#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod product_tests;
#[cfg(test)]
mod coupon_tests;
#[cfg(test)]
mod notification_tests;
#[cfg(test)]
mod catalog_tests;
