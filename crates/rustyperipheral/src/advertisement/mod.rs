//! LE advertisement construction and registration

pub mod builder;
pub mod object;

pub use builder::{AdType, AdvertisementBuilder, AdvertisementProperties};
pub use object::Advertisement;
