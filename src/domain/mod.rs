// Market-order domain
pub mod errors;
pub mod orders;
pub mod price;
