//! HTML rendering. Views are pure functions of already-fetched data, apart
//! from [`token::load`] which gathers that data.

pub mod charts;
pub mod landing;
pub mod layout;
pub mod token;

pub use charts::ChartSpec;
pub use token::TokenPageData;
