pub mod amfi;
pub mod caching;
pub mod util;
