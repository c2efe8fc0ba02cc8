pub mod language;
pub mod model;
pub mod scanner;
pub mod title;

pub use model::{EnrichedListing, FilteredListing, ListingPage, NO_TITLE, UNKNOWN_LANGUAGE};
pub use scanner::scan_listing;
pub use title::{TitleError, parse_title};
