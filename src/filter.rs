use std::collections::BTreeSet;

use crate::extractor::EnrichedListing;

/// Languages accepted when nothing else is configured.
pub fn default_languages() -> BTreeSet<String> {
    BTreeSet::from(["en".to_string()])
}

/// Whether the listing's description language is in `allowed`.
pub fn accept(listing: &EnrichedListing, allowed: &BTreeSet<String>) -> bool {
    allowed.contains(&listing.description_language)
}
