//! Field splitting for listing titles.
//!
//! Listing pages are titled `"<Company> hiring <JobTitle> in <Place> | <site>"`.
//! All knowledge of that format lives in [`parse_title`].

use thiserror::Error;

use crate::extractor::model::TitleFields;

const HIRING: &str = " hiring ";
const IN: &str = " in ";
const SITE: &str = " | ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("title has no '{separator}' separator: {title:?}")]
    MissingSeparator {
        separator: &'static str,
        title: String,
    },
}

/// Split a listing title into company, job title and place.
///
/// Fails when `" hiring "` or, after it, `" in "` is missing. A missing
/// `" | <site>"` suffix is tolerated and the whole tail becomes the place.
pub fn parse_title(title: &str) -> Result<TitleFields, TitleError> {
    let title = title.trim();
    let missing = |separator| TitleError::MissingSeparator {
        separator,
        title: title.to_string(),
    };

    let (company, rest) = title.split_once(HIRING).ok_or_else(|| missing(HIRING))?;
    let (job_title, tail) = rest.split_once(IN).ok_or_else(|| missing(IN))?;
    let place = tail.split_once(SITE).map_or(tail, |(place, _site)| place);

    Ok(TitleFields {
        company: company.to_string(),
        job_title: job_title.to_string(),
        place: place.to_string(),
    })
}
