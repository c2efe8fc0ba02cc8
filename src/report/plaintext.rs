use crate::extractor::FilteredListing;
use crate::report::REPORT_TITLE;

const RULE: &str = "-------------";
const FOOTER: &str = "Thanks for using jobdigest";

pub fn salutation(date: &str) -> String {
    format!("These are your filtered job alerts for {date}")
}

pub fn entry_line(index: usize, listing: &FilteredListing) -> String {
    format!(
        "{}. {}, {}, {}, {}",
        index + 1,
        listing.job_title,
        listing.company,
        listing.place,
        listing.url
    )
}

/// Header, salutation, one numbered line per listing, footer.
pub fn render(listings: &[FilteredListing], date: &str) -> String {
    let entries = listings
        .iter()
        .enumerate()
        .map(|(i, listing)| entry_line(i, listing))
        .collect::<Vec<_>>()
        .join("\r\n");

    format!(
        "{REPORT_TITLE}\n{RULE}\n{}\n\n{entries}\n{FOOTER}",
        salutation(date)
    )
}
