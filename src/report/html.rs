use ammonia::clean_text;

use crate::extractor::FilteredListing;
use crate::report::REPORT_TITLE;

/// Row backgrounds, picked by row index parity.
pub const ROW_COLORS: [&str; 2] = ["#ffffff", "#EEF7FA"];

const TABLE_STYLE: &str = "border-collapse: collapse;";
const HEAD_STYLE: &str = "background-color:#005b96;color:#ffffff;border:0;font-weight:bold";
const CELL_STYLE: &str = "border:0;padding:0.25em";
const HEADINGS: [&str; 5] = ["", "Job Title", "Company", "Place", "Id"];

fn cell(style: &str, content: &str) -> String {
    format!(r#"<td style="{style}">{content}</td>"#)
}

fn header_row() -> String {
    let cells: String = HEADINGS
        .iter()
        .map(|heading| cell(HEAD_STYLE, heading))
        .collect();
    format!("<thead><tr>{cells}</tr></thead>")
}

fn listing_row(index: usize, listing: &FilteredListing) -> String {
    let link = format!(
        r#"<a href="{}">{}</a>"#,
        clean_text(&listing.url),
        clean_text(listing.id())
    );
    let cells = [
        cell(CELL_STYLE, &format!("{}.", index + 1)),
        cell(CELL_STYLE, &clean_text(&listing.job_title)),
        cell(CELL_STYLE, &clean_text(&listing.company)),
        cell(CELL_STYLE, &clean_text(&listing.place)),
        cell(CELL_STYLE, &link),
    ]
    .concat();
    format!(
        r#"<tr style="background-color:{};border:0">{cells}</tr>"#,
        ROW_COLORS[index % 2]
    )
}

/// Standalone document with a heading, the alert subject and a table of
/// listings. All styling is inline.
pub fn render(listings: &[FilteredListing], subject: &str, date: &str) -> String {
    let rows: String = listings
        .iter()
        .enumerate()
        .map(|(i, listing)| listing_row(i, listing))
        .collect();

    format!(
        concat!(
            "<!DOCTYPE html>",
            "<html><head><title>{title}</title></head>",
            "<body><div id=\"content\">",
            "<h1>{title}</h1>",
            "<p>{subject} on {date}</p>",
            "<table style=\"{table_style}\">{head}<tbody>{rows}</tbody></table>",
            "</div></body></html>",
        ),
        title = REPORT_TITLE,
        subject = clean_text(subject),
        date = clean_text(date),
        table_style = TABLE_STYLE,
        head = header_row(),
        rows = rows,
    )
}
