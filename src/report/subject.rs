const MARKER: &str = "new jobs";

/// Subject of the reply: the surviving count, followed by whatever came
/// after the last `"new jobs"` in the alert's subject (or the whole subject
/// when the marker is missing).
pub fn reply_subject(count: usize, original: &str) -> String {
    let tail = original
        .rsplit_once(MARKER)
        .map_or(original, |(_, tail)| tail);
    format!("Hey: {count} {MARKER} {tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_text_after_marker() {
        assert_eq!(
            reply_subject(3, "You have 12 new jobs for Rust Developer"),
            "Hey: 3 new jobs  for Rust Developer"
        );
    }

    #[test]
    fn uses_last_marker() {
        assert_eq!(
            reply_subject(1, "new jobs digest: 5 new jobs in Oslo"),
            "Hey: 1 new jobs  in Oslo"
        );
    }

    #[test]
    fn missing_marker_keeps_whole_subject() {
        assert_eq!(reply_subject(0, "Weekly digest"), "Hey: 0 new jobs Weekly digest");
        assert_eq!(reply_subject(0, ""), "Hey: 0 new jobs ");
    }
}
