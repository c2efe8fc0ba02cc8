use mailparse::ParsedMail;
use tracing::warn;

const TEXT_PLAIN: &str = "text/plain";

/// Plain-text body of a raw message.
///
/// Every MIME part is visited depth-first, root first. When several parts
/// are `text/plain` the last one visited wins. Unparseable input yields an
/// empty body.
pub fn decode(raw: &[u8]) -> String {
    let message = match mailparse::parse_mail(raw) {
        Ok(message) => message,
        Err(e) => {
            warn!("Could not parse message, treating body as empty: {}", e);
            return String::new();
        }
    };

    let mut body = String::new();
    walk(&message, &mut |part| {
        if part.ctype.mimetype.eq_ignore_ascii_case(TEXT_PLAIN)
            && let Some(text) = part_text(part)
        {
            body = text;
        }
    });
    body
}

fn walk<'a>(part: &'a ParsedMail<'a>, visit: &mut impl FnMut(&'a ParsedMail<'a>)) {
    visit(part);
    for sub in &part.subparts {
        walk(sub, visit);
    }
}

fn part_text(part: &ParsedMail<'_>) -> Option<String> {
    match part.get_body() {
        Ok(text) => Some(text),
        Err(e) => {
            // undecodable charset or transfer encoding; keep the raw bytes
            warn!("Could not decode text part: {}", e);
            part.get_body_raw()
                .ok()
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
        }
    }
}
