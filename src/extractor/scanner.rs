//! Single-pass scanner over a listing page.
//!
//! The page is tokenized with html5ever and every start tag, end tag and
//! text run becomes a [`ScanEvent`]. A [`ListingScanner`] consumes those
//! events and captures two regions: the document `<title>` and the rich
//! description `<div>`. Regions are tracked one level deep: the next closing
//! tag of the same name always ends the region, regardless of nesting.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::TokenizerResult;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use crate::extractor::model::ListingPage;

/// Exact `class` attribute of the description container.
pub const DESCRIPTION_CLASS: &str = "description__text description__text--rich";

/// Tag-level events the scanner reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Open { name: String, class: Option<String> },
    Close { name: String },
    Text(String),
}

impl ScanEvent {
    pub fn open(name: &str) -> Self {
        Self::Open {
            name: name.to_string(),
            class: None,
        }
    }

    pub fn open_with_class(name: &str, class: &str) -> Self {
        Self::Open {
            name: name.to_string(),
            class: Some(class.to_string()),
        }
    }

    pub fn close(name: &str) -> Self {
        Self::Close {
            name: name.to_string(),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Which region the scanner is currently recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    /// Inside `<title>`; `within_description` is set when the description
    /// region was open too, so text is recorded for both.
    InTitle { within_description: bool },
    InDescription,
}

impl ScanState {
    fn in_title(self) -> bool {
        matches!(self, Self::InTitle { .. })
    }

    fn in_description(self) -> bool {
        matches!(
            self,
            Self::InDescription
                | Self::InTitle {
                    within_description: true
                }
        )
    }

    fn from_flags(title: bool, description: bool) -> Self {
        match (title, description) {
            (true, within_description) => Self::InTitle { within_description },
            (false, true) => Self::InDescription,
            (false, false) => Self::Idle,
        }
    }

    /// Transition for one event; text events never change the state.
    pub fn next(self, event: &ScanEvent) -> Self {
        let (title, description) = (self.in_title(), self.in_description());
        match event {
            ScanEvent::Open { name, .. } if name == "title" => Self::from_flags(true, description),
            ScanEvent::Open { name, class }
                if name == "div" && class.as_deref() == Some(DESCRIPTION_CLASS) =>
            {
                Self::from_flags(title, true)
            }
            ScanEvent::Close { name } if name == "title" => Self::from_flags(false, description),
            ScanEvent::Close { name } if name == "div" => Self::from_flags(title, false),
            _ => self,
        }
    }
}

/// Consumes scan events and accumulates the title and description text.
#[derive(Debug, Default)]
pub struct ListingScanner {
    state: ScanState,
    title: Option<String>,
    description: Vec<String>,
}

impl ListingScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: ScanEvent) {
        if let ScanEvent::Text(text) = event {
            if self.state.in_description() {
                self.description.push(text.clone());
            }
            if self.state.in_title() {
                self.title = Some(text);
            }
            return;
        }
        self.state = self.state.next(&event);
    }

    pub fn finish(self) -> ListingPage {
        ListingPage {
            title: self.title,
            description: self.description,
        }
    }
}

/// Run the scanner over an event stream.
pub fn scan_events<I>(events: I) -> ListingPage
where
    I: IntoIterator<Item = ScanEvent>,
{
    let mut scanner = ListingScanner::new();
    for event in events {
        scanner.apply(event);
    }
    scanner.finish()
}

/// Tokenize `html` and run the scanner over it.
pub fn scan_listing(html: &str) -> ListingPage {
    let sink = EventSink::default();
    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    match tokenizer.feed(&input) {
        TokenizerResult::Done => {}
        // only returned when the sink pauses for a script, which this sink never does
        TokenizerResult::Script(()) => {}
    }
    tokenizer.end();
    tokenizer.sink.finish()
}

/// Turns html5ever tokens into scan events. Adjacent character tokens are
/// merged so one text run between two tags is one event.
#[derive(Default)]
struct EventSink {
    scanner: RefCell<ListingScanner>,
    pending_text: RefCell<String>,
}

impl EventSink {
    fn emit(&self, event: ScanEvent) {
        self.scanner.borrow_mut().apply(event);
    }

    fn flush_text(&self) {
        let text = std::mem::take(&mut *self.pending_text.borrow_mut());
        if !text.is_empty() {
            self.emit(ScanEvent::Text(text));
        }
    }

    fn handle_tag(&self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        match tag.kind {
            TagKind::StartTag => {
                let class = tag
                    .attrs
                    .iter()
                    .find(|attr| &*attr.name.local == "class")
                    .map(|attr| attr.value.to_string());
                self.emit(ScanEvent::Open {
                    name: name.clone(),
                    class,
                });
                if tag.self_closing {
                    self.emit(ScanEvent::Close { name });
                    return TokenSinkResult::Continue;
                }
                // without a tree builder the tokenizer has to be told about raw text elements
                match name.as_str() {
                    "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                        TokenSinkResult::RawData(RawKind::Rawtext)
                    }
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                self.emit(ScanEvent::Close { name });
                TokenSinkResult::Continue
            }
        }
    }

    fn finish(self) -> ListingPage {
        self.flush_text();
        self.scanner.into_inner().finish()
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                self.pending_text.borrow_mut().push_str(&text);
                TokenSinkResult::Continue
            }
            Token::NullCharacterToken | Token::ParseError(_) => TokenSinkResult::Continue,
            Token::TagToken(tag) => {
                self.flush_text();
                self.handle_tag(tag)
            }
            _ => {
                self.flush_text();
                TokenSinkResult::Continue
            }
        }
    }
}
