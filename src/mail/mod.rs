pub mod decoder;
pub mod sender;

pub use decoder::decode;
pub use sender::{MailSender, OutgoingReply, SmtpMailSender};
