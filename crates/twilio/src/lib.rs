//! Twilio channel plumbing: webhook signature verification, TwiML
//! rendering, and outbound message sending.

pub mod outbound;
pub mod signature;
pub mod twiml;

pub use {
    outbound::{MessageSender, TwilioSender},
    signature::{parse_form, verify_signature},
};
