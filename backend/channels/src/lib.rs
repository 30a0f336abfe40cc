//! Telephony-provider wire concerns for the MMS webhook.
//!
//! Twilio posts inbound messages as `application/x-www-form-urlencoded`
//! forms, signs them with `X-Twilio-Signature`, and expects a TwiML document
//! in the response body.

pub mod twilio_inbound;
pub mod twilio_signature;
pub mod twiml;

pub use twilio_inbound::{FormParams, InboundError, InboundMms};
pub use twilio_signature::{SIGNATURE_HEADER, compute_signature, validate_signature};
pub use twiml::{MessagingResponse, TWIML_CONTENT_TYPE};
