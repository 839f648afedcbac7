//! Helpers for rendering panic payloads caught around listener calls.
//!
//! Both workers invoke externally supplied listeners and must survive a
//! listener that panics. The panic payload is caught with
//! `std::panic::catch_unwind` and logged; these helpers turn the opaque
//! payload into something readable.

use std::{any::Any, borrow::Cow};

/// Render a caught panic payload as a loggable string.
///
/// Payloads raised by `panic!` are `&'static str` or `String` in practice;
/// anything else is reported with a placeholder.
///
/// ```
/// use packetloom::panic::payload_message;
/// assert_eq!(payload_message(&"boom"), "boom");
/// assert_eq!(payload_message(&String::from("boom")), "boom");
/// assert_eq!(payload_message(&5_u32), "<non-string panic payload>");
/// ```
#[must_use]
pub fn payload_message(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Owned(message.clone())
    } else {
        Cow::Borrowed("<non-string panic payload>")
    }
}
