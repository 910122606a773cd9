//! Push provider (OneSignal) request building and transport.

mod client;
mod payload;

pub use client::{OneSignalClient, ProviderReply, ProviderResponse, PushTransport, TransportError};
pub use payload::{Filter, NotificationPayload, ALL_SEGMENTS, CONTENT_LANGUAGE};
