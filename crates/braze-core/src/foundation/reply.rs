//! Handler replies and outbound actions.
//!
//! A rule handler hands back a [`Reply`]: either a bare text body or a
//! `(kind, payload)` pair. The dispatcher interprets the reply into an
//! [`Action`] exactly once at its boundary; nothing downstream inspects
//! reply shapes again.
//!
//! [`IntoReply`] lets handlers return whatever is most convenient: a
//! `&str`, a `String`, a `(kind, payload)` tuple, a [`Reply`], or a
//! `Result` of any of those.

use std::path::PathBuf;

use crate::foundation::error::{HandlerError, HandlerResult};

/// Reply kind tag for text payloads.
pub const TEXT_KIND: &str = "text";
/// Reply kind tag for image payloads.
pub const IMAGE_KIND: &str = "image";

/// What a rule handler hands back to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A bare string, sent as text.
    Text(String),
    /// A tagged `(kind, payload)` pair.
    Tagged(String, String),
}

impl Reply {
    /// Creates a text reply.
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Creates an image reply pointing at a local file.
    pub fn image(path: impl Into<String>) -> Self {
        Self::Tagged(IMAGE_KIND.to_string(), path.into())
    }
}

/// The outbound action decided from a handler's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a text message.
    Text(String),
    /// Send a local image file.
    Image(PathBuf),
    /// The reply kind is not supported; nothing is sent.
    Unsupported {
        /// The unrecognized kind tag.
        kind: String,
    },
}

impl From<Reply> for Action {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Text(body) => Action::Text(body),
            Reply::Tagged(kind, payload) => match kind.as_str() {
                TEXT_KIND => Action::Text(payload),
                IMAGE_KIND => Action::Image(PathBuf::from(payload)),
                _ => Action::Unsupported { kind },
            },
        }
    }
}

/// Conversion of handler return values into a [`HandlerResult`].
///
/// Implemented for the shapes handlers naturally produce, so a handler can
/// be written as `async fn(..) -> &'static str` or
/// `async fn(..) -> Result<Reply, HandlerError>` without ceremony.
pub trait IntoReply {
    /// Converts this value into a handler result.
    fn into_reply(self) -> HandlerResult;
}

impl IntoReply for Reply {
    fn into_reply(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Text(self))
    }
}

impl IntoReply for &str {
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Text(self.to_string()))
    }
}

impl<K, P> IntoReply for (K, P)
where
    K: Into<String>,
    P: Into<String>,
{
    fn into_reply(self) -> HandlerResult {
        Ok(Reply::Tagged(self.0.into(), self.1.into()))
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HandlerError>,
{
    fn into_reply(self) -> HandlerResult {
        self.map_err(Into::into).and_then(IntoReply::into_reply)
    }
}
