//! Chat command pipeline: resolve text into an intent, dispatch it against
//! Spotify and render the reply.

pub mod dispatcher;
pub mod error;
pub mod intent;
pub mod reply;
