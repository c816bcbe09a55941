//! Chat relay core.
//!
//! # Data Flow
//! ```text
//! POST /api/chat body
//!     → normalize.rs (parse, pick messages[] or prompt, apply defaults)
//!     → upstream.rs (inject credential, call provider, decode JSON)
//!     → handler.rs (relay status + body, or map failure to an error body)
//! ```

pub mod handler;
pub mod normalize;
pub mod types;
pub mod upstream;

pub use handler::chat_handler;
pub use types::{ChatMessage, InboundChatRequest, UpstreamChatRequest, UpstreamReply};
pub use upstream::{UpstreamClient, UpstreamSetupError};
