//! # Bot Core Module
//!
//! The conversation core: turning inbound chat events into authorized
//! wishlist operations and structured replies.
//!
//! ## Components
//!
//! - [`server`] - event loop wiring transport channels to the handler
//! - [`session`] - per-user conversational context and idle expiry
//! - [`router`] - the closed action vocabulary and its wire codes
//! - [`handlers`] - the state machine: screen and interpreter handlers
//! - [`event`] - transport contract (inbound event, reply, screen level)
//! - [`texts`] - literal reply strings and free-text sentinels
//! - [`error`] - infrastructure error type and stable error codes
//!
//! ## Event flow
//!
//! ```text
//! InboundEvent ──► SessionManager ──► Handler (pending action ⊕ payload)
//!                                        │
//!                                  WishlistService ──► Store
//!                                        │
//!                                      Reply (text, screen level)
//! ```
//!
//! A callback's payload is an action code and selects a screen handler
//! directly; free text is routed to the interpreter named by the session's
//! pending action. Either way the handler produces exactly one reply.

pub mod error;
pub mod event;
pub mod handlers;
pub mod router;
pub mod server;
pub mod session;
pub mod texts;

pub use error::{BotError, ErrorCode};
pub use event::{InboundEvent, Reply, ScreenLevel};
pub use handlers::Handler;
pub use router::Action;
pub use server::BotServer;
pub use session::{Session, SessionManager};
