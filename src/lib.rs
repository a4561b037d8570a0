//! # Wishbot - Conversational Wishlist Assistant
//!
//! Wishbot lets a person maintain a personal list of desired items over chat
//! and lets others view that list under optional password protection. This
//! crate implements the conversation core: the state machine that turns one
//! inbound event (a free-text message or a button press) into exactly one
//! authorized mutation or query, plus the session and storage layers behind
//! it. The chat transport itself is a collaborator that exchanges
//! [`bot::InboundEvent`] and [`bot::Reply`] values over channels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wishbot::bot::BotServer;
//! use wishbot::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut server = BotServer::new(&config)?;
//!     let _events = server.event_sender();      // hand to the transport
//!     let _replies = server.take_reply_receiver();
//!     server.run().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - conversation state machine, sessions, routing, server loop
//! - [`service`] - transactional façade over the store
//! - [`storage`] - sled-backed persistence for users and wishes
//! - [`config`] - TOML configuration management
//! - [`logutil`] - log sanitization for user-supplied text

pub mod bot;
pub mod config;
pub mod logutil;
pub mod service;
pub mod storage;
