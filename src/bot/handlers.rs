//! # Conversation State Machine
//!
//! Turns one inbound event into exactly one authorized mutation or query and a
//! structured reply. Button callbacks carry an explicit action code; free text
//! is interpreted against the session's pending action. A typed command
//! (`/start` and friends) behaves exactly like the matching button press.
//!
//! Screen handlers answer a callback with a canned prompt and record the
//! action as pending, so the *next* free-text message lands in the right
//! interpreter; `show_me`, `start` and `back` execute immediately instead of
//! prompting. Interpreter handlers run the actual operation and, for list
//! mutations, chain into the own-list rendering so the user always sees the
//! result.
//!
//! Not-found and validation conditions are answered with their specific reply
//! and never touch storage beyond the failed lookup. Infrastructure failures
//! are logged once with a stable code and collapsed into one generic reply.

use log::{debug, error};

use crate::bot::error::{BotError, ErrorCode};
use crate::bot::event::{InboundEvent, Reply, ScreenLevel};
use crate::bot::router::Action;
use crate::bot::session::{Session, SessionManager};
use crate::bot::texts;
use crate::logutil::escape_log;
use crate::service::{hash_password, verify_password, WishlistService};
use crate::storage::WishRecord;

pub struct Handler {
    service: WishlistService,
    sessions: SessionManager,
}

impl Handler {
    pub fn new(service: WishlistService, sessions: SessionManager) -> Self {
        Self { service, sessions }
    }

    pub fn service(&self) -> &WishlistService {
        &self.service
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Process one inbound event and produce the reply for it.
    pub async fn handle(&self, event: &InboundEvent) -> Reply {
        let session = match self
            .sessions
            .get_or_create(&self.service, event.chat_id, &event.display_name)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                error!(
                    "session resolution failed (code {:03}): {} user_id={} username={}",
                    ErrorCode::Session.code(),
                    e,
                    event.chat_id,
                    escape_log(&event.display_name),
                );
                return Reply::new(
                    event.chat_id,
                    texts::infra_error(ErrorCode::Session.code()),
                    ScreenLevel::Empty,
                );
            }
        };

        // Serializes two racing events from the same identity.
        let mut session = session.lock().await;
        session.last_request = event.payload.clone();

        if event.is_callback {
            match Action::parse(&event.payload) {
                Some(action) => self.on_action(&mut session, action).await,
                None => {
                    debug!(
                        "unknown callback data user_id={} data={}",
                        session.id,
                        escape_log(&event.payload)
                    );
                    Reply::new(session.id, texts::CANNOT_PROCESS, ScreenLevel::Empty)
                }
            }
        } else {
            self.on_message(&mut session).await
        }
    }

    /// Screen handler for an explicit action code. Records the action as the
    /// pending interpretation for the next free-text message.
    async fn on_action(&self, session: &mut Session, action: Action) -> Reply {
        debug!(
            "action {} user_id={} username={}",
            action.code(),
            session.id,
            escape_log(&session.name)
        );
        session.pending = action;
        match action {
            Action::Start | Action::Back => {
                Reply::new(session.id, texts::GREETING, ScreenLevel::Start)
            }
            Action::ShowMine => self.show_mine(session).await,
            Action::Add => Reply::new(session.id, texts::ADD_PROMPT, ScreenLevel::Edit),
            Action::Delete => Reply::new(session.id, texts::DELETE_PROMPT, ScreenLevel::Edit),
            Action::SetPassword => {
                Reply::new(session.id, texts::PASSWORD_PROMPT, ScreenLevel::Edit)
            }
            Action::ShowOther => {
                Reply::new(session.id, texts::USERNAME_PROMPT, ScreenLevel::OtherUser)
            }
            Action::Default => Reply::new(session.id, texts::CANNOT_PROCESS, ScreenLevel::Empty),
        }
    }

    /// Free-text entry point: typed commands dispatch like callbacks, anything
    /// else is the answer to whatever action is pending.
    async fn on_message(&self, session: &mut Session) -> Reply {
        if let Some(action) = Action::parse(&session.last_request) {
            return self.on_action(session, action).await;
        }
        match session.pending {
            Action::Add => self.add(session).await,
            Action::Delete => self.delete(session).await,
            Action::SetPassword => self.set_password(session).await,
            Action::ShowOther => self.show_other(session).await,
            Action::Start
            | Action::Back
            | Action::ShowMine
            | Action::Default => {
                debug!(
                    "no interpreter for pending {} user_id={}",
                    session.pending.code(),
                    session.id
                );
                Reply::new(session.id, texts::CANNOT_PROCESS, ScreenLevel::Empty)
            }
        }
    }

    /// Interpreter: store the message as a new wish, then show the list.
    async fn add(&self, session: &mut Session) -> Reply {
        let content = session.last_request.clone();
        if let Err(e) = self.service.add_wish(session.id, &content).await {
            return self.failure(ErrorCode::AddWish, session, &e.into());
        }
        session.pending = Action::ShowMine;
        self.show_mine(session).await
    }

    /// Interpreter: delete by 1-based positions of the last rendered list, or
    /// everything via the "delete all" sentinel. All-or-nothing: one bad token
    /// rejects the whole request and nothing is deleted.
    async fn delete(&self, session: &mut Session) -> Reply {
        let request = session.last_request.trim().to_string();
        let ids: Vec<String> = if request == texts::DELETE_ALL {
            session.index_map.clone()
        } else {
            let mut picked = Vec::new();
            for token in request.split_whitespace() {
                let index = match token.parse::<usize>() {
                    Ok(i) if (1..=session.index_map.len()).contains(&i) => i,
                    _ => {
                        debug!(
                            "malformed delete request user_id={} request={}",
                            session.id,
                            escape_log(&request)
                        );
                        return Reply::new(session.id, texts::WRONG_REQUEST, ScreenLevel::Empty);
                    }
                };
                picked.push(session.index_map[index - 1].clone());
            }
            picked
        };
        if let Err(e) = self.service.delete_wishes(&ids).await {
            return self.failure(ErrorCode::DeleteWish, session, &e.into());
        }
        session.pending = Action::ShowMine;
        self.show_mine(session).await
    }

    /// Interpreter: set or reset the wishlist password. Only the argon2 hash
    /// is persisted, never the plaintext.
    async fn set_password(&self, session: &mut Session) -> Reply {
        let plain = if session.last_request == texts::REMOVE_PASSWORD {
            // Resetting makes "password = my username" hold again.
            session.name.clone()
        } else if session.last_request.chars().any(char::is_whitespace) {
            return Reply::new(session.id, texts::NO_SPACES, ScreenLevel::Empty);
        } else {
            session.last_request.clone()
        };
        let hash = match hash_password(&plain) {
            Ok(hash) => hash,
            Err(e) => return self.failure(ErrorCode::ChangePassword, session, &e.into()),
        };
        if let Err(e) = self.service.update_password(session.id, &hash).await {
            return self.failure(ErrorCode::ChangePassword, session, &e.into());
        }
        Reply::new(session.id, texts::SUCCESS, ScreenLevel::Service)
    }

    /// Render the caller's own list and refresh the index map to match it.
    async fn show_mine(&self, session: &mut Session) -> Reply {
        let list = match self.service.wishlist_by_id(session.id).await {
            Ok(list) => list,
            Err(e) => return self.failure(ErrorCode::GetList, session, &e.into()),
        };
        if list.is_empty() {
            session.index_map.clear();
            return Reply::new(session.id, texts::NO_WISHES, ScreenLevel::EmptyList);
        }
        session.index_map = list.iter().map(|w| w.id.clone()).collect();
        Reply::new(session.id, render_list(&list), ScreenLevel::Me)
    }

    /// Interpreter: `username [password]`. The password check gates any
    /// disclosure; the viewer's index map stays untouched so positions can
    /// never resolve into someone else's list.
    async fn show_other(&self, session: &mut Session) -> Reply {
        let request = session.last_request.clone();
        let fields: Vec<&str> = request.split_whitespace().collect();
        let (username, password) = match fields.as_slice() {
            // No password supplied: the "no password set" convention means
            // the requester's own display name is worth a try.
            [username] => (*username, session.name.as_str()),
            [username, password] => (*username, *password),
            _ => return Reply::new(session.id, texts::WRONG_REQUEST, ScreenLevel::OtherUser),
        };
        let username = username.trim_start_matches('@');
        let target = match self.service.get_user_by_username(username).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                return Reply::new(session.id, texts::USER_NOT_FOUND, ScreenLevel::OtherUser);
            }
            Err(e) => return self.failure(ErrorCode::GetUser, session, &e.into()),
        };
        if !verify_password(&target.password_hash, password) {
            return Reply::new(session.id, texts::WRONG_PASSWORD, ScreenLevel::OtherUser);
        }
        let list = match self.service.wishlist_by_id(target.id).await {
            Ok(list) => list,
            Err(e) => return self.failure(ErrorCode::GetList, session, &e.into()),
        };
        if list.is_empty() {
            return Reply::new(session.id, texts::NO_WISHES, ScreenLevel::OtherUser);
        }
        Reply::new(session.id, render_list(&list), ScreenLevel::OtherUser)
    }

    /// Log an infrastructure failure once, with full context, and collapse it
    /// into the generic user-facing reply.
    fn failure(&self, code: ErrorCode, session: &Session, err: &BotError) -> Reply {
        error!(
            "handler failure (code {:03}): {} user_id={} username={} request={}",
            code.code(),
            err,
            session.id,
            escape_log(&session.name),
            escape_log(&session.last_request),
        );
        Reply::new(session.id, texts::infra_error(code.code()), ScreenLevel::Empty)
    }
}

/// Render wishes as a 1-based numbered list, one line per wish.
fn render_list(list: &[WishRecord]) -> String {
    let mut out = String::new();
    for (i, wish) in list.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, wish.content));
    }
    out
}
