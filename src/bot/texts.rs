//! Literal reply texts and free-text sentinels. No localization layer; the
//! handlers return these strings as-is.

pub const GREETING: &str = "So, what shall we do?";

pub const ADD_PROMPT: &str =
    "Type a description and/or a link and send it as a single message:";

pub const DELETE_PROMPT: &str = "Type the numbers of the wishes to remove, separated by spaces. \
For example: 1 3 10 6\nSend \"delete all\" to clear the whole list.";

pub const PASSWORD_PROMPT: &str = "A password limits your wishlist to people who know it. \
Share it personally or publish it in your profile. Any form works, but it must not contain \
spaces.\nTo reset the password and make the wishlist public, send:\nremove password";

pub const USERNAME_PROMPT: &str = "Type the username whose wishlist you want to see. \
If that wishlist is password-protected, add the password after a space. For example:\n\
@username password";

pub const WRONG_PASSWORD: &str =
    "Looks like this wishlist is password-protected. Check the owner's profile for the \
password, or ask them directly";

pub const USER_NOT_FOUND: &str = "Looks like this user has no wishlist";

pub const WRONG_REQUEST: &str = "There is a mistake in the request, try again";

pub const NO_SPACES: &str = "A password must not contain spaces. Try another one";

pub const SUCCESS: &str = "Done";

pub const NO_WISHES: &str = "Not a single wish here...";

pub const CANNOT_PROCESS: &str = "Cannot process this message";

/// Free-text sentinel meaning "every id in the last rendered list".
pub const DELETE_ALL: &str = "delete all";

/// Free-text sentinel resetting the password to the user's own display name.
pub const REMOVE_PASSWORD: &str = "remove password";

/// Generic user-facing reply for infrastructure failures. The code matches
/// the one logged at the point of detection; no internal detail is disclosed.
pub fn infra_error(code: u16) -> String {
    format!(
        "Something went wrong on our side (code {:03}). Please try again later",
        code
    )
}
