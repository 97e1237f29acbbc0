//! Twitch OAuth: turning an authorization code into an Access Token, and
//! holding on to it.
pub mod access;
pub mod creds;
