//! Chat REST surface: conversation list, history, and message send.
//! The realtime counterpart lives in `crate::ws`.

pub mod handlers;
