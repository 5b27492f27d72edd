//! Client side of the voice to-do list: API client, session handling and the
//! task store that mirrors every change to the backend or to local storage.

pub mod client;
pub mod error;
pub mod local;
pub mod session;
pub mod settings;
pub mod store;
