//! External delivery channels for monitor alerts.

pub mod email;
