//! Wire types shared by the store and the HTTP layer.

pub mod api;
