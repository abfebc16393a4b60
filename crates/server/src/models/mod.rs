mod message;
mod post;
mod user;

pub use message::*;
pub use post::*;
pub use user::*;

use serde::Deserialize;

/// Deserializer that keeps an explicit JSON null as `Some(None)`, so PATCH
/// bodies can tell "clear this field" apart from "leave it alone".
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// The verified caller of an authenticated endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);
