//! External service integrations.

pub mod places {
    pub use crate::services::*;
}
