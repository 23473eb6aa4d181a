// Domain-layer modules and shared errors/models
pub mod ranking {
    pub use crate::ranking::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
