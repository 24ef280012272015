pub mod auth_state;
pub mod player_state;

pub use auth_state::AuthState;
pub use player_state::{PlayerState, SharedPlayerState};
