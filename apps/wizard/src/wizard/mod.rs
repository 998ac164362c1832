pub mod debounce;
pub mod handlers;
pub mod nav;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod steps;
pub mod sweeper;
pub mod validation;

pub use orchestrator::{Wizard, WizardTimings};
pub use session::SessionStore;
pub use sweeper::spawn_session_sweeper;
