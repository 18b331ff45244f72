pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod model;
pub mod payload;
pub mod session;

pub use api::ApiClient;
pub use config::Config;
pub use controller::{Confirmation, DataItemController, ProjectController};
pub use error::{ConsoleError, Surface};
pub use form::{EntityForm, FormMachine, FormMode, SubmitOutcome};
