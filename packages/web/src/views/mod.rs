mod layout;
pub use layout::{Guarded, NotFound};

mod landing;
pub use landing::Landing;

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod home;
pub use home::Home;

mod profile;
pub use profile::Profile;

mod settings;
pub use settings::Settings;

mod saved;
pub use saved::Saved;

mod admin;
pub use admin::Admin;

use api::UserData;
use dioxus::prelude::*;
use ui::use_auth;

/// The signed-in user, once the gate has let a protected view render.
pub(crate) fn use_current_user() -> Option<UserData> {
    use_auth()().user
}
