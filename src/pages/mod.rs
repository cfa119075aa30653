mod auth;
mod challenges;
mod dashboard;
mod feed;
pub(crate) mod habits;
mod layout;
mod profile;

pub use auth::{LoginPage, RegisterPage};
pub use challenges::ChallengesPage;
pub use dashboard::DashboardPage;
pub use feed::FeedPage;
pub use habits::HabitsPage;
pub use layout::RootAuthed;
pub use profile::ProfilePage;
