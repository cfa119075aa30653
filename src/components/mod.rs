pub mod hooks;
pub mod ui;

mod challenge_card;
mod feed_item;
mod habit_card;
mod habit_form;
mod habit_list;
mod navbar;
mod stats;
mod toasts;

pub(crate) use challenge_card::{ChallengeCard, ChallengeForm};
pub(crate) use feed_item::FeedItemCard;
pub(crate) use habit_card::HabitCard;
pub(crate) use habit_form::HabitForm;
pub(crate) use habit_list::HabitList;
pub(crate) use navbar::Navbar;
pub(crate) use stats::{ActivityChart, ProgressBar, StatCard};
pub(crate) use toasts::ToastHost;
