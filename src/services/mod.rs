pub mod accounts;
pub mod mailer;
pub mod password;
pub mod providers;
pub mod recommendations;

pub use accounts::AccountManager;
pub use mailer::{HttpMailer, LogMailer, Mailer};
pub use password::PasswordHashing;
pub use providers::{ExternalCatalog, MusicGatewayProvider};
pub use recommendations::{FeedConfig, FeedStrategy, HomeFeedSelector};
