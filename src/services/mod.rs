pub mod account;
pub mod catalog;
pub mod resolver;
pub mod view_reset;
pub mod vocabulary;

pub use account::{verify_credentials, AccountStore, Credentials};
pub use catalog::Catalog;
pub use resolver::{resolve, Resolution};
pub use view_reset::{ViewActivity, ViewReset, ViewResetClient};
pub use vocabulary::VocabularyExtractor;
