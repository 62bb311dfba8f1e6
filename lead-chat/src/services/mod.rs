pub mod chat_api;
pub mod credentials;
pub mod endpoints;
pub mod tagged_leads;

pub use chat_api::{HistoryFetcher, HttpChatApi, LeadDirectory};
pub use credentials::{CredentialProvider, StaticCredentials};
pub use endpoints::ChatEndpoints;
pub use tagged_leads::{tagged_leads, TaggedLead};
