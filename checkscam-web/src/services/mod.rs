//! External provider clients and the phone-check aggregation service

pub mod numverify_client;
pub mod phone_check;
pub mod scam_oracle;
pub mod veriphone_client;

pub use numverify_client::NumverifyClient;
pub use phone_check::{PhoneCheckConfig, PhoneCheckService};
pub use scam_oracle::{FeedScam, ScamOracle};
pub use veriphone_client::VeriphoneClient;
