pub mod fallback;
pub mod mock;
pub mod remote;
pub mod trait_def;

pub use fallback::{FallbackClient, FallbackOptions, DEMO_API_KEY};
pub use remote::{RemoteClient, DEFAULT_BASE_URL};
pub use trait_def::{ClientError, ClientResult, EmissionsSource, DEFAULT_LATEST_LIMIT};
