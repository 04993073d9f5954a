mod host;
mod storage;

pub use host::{BrowserClock, ChromeHost};
pub use storage::ChromeStorage;
