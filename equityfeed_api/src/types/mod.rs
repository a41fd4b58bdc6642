mod bar;
pub use self::bar::{IntradayBar, RawBar};

mod chart;
pub use self::chart::{ChartData, ChartError, ChartMeta, ChartResponse, ChartResult};

mod security;
pub use self::security::{DirectoryEntry, SecurityType};
