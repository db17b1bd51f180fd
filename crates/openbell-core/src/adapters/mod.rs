mod kite;
mod yahoo;

pub use kite::{BrokerSession, KiteSource, SymbolBar};
pub use yahoo::{ChartFeed, YahooChartClient, YahooSource};
