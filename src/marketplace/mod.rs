pub mod matcher;
pub mod rakuten;
pub mod yahoo;

pub use rakuten::RakutenClient;
pub use yahoo::YahooClient;
