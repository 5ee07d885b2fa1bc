pub mod router;
pub mod server;

pub use router::{PageQuery, Route};
pub use server::WebServer;
