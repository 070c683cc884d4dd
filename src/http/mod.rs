pub mod response;
pub mod transport;
pub mod types;

pub use response::{HttpResponse, Response};
pub use transport::{HttpTransport, Transport};
pub use types::{InvalidMethod, Method, Status, TransportError};
