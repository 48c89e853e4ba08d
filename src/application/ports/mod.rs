pub mod remote_backend;

pub use remote_backend::{RemoteBackend, RemoteError, RemoteFilter};
