mod remote_backend;

pub use remote_backend::MockRemoteBackend;
