mod connection_pool;
mod local_store;
mod mutation_queue;
mod rows;

pub use connection_pool::ConnectionPool;
pub use local_store::LocalStore;
pub use mutation_queue::MutationQueue;
